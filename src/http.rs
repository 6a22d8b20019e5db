//! HTTP client wrapper for backend requests.

use std::sync::RwLock;

use reqwest::header::HeaderMap;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use crate::api::error::error_from_body;
use crate::config::ClientConfig;
use crate::error::{BucketError, Result};

/// Header carrying the CSRF token on outgoing requests.
pub const CSRF_REQUEST_HEADER: &str = "X-CSRFToken";

/// Header the backend uses to announce a fresh CSRF token.
pub const CSRF_RESPONSE_HEADER: &str = "X-CSRF-Token";

/// Multipart field carrying the CSRF token.
pub const CSRF_FORM_FIELD: &str = "csrf_token";

/// HTTP client bound to one backend.
///
/// Holds the current CSRF token, which is attached to every mutating request
/// and replaced whenever a response announces a new one.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    csrf_token: RwLock<Option<String>>,
}

impl HttpClient {
    /// Create a new HTTP client for `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            csrf_token: RwLock::new(None),
        }
    }

    /// Create a client from a full configuration (timeouts, proxy, token).
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder().connect_timeout(config.connect_timeout());

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| BucketError::InvalidConfig(format!("Invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| BucketError::InvalidConfig(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            csrf_token: RwLock::new(config.csrf_token.clone()),
        })
    }

    /// Create a new HTTP client with a proxy.
    pub fn with_proxy(base_url: &str, proxy: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::new(base_url).with_proxy(proxy))
    }

    /// Backend root URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path such as `/list`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Current CSRF token, if any.
    pub fn csrf_token(&self) -> Option<String> {
        self.csrf_token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the CSRF token.
    pub fn set_csrf_token(&self, token: Option<String>) {
        *self.csrf_token.write().unwrap_or_else(|e| e.into_inner()) = token;
    }

    /// GET an endpoint and decode its JSON body.
    pub async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let request = self.client.get(self.url(path)).query(query);
        self.send_json("GET", path, request).await
    }

    /// POST a multipart form. The CSRF token is added as a form field.
    pub async fn post_multipart(&self, path: &str, mut form: Form) -> Result<Value> {
        if let Some(token) = self.csrf_token() {
            form = form.text(CSRF_FORM_FIELD, token);
        }
        let request = self.with_csrf(self.client.post(self.url(path))).multipart(form);
        self.send_json("POST", path, request).await
    }

    /// POST a JSON body.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let request = self.with_csrf(self.client.post(self.url(path))).json(body);
        self.send_json("POST", path, request).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<Value> {
        let request = self.with_csrf(self.client.delete(self.url(path)));
        self.send_json("DELETE", path, request).await
    }

    /// GET an endpoint and hand back the response for streaming.
    ///
    /// Non-success statuses are turned into errors before returning.
    pub async fn get_stream(&self, path: &str) -> Result<Response> {
        let response = self.client.get(self.url(path)).send().await?;
        self.remember_csrf(response.headers());

        let status = response.status();
        debug!(method = "GET", path, status = status.as_u16(), "stream opened");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_body(status.as_u16(), &body));
        }
        Ok(response)
    }

    fn with_csrf(&self, request: RequestBuilder) -> RequestBuilder {
        match self.csrf_token() {
            Some(token) => request.header(CSRF_REQUEST_HEADER, token),
            None => request,
        }
    }

    fn remember_csrf(&self, headers: &HeaderMap) {
        if let Some(token) = headers
            .get(CSRF_RESPONSE_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
        {
            self.set_csrf_token(Some(token.to_string()));
        }
    }

    async fn send_json(&self, method: &str, path: &str, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        self.remember_csrf(response.headers());

        let status = response.status();
        let body = response.text().await?;
        debug!(method, path, status = status.as_u16(), "request completed");

        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }

        let value: Value = serde_json::from_str(&body)?;
        // Some endpoints report failures in a 200 body
        if value.get("error").is_some_and(|e| !e.is_null()) {
            return Err(error_from_body(status.as_u16(), &body));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new("http://127.0.0.1:5001/");
        assert_eq!(client.base_url(), "http://127.0.0.1:5001");
        assert_eq!(client.url("/list"), "http://127.0.0.1:5001/list");
        assert_eq!(client.csrf_token(), None);
    }

    #[test]
    fn test_proxy_creation() {
        let client = HttpClient::with_proxy("http://127.0.0.1:5001", "http://127.0.0.1:8080");
        assert!(client.is_ok());
    }

    #[test]
    fn test_proxy_invalid() {
        let res = HttpClient::with_proxy("http://127.0.0.1:5001", ":::::::");
        assert!(matches!(res, Err(BucketError::InvalidConfig(_))));
    }

    #[test]
    fn test_csrf_token_from_config() {
        let config = ClientConfig::new("http://localhost:5001").with_csrf_token("tok");
        let client = HttpClient::from_config(&config).unwrap();
        assert_eq!(client.csrf_token().as_deref(), Some("tok"));

        client.set_csrf_token(Some("next".to_string()));
        assert_eq!(client.csrf_token().as_deref(), Some("next"));
    }

    #[test]
    fn test_remember_csrf_header() {
        let client = HttpClient::new("http://localhost:5001");
        let mut headers = HeaderMap::new();
        headers.insert(CSRF_RESPONSE_HEADER, "fresh".parse().unwrap());
        client.remember_csrf(&headers);
        assert_eq!(client.csrf_token().as_deref(), Some("fresh"));

        // Empty header leaves the token alone
        headers.insert(CSRF_RESPONSE_HEADER, "".parse().unwrap());
        client.remember_csrf(&headers);
        assert_eq!(client.csrf_token().as_deref(), Some("fresh"));
    }
}
