//! Listing and navigation.

use tracing::debug;

use crate::error::{BucketError, Result};
use crate::fs::entry::{Entry, Listing};
use crate::session::{DirectoryPrefix, Session, SessionState};

impl Session {
    /// List the entries directly under `prefix`.
    ///
    /// A backend without storage configuration yields
    /// [`Listing::NotConfigured`] rather than an error.
    pub async fn list(&self, prefix: &DirectoryPrefix) -> Result<Listing> {
        let response = match self.api.list(prefix.as_str()).await {
            Ok(response) => response,
            Err(BucketError::NotConfigured) => return Ok(Listing::NotConfigured),
            Err(e) => return Err(e),
        };

        let listing = Listing::from_response(&response)?;
        debug!(prefix = %prefix, entries = listing.entries().len(), "listed");
        Ok(listing)
    }

    /// List the current prefix of `state` again.
    pub async fn refresh(&self, state: &SessionState) -> Result<Listing> {
        self.list(state.prefix()).await
    }

    /// Enter `folder` and list it.
    pub async fn navigate_into(&self, state: &mut SessionState, folder: &str) -> Result<Listing> {
        let prefix = state.navigate_into(folder).clone();
        self.list(&prefix).await
    }

    /// Enter a folder entry from a listing and list it.
    pub async fn enter(&self, state: &mut SessionState, entry: &Entry) -> Result<Listing> {
        let prefix = state
            .enter(entry)
            .ok_or_else(|| BucketError::Custom(format!("Not a folder: {}", entry.name())))?
            .clone();
        self.list(&prefix).await
    }

    /// Go up one level and list it.
    pub async fn navigate_up(&self, state: &mut SessionState) -> Result<Listing> {
        let prefix = state.navigate_up().clone();
        self.list(&prefix).await
    }

    /// Jump to `path` and list it.
    pub async fn navigate_to(&self, state: &mut SessionState, path: &str) -> Result<Listing> {
        state.set_prefix(DirectoryPrefix::new(path));
        self.refresh(state).await
    }
}
