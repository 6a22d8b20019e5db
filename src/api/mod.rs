//! Backend API client and payload types.

pub mod client;
pub mod error;

pub use client::{ApiClient, ChunkAck, ChunkRequest};
pub use error::ErrorPayload;
