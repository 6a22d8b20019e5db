//! Session and navigation state.

#[allow(clippy::module_inception)]
mod session;
mod state;

pub use session::Session;
pub use state::{DirectoryPrefix, ListedEntry, SessionState};
