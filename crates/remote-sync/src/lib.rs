//! Remote sync client: delivers locally committed writes to the backend.
//!
//! Remote→local flow is intentionally absent; the outbox only replays
//! local mutations outward.

mod client;
mod error;

pub use client::{RemoteSyncClient, RemoteSyncConfig};
pub use error::{RemoteSyncError, Result};
