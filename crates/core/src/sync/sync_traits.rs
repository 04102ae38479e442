use std::fmt;

use async_trait::async_trait;

use super::{NewOutboxEntry, OutboxEntry, SyncEngineState, SyncRetryClass};
use crate::errors::Result;

/// Failure of one remote mutation, carrying its retry classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncApplyError {
    pub message: String,
    pub class: SyncRetryClass,
}

impl SyncApplyError {
    pub fn new(message: impl Into<String>, class: SyncRetryClass) -> Self {
        Self {
            message: message.into(),
            class,
        }
    }
}

impl fmt::Display for SyncApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SyncApplyError {}

#[async_trait]
pub trait OutboxRepositoryTrait: Send + Sync {
    /// Appends an entry and returns its queue-local sequence id.
    async fn add(&self, entry: NewOutboxEntry) -> Result<i64>;

    /// Pending entries, oldest first (enqueue time, ties by insertion
    /// order). A complete snapshot at call time.
    fn list_pending(&self, limit: i64) -> Result<Vec<OutboxEntry>>;

    fn count_pending(&self) -> Result<i64>;

    /// Pending entries whose attempts reached the given threshold.
    fn count_stuck(&self, attempts_threshold: i32) -> Result<i64>;

    /// Removes a delivered entry. Removing an unknown id is a no-op.
    async fn remove(&self, entry_id: i64) -> Result<()>;

    /// Bumps the attempt counter and records the error without moving the
    /// entry.
    async fn record_failure(&self, entry_id: i64, message: String) -> Result<()>;

    /// Administrative full wipe; never part of the normal sync path.
    async fn clear(&self) -> Result<usize>;

    fn engine_state(&self) -> Result<SyncEngineState>;

    async fn mark_drain_outcome(&self, status: String, error: Option<String>) -> Result<()>;
}

/// Remote backend the processor replays entries against. One call per entry;
/// implementations apply their own bounded timeout.
#[async_trait]
pub trait SyncBackendClient: Send + Sync {
    async fn apply_mutation(&self, entry: &OutboxEntry)
        -> std::result::Result<(), SyncApplyError>;
}
