//! SQLite-backed outbox and sync engine bookkeeping.

mod model;
mod repository;

pub use model::{SyncEngineStateDB, SyncOutboxRowDB};
pub use repository::{write_outbox_entry, OutboxRepository};
