//! Sync domain model and services: the outbox contract, connectivity
//! monitoring, and the background processor that replays local writes to the
//! remote backend.

mod connectivity;
mod processor;
mod sync_engine;
mod sync_model;
mod sync_traits;

pub use connectivity::*;
pub use processor::*;
pub use sync_engine::*;
pub use sync_model::*;
pub use sync_traits::*;
