//! Offline-first core of the liftlog fitness tracker.
//!
//! The local store is the authoritative source of truth on-device; every
//! syncable write also lands in a durable outbox that a background processor
//! replays to the remote backend once connectivity allows. Streaks,
//! aggregate stats and achievement unlocks are derived purely from local
//! history.

pub mod achievements;
pub mod analytics;
pub mod clock;
pub mod context;
pub mod errors;
pub mod goals;
pub mod gyms;
pub mod measurements;
pub mod sync;
pub mod templates;
pub mod tpaths;
pub mod workouts;

pub use context::ServiceContext;
pub use errors::{Error, Result};
