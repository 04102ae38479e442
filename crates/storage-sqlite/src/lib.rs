//! SQLite storage for the liftlog core: diesel repositories behind the core
//! repository traits, a single-writer actor, and the sync outbox written in
//! the same transaction as every syncable domain mutation.

pub mod achievements;
pub mod db;
pub mod errors;
pub mod goals;
pub mod gyms;
mod json;
pub mod measurements;
pub mod registry;
pub mod schema;
pub mod sync;
pub mod templates;
pub mod tpaths;
pub mod workouts;

pub use achievements::AchievementRepository;
pub use goals::GoalRepository;
pub use gyms::GymRepository;
pub use measurements::MeasurementRepository;
pub use registry::build_service_context;
pub use sync::OutboxRepository;
pub use templates::TemplateRepository;
pub use tpaths::TrainingPathRepository;
pub use workouts::WorkoutRepository;
