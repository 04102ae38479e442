mod model;
mod repository;

pub use model::{SetLogDB, WorkoutSessionDB};
pub use repository::WorkoutRepository;
