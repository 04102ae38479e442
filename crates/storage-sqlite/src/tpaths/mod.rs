mod model;
mod repository;

pub use model::{TPathExerciseDB, TPathProgressDB, TrainingPathDB};
pub use repository::TrainingPathRepository;
