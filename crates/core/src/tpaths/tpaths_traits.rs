use async_trait::async_trait;

use super::{NewTPathExercise, NewTrainingPath, TPathExercise, TPathProgress, TrainingPath};
use crate::errors::Result;

#[async_trait]
pub trait TrainingPathRepositoryTrait: Send + Sync {
    /// Top-level paths for a user, ordered by position.
    fn get_paths(&self, user_id: &str) -> Result<Vec<TrainingPath>>;

    fn get_path(&self, path_id: &str) -> Result<Option<TrainingPath>>;

    /// Child days of a path, ordered by position.
    fn get_children(&self, parent_id: &str) -> Result<Vec<TrainingPath>>;

    /// Exercises of a path, ordered by position.
    fn get_exercises(&self, path_id: &str) -> Result<Vec<TPathExercise>>;

    async fn upsert_path(&self, path: NewTrainingPath) -> Result<TrainingPath>;

    async fn upsert_exercise(&self, exercise: NewTPathExercise) -> Result<TPathExercise>;

    /// Deletes a path. Children, their exercises and all progress rows go
    /// with it.
    async fn delete_path(&self, path_id: String) -> Result<usize>;

    fn get_progress(&self, user_id: &str, path_id: &str) -> Result<Option<TPathProgress>>;

    async fn upsert_progress(&self, progress: TPathProgress) -> Result<TPathProgress>;
}
