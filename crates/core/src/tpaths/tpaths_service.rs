use std::sync::Arc;

use async_trait::async_trait;

use super::{
    NewTPathExercise, NewTrainingPath, TPathExercise, TPathProgress, TrainingPath,
    TrainingPathDetail, TrainingPathRepositoryTrait,
};
use crate::clock::Clock;
use crate::errors::{Error, Result};

#[async_trait]
pub trait TrainingPathServiceTrait: Send + Sync {
    fn get_paths(&self, user_id: &str) -> Result<Vec<TrainingPath>>;
    fn get_path_detail(&self, path_id: &str) -> Result<Option<TrainingPathDetail>>;
    async fn save_path(&self, path: NewTrainingPath) -> Result<TrainingPath>;
    async fn save_exercise(&self, exercise: NewTPathExercise) -> Result<TPathExercise>;
    async fn delete_path(&self, path_id: String) -> Result<usize>;
    fn get_progress(&self, user_id: &str, path_id: &str) -> Result<Option<TPathProgress>>;
    async fn record_access(&self, user_id: String, path_id: String) -> Result<TPathProgress>;
    async fn record_completion(&self, user_id: String, path_id: String) -> Result<TPathProgress>;
}

pub struct TrainingPathService {
    repository: Arc<dyn TrainingPathRepositoryTrait>,
    clock: Arc<dyn Clock>,
}

impl TrainingPathService {
    pub fn new(repository: Arc<dyn TrainingPathRepositoryTrait>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// A child day must hang off an existing top-level program.
    fn validate_parent(&self, parent_id: &str) -> Result<()> {
        match self.repository.get_path(parent_id)? {
            None => Err(Error::validation(format!(
                "Parent training path '{parent_id}' does not exist"
            ))),
            Some(parent) if !parent.is_top_level() => Err(Error::validation(format!(
                "Parent training path '{parent_id}' is itself a child day"
            ))),
            Some(_) => Ok(()),
        }
    }

    fn progress_or_default(&self, user_id: &str, path_id: &str) -> Result<TPathProgress> {
        Ok(self
            .repository
            .get_progress(user_id, path_id)?
            .unwrap_or(TPathProgress {
                user_id: user_id.to_string(),
                tpath_id: path_id.to_string(),
                completed_at: None,
                last_accessed_at: None,
                completed_count: 0,
            }))
    }
}

#[async_trait]
impl TrainingPathServiceTrait for TrainingPathService {
    fn get_paths(&self, user_id: &str) -> Result<Vec<TrainingPath>> {
        self.repository.get_paths(user_id)
    }

    fn get_path_detail(&self, path_id: &str) -> Result<Option<TrainingPathDetail>> {
        let Some(path) = self.repository.get_path(path_id)? else {
            return Ok(None);
        };
        let exercises = self.repository.get_exercises(path_id)?;
        let days = self.repository.get_children(path_id)?;
        Ok(Some(TrainingPathDetail {
            path,
            exercises,
            days,
        }))
    }

    async fn save_path(&self, path: NewTrainingPath) -> Result<TrainingPath> {
        if path.name.trim().is_empty() {
            return Err(Error::validation("Training path requires a name"));
        }
        if let Some(parent_id) = path.parent_id.as_deref() {
            self.validate_parent(parent_id)?;
        }
        self.repository.upsert_path(path).await
    }

    async fn save_exercise(&self, exercise: NewTPathExercise) -> Result<TPathExercise> {
        if self.repository.get_path(&exercise.tpath_id)?.is_none() {
            return Err(Error::validation(format!(
                "Training path '{}' does not exist",
                exercise.tpath_id
            )));
        }
        self.repository.upsert_exercise(exercise).await
    }

    async fn delete_path(&self, path_id: String) -> Result<usize> {
        self.repository.delete_path(path_id).await
    }

    fn get_progress(&self, user_id: &str, path_id: &str) -> Result<Option<TPathProgress>> {
        self.repository.get_progress(user_id, path_id)
    }

    async fn record_access(&self, user_id: String, path_id: String) -> Result<TPathProgress> {
        let mut progress = self.progress_or_default(&user_id, &path_id)?;
        progress.last_accessed_at = Some(self.clock.now_utc().to_rfc3339());
        self.repository.upsert_progress(progress).await
    }

    async fn record_completion(&self, user_id: String, path_id: String) -> Result<TPathProgress> {
        let now = self.clock.now_utc().to_rfc3339();
        let mut progress = self.progress_or_default(&user_id, &path_id)?;
        progress.completed_at = Some(now.clone());
        progress.last_accessed_at = Some(now);
        progress.completed_count += 1;
        self.repository.upsert_progress(progress).await
    }
}
