use async_trait::async_trait;

use super::{NewSetLog, NewWorkoutSession, SetLog, SetVolumeRow, WorkoutSession, WorkoutSessionUpdate};
use crate::errors::Result;

#[async_trait]
pub trait WorkoutRepositoryTrait: Send + Sync {
    /// All sessions for a user, newest session date first.
    fn get_sessions(&self, user_id: &str) -> Result<Vec<WorkoutSession>>;

    fn get_session(&self, session_id: &str) -> Result<Option<WorkoutSession>>;

    async fn upsert_session(&self, session: NewWorkoutSession) -> Result<WorkoutSession>;

    async fn update_session(
        &self,
        session_id: String,
        update: WorkoutSessionUpdate,
    ) -> Result<WorkoutSession>;

    async fn delete_session(&self, session_id: String) -> Result<usize>;

    fn get_set_logs(&self, session_id: &str) -> Result<Vec<SetLog>>;

    async fn add_set_log(&self, set_log: NewSetLog) -> Result<SetLog>;

    /// `completed_at` of every completed session for the user since the given
    /// RFC3339 instant.
    fn completed_session_timestamps(&self, user_id: &str, since: &str) -> Result<Vec<String>>;

    /// Set rows of completed sessions since the given instant, for volume and
    /// PR aggregation.
    fn volume_rows_since(&self, user_id: &str, since: &str) -> Result<Vec<SetVolumeRow>>;

    /// Heaviest weight the user has logged for an exercise, across all time.
    fn max_weight_for_exercise(&self, user_id: &str, exercise_id: &str) -> Result<Option<f64>>;
}
