use std::sync::Arc;

use async_trait::async_trait;

use super::{
    NewSetLog, NewWorkoutSession, SetLog, WorkoutRepositoryTrait, WorkoutSession,
    WorkoutSessionUpdate,
};
use crate::clock::Clock;
use crate::errors::{Error, Result};

#[async_trait]
pub trait WorkoutServiceTrait: Send + Sync {
    fn get_sessions(&self, user_id: &str) -> Result<Vec<WorkoutSession>>;
    fn get_session(&self, session_id: &str) -> Result<Option<WorkoutSession>>;
    async fn start_session(&self, session: NewWorkoutSession) -> Result<WorkoutSession>;
    async fn complete_session(
        &self,
        session_id: String,
        rating: Option<i32>,
        duration_seconds: Option<i32>,
    ) -> Result<WorkoutSession>;
    async fn update_session(
        &self,
        session_id: String,
        update: WorkoutSessionUpdate,
    ) -> Result<WorkoutSession>;
    async fn delete_session(&self, session_id: String) -> Result<usize>;
    fn get_set_logs(&self, session_id: &str) -> Result<Vec<SetLog>>;
    async fn log_set(&self, set_log: NewSetLog) -> Result<SetLog>;
}

pub struct WorkoutService {
    repository: Arc<dyn WorkoutRepositoryTrait>,
    clock: Arc<dyn Clock>,
}

impl WorkoutService {
    pub fn new(repository: Arc<dyn WorkoutRepositoryTrait>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }
}

#[async_trait]
impl WorkoutServiceTrait for WorkoutService {
    fn get_sessions(&self, user_id: &str) -> Result<Vec<WorkoutSession>> {
        self.repository.get_sessions(user_id)
    }

    fn get_session(&self, session_id: &str) -> Result<Option<WorkoutSession>> {
        self.repository.get_session(session_id)
    }

    async fn start_session(&self, session: NewWorkoutSession) -> Result<WorkoutSession> {
        if session.user_id.trim().is_empty() {
            return Err(Error::validation("Workout session requires a user id"));
        }
        self.repository.upsert_session(session).await
    }

    async fn complete_session(
        &self,
        session_id: String,
        rating: Option<i32>,
        duration_seconds: Option<i32>,
    ) -> Result<WorkoutSession> {
        let update = WorkoutSessionUpdate {
            completed_at: Some(self.clock.now_utc().to_rfc3339()),
            rating,
            duration_seconds,
            template_name: None,
        };
        self.repository.update_session(session_id, update).await
    }

    async fn update_session(
        &self,
        session_id: String,
        update: WorkoutSessionUpdate,
    ) -> Result<WorkoutSession> {
        self.repository.update_session(session_id, update).await
    }

    async fn delete_session(&self, session_id: String) -> Result<usize> {
        self.repository.delete_session(session_id).await
    }

    fn get_set_logs(&self, session_id: &str) -> Result<Vec<SetLog>> {
        self.repository.get_set_logs(session_id)
    }

    async fn log_set(&self, set_log: NewSetLog) -> Result<SetLog> {
        if set_log.session_id.trim().is_empty() {
            return Err(Error::validation("Set log requires a session id"));
        }
        if set_log.exercise_id.trim().is_empty() {
            return Err(Error::validation("Set log requires an exercise id"));
        }
        self.repository.add_set_log(set_log).await
    }
}
