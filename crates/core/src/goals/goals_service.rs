use std::sync::Arc;

use async_trait::async_trait;

use super::{Goal, GoalRepositoryTrait, NewGoal};
use crate::errors::{Error, Result};

#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    fn get_goals(&self, user_id: &str) -> Result<Vec<Goal>>;
    async fn save_goal(&self, goal: NewGoal) -> Result<Goal>;
    async fn mark_achieved(&self, goal_id: String) -> Result<Goal>;
    async fn delete_goal(&self, goal_id: String) -> Result<usize>;
}

pub struct GoalService {
    repository: Arc<dyn GoalRepositoryTrait>,
}

impl GoalService {
    pub fn new(repository: Arc<dyn GoalRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl GoalServiceTrait for GoalService {
    fn get_goals(&self, user_id: &str) -> Result<Vec<Goal>> {
        self.repository.get_goals(user_id)
    }

    async fn save_goal(&self, goal: NewGoal) -> Result<Goal> {
        if goal.title.trim().is_empty() {
            return Err(Error::validation("Goal requires a title"));
        }
        self.repository.upsert_goal(goal).await
    }

    async fn mark_achieved(&self, goal_id: String) -> Result<Goal> {
        self.repository.mark_achieved(goal_id).await
    }

    async fn delete_goal(&self, goal_id: String) -> Result<usize> {
        self.repository.delete_goal(goal_id).await
    }
}
