use async_trait::async_trait;

use super::{Goal, NewGoal};
use crate::errors::Result;

#[async_trait]
pub trait GoalRepositoryTrait: Send + Sync {
    fn get_goals(&self, user_id: &str) -> Result<Vec<Goal>>;

    async fn upsert_goal(&self, goal: NewGoal) -> Result<Goal>;

    async fn mark_achieved(&self, goal_id: String) -> Result<Goal>;

    async fn delete_goal(&self, goal_id: String) -> Result<usize>;
}
