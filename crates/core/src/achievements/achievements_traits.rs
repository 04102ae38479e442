use async_trait::async_trait;

use super::{NewUserAchievement, UserAchievement};
use crate::errors::Result;

#[async_trait]
pub trait AchievementRepositoryTrait: Send + Sync {
    fn get_achievements(&self, user_id: &str) -> Result<Vec<UserAchievement>>;

    /// Records an unlock unless one already exists for the same
    /// (user, achievement) pair; returns the surviving row either way.
    async fn unlock(&self, unlock: NewUserAchievement) -> Result<UserAchievement>;

    async fn delete_achievement(&self, achievement_row_id: String) -> Result<usize>;
}
