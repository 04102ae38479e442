use async_trait::async_trait;

use super::{Gym, NewGym};
use crate::errors::Result;

#[async_trait]
pub trait GymRepositoryTrait: Send + Sync {
    /// Gyms for a user, active first, then by name.
    fn get_gyms(&self, user_id: &str) -> Result<Vec<Gym>>;

    fn get_gym(&self, gym_id: &str) -> Result<Option<Gym>>;

    async fn upsert_gym(&self, gym: NewGym) -> Result<Gym>;

    /// Atomically deactivates every other gym of the user and activates the
    /// given one.
    async fn set_active_gym(&self, user_id: String, gym_id: String) -> Result<Gym>;

    async fn delete_gym(&self, gym_id: String) -> Result<usize>;
}
