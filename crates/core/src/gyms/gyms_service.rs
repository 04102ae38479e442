use std::sync::Arc;

use async_trait::async_trait;

use super::{Gym, GymRepositoryTrait, NewGym};
use crate::errors::{Error, Result};

#[async_trait]
pub trait GymServiceTrait: Send + Sync {
    fn get_gyms(&self, user_id: &str) -> Result<Vec<Gym>>;
    fn get_active_gym(&self, user_id: &str) -> Result<Option<Gym>>;
    async fn save_gym(&self, gym: NewGym) -> Result<Gym>;
    async fn set_active_gym(&self, user_id: String, gym_id: String) -> Result<Gym>;
    async fn delete_gym(&self, gym_id: String) -> Result<usize>;
}

pub struct GymService {
    repository: Arc<dyn GymRepositoryTrait>,
}

impl GymService {
    pub fn new(repository: Arc<dyn GymRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl GymServiceTrait for GymService {
    fn get_gyms(&self, user_id: &str) -> Result<Vec<Gym>> {
        self.repository.get_gyms(user_id)
    }

    fn get_active_gym(&self, user_id: &str) -> Result<Option<Gym>> {
        Ok(self
            .repository
            .get_gyms(user_id)?
            .into_iter()
            .find(|gym| gym.is_active))
    }

    async fn save_gym(&self, gym: NewGym) -> Result<Gym> {
        if gym.name.trim().is_empty() {
            return Err(Error::validation("Gym requires a name"));
        }
        self.repository.upsert_gym(gym).await
    }

    async fn set_active_gym(&self, user_id: String, gym_id: String) -> Result<Gym> {
        self.repository.set_active_gym(user_id, gym_id).await
    }

    async fn delete_gym(&self, gym_id: String) -> Result<usize> {
        self.repository.delete_gym(gym_id).await
    }
}
