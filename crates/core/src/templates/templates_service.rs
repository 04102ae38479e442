use std::sync::Arc;

use async_trait::async_trait;

use super::{NewWorkoutTemplate, TemplateRepositoryTrait, WorkoutTemplate, WorkoutTemplateUpdate};
use crate::errors::{Error, Result};

#[async_trait]
pub trait TemplateServiceTrait: Send + Sync {
    fn get_templates(&self, user_id: &str) -> Result<Vec<WorkoutTemplate>>;
    fn get_template(&self, template_id: &str) -> Result<Option<WorkoutTemplate>>;
    async fn save_template(&self, template: NewWorkoutTemplate) -> Result<WorkoutTemplate>;
    async fn update_template(
        &self,
        template_id: String,
        update: WorkoutTemplateUpdate,
    ) -> Result<WorkoutTemplate>;
    async fn delete_template(&self, template_id: String) -> Result<usize>;
}

pub struct TemplateService {
    repository: Arc<dyn TemplateRepositoryTrait>,
}

impl TemplateService {
    pub fn new(repository: Arc<dyn TemplateRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl TemplateServiceTrait for TemplateService {
    fn get_templates(&self, user_id: &str) -> Result<Vec<WorkoutTemplate>> {
        self.repository.get_templates(user_id)
    }

    fn get_template(&self, template_id: &str) -> Result<Option<WorkoutTemplate>> {
        self.repository.get_template(template_id)
    }

    async fn save_template(&self, template: NewWorkoutTemplate) -> Result<WorkoutTemplate> {
        if template.name.trim().is_empty() {
            return Err(Error::validation("Template requires a name"));
        }
        self.repository.upsert_template(template).await
    }

    async fn update_template(
        &self,
        template_id: String,
        update: WorkoutTemplateUpdate,
    ) -> Result<WorkoutTemplate> {
        self.repository.update_template(template_id, update).await
    }

    async fn delete_template(&self, template_id: String) -> Result<usize> {
        self.repository.delete_template(template_id).await
    }
}
