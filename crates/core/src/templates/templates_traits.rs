use async_trait::async_trait;

use super::{NewWorkoutTemplate, WorkoutTemplate, WorkoutTemplateUpdate};
use crate::errors::Result;

#[async_trait]
pub trait TemplateRepositoryTrait: Send + Sync {
    fn get_templates(&self, user_id: &str) -> Result<Vec<WorkoutTemplate>>;

    fn get_template(&self, template_id: &str) -> Result<Option<WorkoutTemplate>>;

    async fn upsert_template(&self, template: NewWorkoutTemplate) -> Result<WorkoutTemplate>;

    async fn update_template(
        &self,
        template_id: String,
        update: WorkoutTemplateUpdate,
    ) -> Result<WorkoutTemplate>;

    async fn delete_template(&self, template_id: String) -> Result<usize>;
}
