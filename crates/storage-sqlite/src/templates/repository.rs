use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use liftlog_core::errors::Result;
use liftlog_core::sync::{NewOutboxEntry, SyncEntity, SyncOperation};
use liftlog_core::templates::{
    NewWorkoutTemplate, TemplateRepositoryTrait, WorkoutTemplate, WorkoutTemplateUpdate,
};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::workout_templates;
use crate::sync::write_outbox_entry;

use super::model::{WorkoutTemplateChangesetDB, WorkoutTemplateDB};

pub struct TemplateRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TemplateRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        TemplateRepository { pool, writer }
    }
}

#[async_trait]
impl TemplateRepositoryTrait for TemplateRepository {
    fn get_templates(&self, user_id: &str) -> Result<Vec<WorkoutTemplate>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = workout_templates::table
            .filter(workout_templates::user_id.eq(user_id))
            .order(workout_templates::name.asc())
            .load::<WorkoutTemplateDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(WorkoutTemplate::from).collect())
    }

    fn get_template(&self, template_id: &str) -> Result<Option<WorkoutTemplate>> {
        let mut conn = get_connection(&self.pool)?;
        let row = workout_templates::table
            .find(template_id)
            .first::<WorkoutTemplateDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(WorkoutTemplate::from))
    }

    async fn upsert_template(&self, template: NewWorkoutTemplate) -> Result<WorkoutTemplate> {
        self.writer
            .exec(move |conn| {
                let now = Utc::now().to_rfc3339();
                let row = WorkoutTemplateDB {
                    id: template.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    user_id: template.user_id,
                    name: template.name,
                    exercises: serde_json::to_string(&template.exercises)?,
                    created_at: now.clone(),
                    updated_at: now,
                };

                let existed = workout_templates::table
                    .find(&row.id)
                    .first::<WorkoutTemplateDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .is_some();

                let result_db = diesel::insert_into(workout_templates::table)
                    .values(&row)
                    .on_conflict(workout_templates::id)
                    .do_update()
                    .set(&row)
                    .returning(WorkoutTemplateDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;

                let op = if existed {
                    SyncOperation::Update
                } else {
                    SyncOperation::Create
                };
                write_outbox_entry(
                    conn,
                    NewOutboxEntry::new(
                        SyncEntity::WorkoutTemplate,
                        result_db.id.clone(),
                        op,
                        serde_json::to_value(&result_db)?,
                    ),
                )?;
                Ok(WorkoutTemplate::from(result_db))
            })
            .await
    }

    async fn update_template(
        &self,
        template_id: String,
        update: WorkoutTemplateUpdate,
    ) -> Result<WorkoutTemplate> {
        self.writer
            .exec(move |conn| {
                if update.is_empty() {
                    let row = workout_templates::table
                        .find(&template_id)
                        .first::<WorkoutTemplateDB>(conn)
                        .map_err(StorageError::from)?;
                    return Ok(WorkoutTemplate::from(row));
                }

                let exercises = update
                    .exercises
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?;
                let changeset = WorkoutTemplateChangesetDB {
                    name: update.name,
                    exercises,
                    updated_at: Some(Utc::now().to_rfc3339()),
                };
                diesel::update(workout_templates::table.find(&template_id))
                    .set(&changeset)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let result_db = workout_templates::table
                    .find(&template_id)
                    .first::<WorkoutTemplateDB>(conn)
                    .map_err(StorageError::from)?;
                write_outbox_entry(
                    conn,
                    NewOutboxEntry::new(
                        SyncEntity::WorkoutTemplate,
                        result_db.id.clone(),
                        SyncOperation::Update,
                        serde_json::to_value(&result_db)?,
                    ),
                )?;
                Ok(WorkoutTemplate::from(result_db))
            })
            .await
    }

    async fn delete_template(&self, template_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let affected = diesel::delete(workout_templates::table.find(&template_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                if affected > 0 {
                    write_outbox_entry(
                        conn,
                        NewOutboxEntry::new(
                            SyncEntity::WorkoutTemplate,
                            template_id.clone(),
                            SyncOperation::Delete,
                            serde_json::json!({ "id": template_id }),
                        ),
                    )?;
                }
                Ok(affected)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::setup_db;

    #[tokio::test]
    async fn exercise_lists_round_trip_through_the_json_column() {
        let (pool, writer) = setup_db();
        let repo = TemplateRepository::new(pool, writer);

        let saved = repo
            .upsert_template(NewWorkoutTemplate {
                id: Some("t1".to_string()),
                user_id: "u1".to_string(),
                name: "Push".to_string(),
                exercises: vec!["bench-press".to_string(), "ohp".to_string()],
            })
            .await
            .expect("upsert");
        assert_eq!(saved.exercises, vec!["bench-press", "ohp"]);

        let updated = repo
            .update_template(
                "t1".to_string(),
                WorkoutTemplateUpdate {
                    name: None,
                    exercises: Some(vec!["dips".to_string()]),
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.name, "Push");
        assert_eq!(updated.exercises, vec!["dips"]);
    }

    #[tokio::test]
    async fn rename_keeps_exercises() {
        let (pool, writer) = setup_db();
        let repo = TemplateRepository::new(pool, writer);
        repo.upsert_template(NewWorkoutTemplate {
            id: Some("t1".to_string()),
            user_id: "u1".to_string(),
            name: "Push".to_string(),
            exercises: vec!["bench-press".to_string()],
        })
        .await
        .expect("upsert");

        let renamed = repo
            .update_template(
                "t1".to_string(),
                WorkoutTemplateUpdate {
                    name: Some("Push A".to_string()),
                    exercises: None,
                },
            )
            .await
            .expect("rename");
        assert_eq!(renamed.name, "Push A");
        assert_eq!(renamed.exercises, vec!["bench-press"]);

        assert_eq!(
            repo.delete_template("t1".to_string()).await.expect("delete"),
            1
        );
        assert!(repo.get_template("t1").expect("get").is_none());
    }
}
