use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use liftlog_core::errors::Result;
use liftlog_core::sync::{NewOutboxEntry, SyncEntity, SyncOperation};
use liftlog_core::tpaths::{
    NewTPathExercise, NewTrainingPath, TPathExercise, TPathProgress, TrainingPath,
    TrainingPathRepositoryTrait,
};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{training_path_exercises, training_path_progress, training_paths};
use crate::sync::write_outbox_entry;

use super::model::{TPathExerciseDB, TPathProgressDB, TrainingPathDB};

pub struct TrainingPathRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TrainingPathRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        TrainingPathRepository { pool, writer }
    }
}

fn progress_entity_id(user_id: &str, tpath_id: &str) -> String {
    format!("{user_id}:{tpath_id}")
}

#[async_trait]
impl TrainingPathRepositoryTrait for TrainingPathRepository {
    fn get_paths(&self, user_id: &str) -> Result<Vec<TrainingPath>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = training_paths::table
            .filter(training_paths::user_id.eq(user_id))
            .filter(training_paths::parent_id.is_null())
            .order(training_paths::position.asc())
            .load::<TrainingPathDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(TrainingPath::from).collect())
    }

    fn get_path(&self, path_id: &str) -> Result<Option<TrainingPath>> {
        let mut conn = get_connection(&self.pool)?;
        let row = training_paths::table
            .find(path_id)
            .first::<TrainingPathDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(TrainingPath::from))
    }

    fn get_children(&self, parent_id: &str) -> Result<Vec<TrainingPath>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = training_paths::table
            .filter(training_paths::parent_id.eq(parent_id))
            .order(training_paths::position.asc())
            .load::<TrainingPathDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(TrainingPath::from).collect())
    }

    fn get_exercises(&self, path_id: &str) -> Result<Vec<TPathExercise>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = training_path_exercises::table
            .filter(training_path_exercises::tpath_id.eq(path_id))
            .order(training_path_exercises::position.asc())
            .load::<TPathExerciseDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(TPathExercise::from).collect())
    }

    async fn upsert_path(&self, path: NewTrainingPath) -> Result<TrainingPath> {
        self.writer
            .exec(move |conn| {
                let now = Utc::now().to_rfc3339();
                let generation_params = path
                    .generation_params
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?;
                let row = TrainingPathDB {
                    id: path.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    user_id: path.user_id,
                    name: path.name,
                    parent_id: path.parent_id,
                    position: path.position,
                    is_generated: path.is_generated,
                    generation_params,
                    created_at: now.clone(),
                    updated_at: now,
                };

                let existed = training_paths::table
                    .find(&row.id)
                    .first::<TrainingPathDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .is_some();

                let result_db = diesel::insert_into(training_paths::table)
                    .values(&row)
                    .on_conflict(training_paths::id)
                    .do_update()
                    .set(&row)
                    .returning(TrainingPathDB::as_returning())
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
                        SyncEntity::TrainingPath,
                        result_db.id.clone(),
                        op,
                        serde_json::to_value(&result_db)?,
                    ),
                )?;
                Ok(TrainingPath::from(result_db))
            })
            .await
    }

    async fn upsert_exercise(&self, exercise: NewTPathExercise) -> Result<TPathExercise> {
        self.writer
            .exec(move |conn| {
                let row = TPathExerciseDB {
                    id: exercise.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    tpath_id: exercise.tpath_id,
                    exercise_id: exercise.exercise_id,
                    position: exercise.position,
                    is_bonus: exercise.is_bonus,
                    target_sets: exercise.target_sets,
                    target_reps_min: exercise.target_reps_min,
                    target_reps_max: exercise.target_reps_max,
                };

                let existed = training_path_exercises::table
                    .find(&row.id)
                    .first::<TPathExerciseDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .is_some();

                let result_db = diesel::insert_into(training_path_exercises::table)
                    .values(&row)
                    .on_conflict(training_path_exercises::id)
                    .do_update()
                    .set(&row)
                    .returning(TPathExerciseDB::as_returning())
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
                        SyncEntity::TrainingPathExercise,
                        result_db.id.clone(),
                        op,
                        serde_json::to_value(&result_db)?,
                    ),
                )?;
                Ok(TPathExercise::from(result_db))
            })
            .await
    }

    async fn delete_path(&self, path_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                // FK cascades remove child days, their exercises and all
                // progress rows in the same statement.
                let affected = diesel::delete(training_paths::table.find(&path_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                if affected > 0 {
                    write_outbox_entry(
                        conn,
                        NewOutboxEntry::new(
                            SyncEntity::TrainingPath,
                            path_id.clone(),
                            SyncOperation::Delete,
                            serde_json::json!({ "id": path_id }),
                        ),
                    )?;
                }
                Ok(affected)
            })
            .await
    }

    fn get_progress(&self, user_id: &str, path_id: &str) -> Result<Option<TPathProgress>> {
        let mut conn = get_connection(&self.pool)?;
        let row = training_path_progress::table
            .find((user_id, path_id))
            .first::<TPathProgressDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(TPathProgress::from))
    }

    async fn upsert_progress(&self, progress: TPathProgress) -> Result<TPathProgress> {
        self.writer
            .exec(move |conn| {
                let row = TPathProgressDB::from(progress);
                diesel::insert_into(training_path_progress::table)
                    .values(&row)
                    .on_conflict((
                        training_path_progress::user_id,
                        training_path_progress::tpath_id,
                    ))
                    .do_update()
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                write_outbox_entry(
                    conn,
                    NewOutboxEntry::new(
                        SyncEntity::TrainingPathProgress,
                        progress_entity_id(&row.user_id, &row.tpath_id),
                        SyncOperation::Update,
                        serde_json::to_value(&row)?,
                    ),
                )?;
                Ok(TPathProgress::from(row))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::setup_db;
    use diesel::dsl::count_star;

    fn new_path(id: &str, parent_id: Option<&str>, position: i32) -> NewTrainingPath {
        NewTrainingPath {
            id: Some(id.to_string()),
            user_id: "u1".to_string(),
            name: format!("Path {id}"),
            parent_id: parent_id.map(str::to_string),
            position,
            is_generated: false,
            generation_params: None,
        }
    }

    fn new_exercise(id: &str, tpath_id: &str, position: i32) -> NewTPathExercise {
        NewTPathExercise {
            id: Some(id.to_string()),
            tpath_id: tpath_id.to_string(),
            exercise_id: "squat".to_string(),
            position,
            is_bonus: false,
            target_sets: 3,
            target_reps_min: 5,
            target_reps_max: 8,
        }
    }

    async fn seed_tree(repo: &TrainingPathRepository) {
        repo.upsert_path(new_path("program", None, 0)).await.expect("program");
        repo.upsert_path(new_path("day-a", Some("program"), 0))
            .await
            .expect("day a");
        repo.upsert_path(new_path("day-b", Some("program"), 1))
            .await
            .expect("day b");
        repo.upsert_exercise(new_exercise("ex-a1", "day-a", 0))
            .await
            .expect("ex a1");
        repo.upsert_exercise(new_exercise("ex-b1", "day-b", 0))
            .await
            .expect("ex b1");
        repo.upsert_progress(TPathProgress {
            user_id: "u1".to_string(),
            tpath_id: "day-a".to_string(),
            completed_at: None,
            last_accessed_at: Some("2026-08-05T10:00:00+00:00".to_string()),
            completed_count: 2,
        })
        .await
        .expect("progress");
    }

    #[tokio::test]
    async fn children_and_exercises_are_ordered_by_position() {
        let (pool, writer) = setup_db();
        let repo = TrainingPathRepository::new(pool, writer);
        seed_tree(&repo).await;

        let top = repo.get_paths("u1").expect("paths");
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, "program");

        let children: Vec<_> = repo
            .get_children("program")
            .expect("children")
            .into_iter()
            .map(|path| path.id)
            .collect();
        assert_eq!(children, vec!["day-a", "day-b"]);
        assert_eq!(repo.get_exercises("day-a").expect("exercises").len(), 1);
    }

    #[tokio::test]
    async fn deleting_a_program_removes_the_whole_tree() {
        let (pool, writer) = setup_db();
        let repo = TrainingPathRepository::new(pool.clone(), writer);
        seed_tree(&repo).await;

        let affected = repo
            .delete_path("program".to_string())
            .await
            .expect("delete");
        assert_eq!(affected, 1);

        let mut conn = get_connection(&pool).expect("conn");
        let paths: i64 = training_paths::table
            .select(count_star())
            .first(&mut conn)
            .expect("count");
        let exercises: i64 = training_path_exercises::table
            .select(count_star())
            .first(&mut conn)
            .expect("count");
        let progress: i64 = training_path_progress::table
            .select(count_star())
            .first(&mut conn)
            .expect("count");
        assert_eq!((paths, exercises, progress), (0, 0, 0));
    }

    #[tokio::test]
    async fn progress_is_one_row_per_user_and_path() {
        let (pool, writer) = setup_db();
        let repo = TrainingPathRepository::new(pool, writer);
        repo.upsert_path(new_path("program", None, 0)).await.expect("program");

        for count in 1..=3 {
            repo.upsert_progress(TPathProgress {
                user_id: "u1".to_string(),
                tpath_id: "program".to_string(),
                completed_at: None,
                last_accessed_at: None,
                completed_count: count,
            })
            .await
            .expect("progress");
        }

        let progress = repo
            .get_progress("u1", "program")
            .expect("get")
            .expect("row");
        assert_eq!(progress.completed_count, 3);
    }

    #[tokio::test]
    async fn generation_params_round_trip() {
        let (pool, writer) = setup_db();
        let repo = TrainingPathRepository::new(pool, writer);

        let mut path = new_path("generated", None, 0);
        path.is_generated = true;
        path.generation_params = Some(liftlog_core::tpaths::GenerationParams {
            source_model: Some("coach-v2".to_string()),
            goal: Some("hypertrophy".to_string()),
            days_per_week: Some(4),
            experience_level: Some("intermediate".to_string()),
        });
        let saved = repo.upsert_path(path).await.expect("upsert");

        let params = saved.generation_params.expect("params");
        assert_eq!(params.days_per_week, Some(4));
        assert_eq!(params.source_model.as_deref(), Some("coach-v2"));
    }
}
