use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use uuid::Uuid;

use liftlog_core::errors::Result;
use liftlog_core::sync::{NewOutboxEntry, SyncEntity, SyncOperation};
use liftlog_core::workouts::{
    NewSetLog, NewWorkoutSession, SetLog, SetVolumeRow, WorkoutRepositoryTrait, WorkoutSession,
    WorkoutSessionUpdate,
};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{set_logs, workout_sessions};
use crate::sync::write_outbox_entry;

use super::model::{SetLogDB, WorkoutSessionChangesetDB, WorkoutSessionDB};

pub struct WorkoutRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl WorkoutRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        WorkoutRepository { pool, writer }
    }
}

fn upsert_session_tx(
    conn: &mut SqliteConnection,
    session: NewWorkoutSession,
) -> Result<WorkoutSession> {
    let now = Utc::now().to_rfc3339();
    let row = WorkoutSessionDB {
        id: session.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        user_id: session.user_id,
        session_date: session.session_date,
        template_name: session.template_name,
        completed_at: None,
        rating: None,
        duration_seconds: None,
        tpath_id: session.tpath_id,
        created_at: now.clone(),
        updated_at: now,
    };

    let existed = workout_sessions::table
        .find(&row.id)
        .first::<WorkoutSessionDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .is_some();

    let result_db = diesel::insert_into(workout_sessions::table)
        .values(&row)
        .on_conflict(workout_sessions::id)
        .do_update()
        .set(&row)
        .returning(WorkoutSessionDB::as_returning())
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
            SyncEntity::WorkoutSession,
            result_db.id.clone(),
            op,
            serde_json::to_value(&result_db)?,
        ),
    )?;
    Ok(WorkoutSession::from(result_db))
}

#[async_trait]
impl WorkoutRepositoryTrait for WorkoutRepository {
    fn get_sessions(&self, user_id: &str) -> Result<Vec<WorkoutSession>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = workout_sessions::table
            .filter(workout_sessions::user_id.eq(user_id))
            .order(workout_sessions::session_date.desc())
            .load::<WorkoutSessionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(WorkoutSession::from).collect())
    }

    fn get_session(&self, session_id: &str) -> Result<Option<WorkoutSession>> {
        let mut conn = get_connection(&self.pool)?;
        let row = workout_sessions::table
            .find(session_id)
            .first::<WorkoutSessionDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(WorkoutSession::from))
    }

    async fn upsert_session(&self, session: NewWorkoutSession) -> Result<WorkoutSession> {
        self.writer
            .exec(move |conn| upsert_session_tx(conn, session))
            .await
    }

    async fn update_session(
        &self,
        session_id: String,
        update: WorkoutSessionUpdate,
    ) -> Result<WorkoutSession> {
        self.writer
            .exec(move |conn| {
                if update.is_empty() {
                    // Nothing but the timestamp would change; leave the row
                    // alone.
                    let row = workout_sessions::table
                        .find(&session_id)
                        .first::<WorkoutSessionDB>(conn)
                        .map_err(StorageError::from)?;
                    return Ok(WorkoutSession::from(row));
                }

                let changeset = WorkoutSessionChangesetDB {
                    template_name: update.template_name,
                    completed_at: update.completed_at,
                    rating: update.rating,
                    duration_seconds: update.duration_seconds,
                    updated_at: Some(Utc::now().to_rfc3339()),
                };
                diesel::update(workout_sessions::table.find(&session_id))
                    .set(&changeset)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let result_db = workout_sessions::table
                    .find(&session_id)
                    .first::<WorkoutSessionDB>(conn)
                    .map_err(StorageError::from)?;
                write_outbox_entry(
                    conn,
                    NewOutboxEntry::new(
                        SyncEntity::WorkoutSession,
                        result_db.id.clone(),
                        SyncOperation::Update,
                        serde_json::to_value(&result_db)?,
                    ),
                )?;
                Ok(WorkoutSession::from(result_db))
            })
            .await
    }

    async fn delete_session(&self, session_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let affected = diesel::delete(workout_sessions::table.find(&session_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                if affected > 0 {
                    write_outbox_entry(
                        conn,
                        NewOutboxEntry::new(
                            SyncEntity::WorkoutSession,
                            session_id.clone(),
                            SyncOperation::Delete,
                            serde_json::json!({ "id": session_id }),
                        ),
                    )?;
                }
                Ok(affected)
            })
            .await
    }

    fn get_set_logs(&self, session_id: &str) -> Result<Vec<SetLog>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = set_logs::table
            .filter(set_logs::session_id.eq(session_id))
            .order(set_logs::created_at.asc())
            .load::<SetLogDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(SetLog::from).collect())
    }

    async fn add_set_log(&self, set_log: NewSetLog) -> Result<SetLog> {
        self.writer
            .exec(move |conn| {
                let row = SetLogDB {
                    id: set_log.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    session_id: set_log.session_id,
                    exercise_id: set_log.exercise_id,
                    weight: set_log.weight,
                    reps: set_log.reps,
                    reps_left: set_log.reps_left,
                    reps_right: set_log.reps_right,
                    duration_seconds: set_log.duration_seconds,
                    is_pb: set_log.is_pb,
                    created_at: Utc::now().to_rfc3339(),
                };

                let result_db = diesel::insert_into(set_logs::table)
                    .values(&row)
                    .on_conflict(set_logs::id)
                    .do_update()
                    .set(&row)
                    .returning(SetLogDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;

                write_outbox_entry(
                    conn,
                    NewOutboxEntry::new(
                        SyncEntity::SetLog,
                        result_db.id.clone(),
                        SyncOperation::Create,
                        serde_json::to_value(&result_db)?,
                    ),
                )?;
                Ok(SetLog::from(result_db))
            })
            .await
    }

    fn completed_session_timestamps(&self, user_id: &str, since: &str) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = workout_sessions::table
            .filter(workout_sessions::user_id.eq(user_id))
            .filter(workout_sessions::completed_at.is_not_null())
            .filter(workout_sessions::completed_at.ge(since.to_string()))
            .select(workout_sessions::completed_at)
            .load::<Option<String>>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().flatten().collect())
    }

    fn volume_rows_since(&self, user_id: &str, since: &str) -> Result<Vec<SetVolumeRow>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = set_logs::table
            .inner_join(workout_sessions::table)
            .filter(workout_sessions::user_id.eq(user_id))
            .filter(workout_sessions::completed_at.is_not_null())
            .filter(workout_sessions::completed_at.ge(since.to_string()))
            .select((
                workout_sessions::completed_at,
                set_logs::exercise_id,
                set_logs::weight,
                set_logs::reps,
                set_logs::reps_left,
                set_logs::reps_right,
            ))
            .load::<(
                Option<String>,
                String,
                Option<f64>,
                Option<i32>,
                Option<i32>,
                Option<i32>,
            )>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows
            .into_iter()
            .filter_map(
                |(completed_at, exercise_id, weight, reps, reps_left, reps_right)| {
                    completed_at.map(|completed_at| SetVolumeRow {
                        completed_at,
                        exercise_id,
                        weight,
                        reps,
                        reps_left,
                        reps_right,
                    })
                },
            )
            .collect())
    }

    fn max_weight_for_exercise(&self, user_id: &str, exercise_id: &str) -> Result<Option<f64>> {
        let mut conn = get_connection(&self.pool)?;
        let max = set_logs::table
            .inner_join(workout_sessions::table)
            .filter(workout_sessions::user_id.eq(user_id))
            .filter(set_logs::exercise_id.eq(exercise_id))
            .select(diesel::dsl::max(set_logs::weight))
            .first::<Option<f64>>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::setup_db;
    use crate::schema::sync_outbox;
    use diesel::dsl::count_star;

    fn new_session(id: &str, user_id: &str, session_date: &str) -> NewWorkoutSession {
        NewWorkoutSession {
            id: Some(id.to_string()),
            user_id: user_id.to_string(),
            session_date: session_date.to_string(),
            template_name: Some("Push Day".to_string()),
            tpath_id: None,
        }
    }

    fn new_set(session_id: &str, exercise_id: &str, weight: f64, reps: i32) -> NewSetLog {
        NewSetLog {
            id: None,
            session_id: session_id.to_string(),
            exercise_id: exercise_id.to_string(),
            weight: Some(weight),
            reps: Some(reps),
            reps_left: None,
            reps_right: None,
            duration_seconds: None,
            is_pb: false,
        }
    }

    fn outbox_count(pool: &Arc<DbPool>) -> i64 {
        let mut conn = get_connection(pool).expect("conn");
        sync_outbox::table
            .select(count_star())
            .first(&mut conn)
            .expect("count")
    }

    #[tokio::test]
    async fn upsert_session_is_idempotent() {
        let (pool, writer) = setup_db();
        let repo = WorkoutRepository::new(pool.clone(), writer);

        let session = new_session("s1", "u1", "2026-08-05T09:00:00+00:00");
        repo.upsert_session(session.clone()).await.expect("first upsert");
        repo.upsert_session(session).await.expect("second upsert");

        let sessions = repo.get_sessions("u1").expect("sessions");
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "s1");
    }

    #[tokio::test]
    async fn sessions_are_ordered_newest_first() {
        let (pool, writer) = setup_db();
        let repo = WorkoutRepository::new(pool, writer);

        for (id, date) in [
            ("s-old", "2026-08-01T09:00:00+00:00"),
            ("s-new", "2026-08-05T09:00:00+00:00"),
            ("s-mid", "2026-08-03T09:00:00+00:00"),
        ] {
            repo.upsert_session(new_session(id, "u1", date))
                .await
                .expect("upsert");
        }

        let ids: Vec<_> = repo
            .get_sessions("u1")
            .expect("sessions")
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["s-new", "s-mid", "s-old"]);
    }

    #[tokio::test]
    async fn partial_update_touches_only_supplied_fields() {
        let (pool, writer) = setup_db();
        let repo = WorkoutRepository::new(pool, writer);
        repo.upsert_session(new_session("s1", "u1", "2026-08-05T09:00:00+00:00"))
            .await
            .expect("upsert");

        let updated = repo
            .update_session(
                "s1".to_string(),
                WorkoutSessionUpdate {
                    completed_at: Some("2026-08-05T10:00:00+00:00".to_string()),
                    rating: Some(4),
                    duration_seconds: Some(3600),
                    template_name: None,
                },
            )
            .await
            .expect("update");

        assert_eq!(
            updated.completed_at.as_deref(),
            Some("2026-08-05T10:00:00+00:00")
        );
        assert_eq!(updated.rating, Some(4));
        assert_eq!(updated.template_name.as_deref(), Some("Push Day"));
        assert_eq!(updated.session_date, "2026-08-05T09:00:00+00:00");
        assert_ne!(updated.updated_at, updated.created_at);
    }

    #[tokio::test]
    async fn empty_update_is_a_noop_and_enqueues_nothing() {
        let (pool, writer) = setup_db();
        let repo = WorkoutRepository::new(pool.clone(), writer);
        repo.upsert_session(new_session("s1", "u1", "2026-08-05T09:00:00+00:00"))
            .await
            .expect("upsert");
        let enqueued_before = outbox_count(&pool);

        let session = repo
            .update_session("s1".to_string(), WorkoutSessionUpdate::default())
            .await
            .expect("noop update");

        assert_eq!(session.id, "s1");
        assert_eq!(outbox_count(&pool), enqueued_before);
    }

    #[tokio::test]
    async fn deleting_a_session_cascades_to_its_set_logs() {
        let (pool, writer) = setup_db();
        let repo = WorkoutRepository::new(pool, writer);
        repo.upsert_session(new_session("s1", "u1", "2026-08-05T09:00:00+00:00"))
            .await
            .expect("upsert");
        repo.add_set_log(new_set("s1", "bench-press", 80.0, 5))
            .await
            .expect("set log");
        repo.add_set_log(new_set("s1", "bench-press", 82.5, 3))
            .await
            .expect("set log");

        let affected = repo.delete_session("s1".to_string()).await.expect("delete");
        assert_eq!(affected, 1);
        assert!(repo.get_set_logs("s1").expect("set logs").is_empty());

        // Deleting an unknown id is a silent no-op.
        let affected = repo.delete_session("s1".to_string()).await.expect("redelete");
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn aggregates_cover_volume_and_prs() {
        let (pool, writer) = setup_db();
        let repo = WorkoutRepository::new(pool, writer);
        repo.upsert_session(new_session("s1", "u1", "2026-08-05T09:00:00+00:00"))
            .await
            .expect("upsert");
        repo.update_session(
            "s1".to_string(),
            WorkoutSessionUpdate {
                completed_at: Some("2026-08-05T10:00:00+00:00".to_string()),
                ..WorkoutSessionUpdate::default()
            },
        )
        .await
        .expect("complete");
        repo.add_set_log(new_set("s1", "bench-press", 80.0, 5))
            .await
            .expect("set log");
        repo.add_set_log(new_set("s1", "bench-press", 90.0, 2))
            .await
            .expect("set log");

        let timestamps = repo
            .completed_session_timestamps("u1", "1970-01-01T00:00:00+00:00")
            .expect("timestamps");
        assert_eq!(timestamps.len(), 1);

        let rows = repo
            .volume_rows_since("u1", "1970-01-01T00:00:00+00:00")
            .expect("volume rows");
        assert_eq!(rows.len(), 2);
        let total: f64 = rows.iter().map(|row| row.volume()).sum();
        assert_eq!(total, 580.0);

        assert_eq!(
            repo.max_weight_for_exercise("u1", "bench-press")
                .expect("max"),
            Some(90.0)
        );
        assert_eq!(
            repo.max_weight_for_exercise("u1", "squat").expect("max"),
            None
        );
    }
}
