//! Outbox repository plus the in-transaction append helper used by every
//! syncable domain write.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::warn;

use liftlog_core::errors::{DatabaseError, Error, Result};
use liftlog_core::sync::{
    NewOutboxEntry, OutboxEntry, OutboxRepositoryTrait, SyncEngineState,
};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{sync_engine_state, sync_outbox};

use super::model::{NewSyncOutboxRowDB, SyncEngineStateDB, SyncOutboxRowDB};

pub(crate) fn enum_to_db<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.trim_matches('"').to_string())
}

pub(crate) fn enum_from_db<T: serde::de::DeserializeOwned>(value: &str) -> Result<T> {
    Ok(serde_json::from_str(&format!("\"{}\"", value))?)
}

/// Appends an outbox row inside the caller's transaction. Domain
/// repositories call this right beside the local write, so the write and its
/// sync intent commit or roll back together. Returns the queue-local
/// sequence id.
pub fn write_outbox_entry(conn: &mut SqliteConnection, request: NewOutboxEntry) -> Result<i64> {
    let payload_obj = request.payload.as_object().ok_or_else(|| {
        Error::Database(DatabaseError::Internal(
            "Outbox payload must be a JSON object".to_string(),
        ))
    })?;
    if let Some(payload_id) = payload_obj.get("id").and_then(|value| value.as_str()) {
        if payload_id != request.entity_id {
            return Err(Error::Database(DatabaseError::Internal(format!(
                "Outbox payload id '{}' does not match entity id '{}'",
                payload_id, request.entity_id
            ))));
        }
    }

    let row = NewSyncOutboxRowDB {
        entity: enum_to_db(&request.entity)?,
        entity_id: request.entity_id,
        op: enum_to_db(&request.op)?,
        payload: serde_json::to_string(&request.payload)?,
        created_at: Utc::now().to_rfc3339(),
        attempts: 0,
        last_error: None,
    };

    let entry_id = diesel::insert_into(sync_outbox::table)
        .values(&row)
        .returning(sync_outbox::id)
        .get_result::<i64>(conn)
        .map_err(StorageError::from)?;
    Ok(entry_id)
}

fn to_outbox_entry(row: SyncOutboxRowDB) -> Result<OutboxEntry> {
    Ok(OutboxEntry {
        id: row.id,
        entity: enum_from_db(&row.entity)?,
        entity_id: row.entity_id,
        op: enum_from_db(&row.op)?,
        payload: row.payload,
        created_at: row.created_at,
        attempts: row.attempts,
        last_error: row.last_error,
    })
}

pub struct OutboxRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl OutboxRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl OutboxRepositoryTrait for OutboxRepository {
    async fn add(&self, entry: NewOutboxEntry) -> Result<i64> {
        self.writer
            .exec(move |conn| write_outbox_entry(conn, entry))
            .await
    }

    fn list_pending(&self, limit: i64) -> Result<Vec<OutboxEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = sync_outbox::table
            .order((sync_outbox::created_at.asc(), sync_outbox::id.asc()))
            .limit(limit)
            .load::<SyncOutboxRowDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(to_outbox_entry).collect()
    }

    fn count_pending(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let count = sync_outbox::table
            .select(count_star())
            .first(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }

    fn count_stuck(&self, attempts_threshold: i32) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let count = sync_outbox::table
            .filter(sync_outbox::attempts.ge(attempts_threshold))
            .select(count_star())
            .first(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }

    async fn remove(&self, entry_id: i64) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::delete(sync_outbox::table.find(entry_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn record_failure(&self, entry_id: i64, message: String) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::update(sync_outbox::table.find(entry_id))
                    .set((
                        sync_outbox::attempts.eq(sync_outbox::attempts + 1),
                        sync_outbox::last_error.eq(Some(message)),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn clear(&self) -> Result<usize> {
        warn!("Clearing the sync outbox; pending writes will never reach the backend");
        self.writer
            .exec(move |conn| {
                let removed = diesel::delete(sync_outbox::table)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(removed)
            })
            .await
    }

    fn engine_state(&self) -> Result<SyncEngineState> {
        let mut conn = get_connection(&self.pool)?;
        let row = sync_engine_state::table
            .find(1)
            .first::<SyncEngineStateDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row
            .map(|state| SyncEngineState {
                last_drain_at: state.last_drain_at,
                consecutive_failures: state.consecutive_failures,
                last_error: state.last_error,
                last_drain_status: state.last_drain_status,
            })
            .unwrap_or_default())
    }

    async fn mark_drain_outcome(&self, status: String, error: Option<String>) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let now = Utc::now().to_rfc3339();
                let succeeded = status == "ok";
                let seed = SyncEngineStateDB {
                    id: 1,
                    last_drain_at: Some(now.clone()),
                    consecutive_failures: if succeeded { 0 } else { 1 },
                    last_error: error.clone(),
                    last_drain_status: Some(status.clone()),
                };

                if succeeded {
                    diesel::insert_into(sync_engine_state::table)
                        .values(&seed)
                        .on_conflict(sync_engine_state::id)
                        .do_update()
                        .set((
                            sync_engine_state::last_drain_at.eq(Some(now)),
                            sync_engine_state::consecutive_failures.eq(0),
                            sync_engine_state::last_error.eq(None::<String>),
                            sync_engine_state::last_drain_status.eq(Some(status)),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                } else {
                    diesel::insert_into(sync_engine_state::table)
                        .values(&seed)
                        .on_conflict(sync_engine_state::id)
                        .do_update()
                        .set((
                            sync_engine_state::last_drain_at.eq(Some(now)),
                            sync_engine_state::consecutive_failures
                                .eq(sync_engine_state::consecutive_failures + 1),
                            sync_engine_state::last_error.eq(error),
                            sync_engine_state::last_drain_status.eq(Some(status)),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::setup_db;
    use crate::schema::gyms;
    use liftlog_core::sync::{SyncEntity, SyncOperation};

    fn entry(entity_id: &str) -> NewOutboxEntry {
        NewOutboxEntry::new(
            SyncEntity::Gym,
            entity_id,
            SyncOperation::Create,
            serde_json::json!({ "id": entity_id, "name": "Garage" }),
        )
    }

    #[tokio::test]
    async fn add_assigns_increasing_sequence_ids() {
        let (pool, writer) = setup_db();
        let repo = OutboxRepository::new(pool, writer);

        let first = repo.add(entry("gym-1")).await.expect("add");
        let second = repo.add(entry("gym-2")).await.expect("add");
        assert!(second > first);
        assert_eq!(repo.count_pending().expect("count"), 2);
    }

    #[tokio::test]
    async fn list_pending_is_fifo_and_failures_keep_position() {
        let (pool, writer) = setup_db();
        let repo = OutboxRepository::new(pool, writer);
        for id in ["gym-a", "gym-b", "gym-c"] {
            repo.add(entry(id)).await.expect("add");
        }

        let middle_id = repo.list_pending(10).expect("list")[1].id;
        repo.record_failure(middle_id, "remote rejected".to_string())
            .await
            .expect("record failure");

        let pending = repo.list_pending(10).expect("list");
        let order: Vec<_> = pending.iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(order, vec!["gym-a", "gym-b", "gym-c"]);
        assert_eq!(pending[1].attempts, 1);
        assert_eq!(pending[1].last_error.as_deref(), Some("remote rejected"));
        assert_eq!(repo.count_stuck(1).expect("stuck"), 1);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let (pool, writer) = setup_db();
        let repo = OutboxRepository::new(pool, writer);
        let id = repo.add(entry("gym-x")).await.expect("add");

        repo.remove(id).await.expect("remove");
        repo.remove(id).await.expect("second remove is a no-op");
        assert_eq!(repo.count_pending().expect("count"), 0);
    }

    #[tokio::test]
    async fn clear_wipes_the_queue() {
        let (pool, writer) = setup_db();
        let repo = OutboxRepository::new(pool, writer);
        for id in ["gym-a", "gym-b"] {
            repo.add(entry(id)).await.expect("add");
        }

        assert_eq!(repo.clear().await.expect("clear"), 2);
        assert_eq!(repo.count_pending().expect("count"), 0);
    }

    #[tokio::test]
    async fn payload_must_carry_the_matching_row_id() {
        let (pool, writer) = setup_db();
        let repo = OutboxRepository::new(pool, writer);

        let mismatched = NewOutboxEntry::new(
            SyncEntity::Gym,
            "gym-1",
            SyncOperation::Update,
            serde_json::json!({ "id": "gym-2" }),
        );
        assert!(repo.add(mismatched).await.is_err());
        assert_eq!(repo.count_pending().expect("count"), 0);
    }

    #[tokio::test]
    async fn drain_outcomes_track_consecutive_failures() {
        let (pool, writer) = setup_db();
        let repo = OutboxRepository::new(pool, writer);

        repo.mark_drain_outcome("error".to_string(), Some("boom".to_string()))
            .await
            .expect("mark");
        repo.mark_drain_outcome("error".to_string(), Some("boom again".to_string()))
            .await
            .expect("mark");
        let state = repo.engine_state().expect("state");
        assert_eq!(state.consecutive_failures, 2);
        assert_eq!(state.last_error.as_deref(), Some("boom again"));

        repo.mark_drain_outcome("ok".to_string(), None)
            .await
            .expect("mark");
        let state = repo.engine_state().expect("state");
        assert_eq!(state.consecutive_failures, 0);
        assert_eq!(state.last_error, None);
        assert_eq!(state.last_drain_status.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn outbox_write_rollback_keeps_mutation_atomic() {
        let (pool, writer) = setup_db();

        let tx_result = writer
            .exec(|conn| {
                diesel::insert_into(gyms::table)
                    .values((
                        gyms::id.eq("gym-rollback"),
                        gyms::user_id.eq("u1"),
                        gyms::name.eq("Garage"),
                        gyms::equipment.eq("[]"),
                        gyms::is_active.eq(false),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                // Mismatched payload id makes the outbox append fail after
                // the domain write succeeded.
                write_outbox_entry(
                    conn,
                    NewOutboxEntry::new(
                        SyncEntity::Gym,
                        "gym-rollback",
                        SyncOperation::Create,
                        serde_json::json!({ "id": "someone-else" }),
                    ),
                )?;
                Ok(())
            })
            .await;
        assert!(tx_result.is_err(), "expected outbox append failure");

        let mut conn = get_connection(&pool).expect("conn");
        let gym_count: i64 = gyms::table
            .filter(gyms::id.eq("gym-rollback"))
            .select(count_star())
            .first(&mut conn)
            .expect("count");
        assert_eq!(gym_count, 0, "gym insert should be rolled back");

        let repo = OutboxRepository::new(pool, writer);
        assert_eq!(repo.count_pending().expect("count"), 0);
    }
}
