use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use liftlog_core::errors::Result;
use liftlog_core::gyms::{Gym, GymRepositoryTrait, NewGym};
use liftlog_core::sync::{NewOutboxEntry, SyncEntity, SyncOperation};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::gyms;
use crate::sync::write_outbox_entry;

use super::model::GymDB;

pub struct GymRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl GymRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        GymRepository { pool, writer }
    }
}

#[async_trait]
impl GymRepositoryTrait for GymRepository {
    fn get_gyms(&self, user_id: &str) -> Result<Vec<Gym>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = gyms::table
            .filter(gyms::user_id.eq(user_id))
            .order((gyms::is_active.desc(), gyms::name.asc()))
            .load::<GymDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Gym::from).collect())
    }

    fn get_gym(&self, gym_id: &str) -> Result<Option<Gym>> {
        let mut conn = get_connection(&self.pool)?;
        let row = gyms::table
            .find(gym_id)
            .first::<GymDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Gym::from))
    }

    async fn upsert_gym(&self, gym: NewGym) -> Result<Gym> {
        self.writer
            .exec(move |conn| {
                let row = GymDB {
                    id: gym.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    user_id: gym.user_id,
                    name: gym.name,
                    equipment: serde_json::to_string(&gym.equipment)?,
                    is_active: false,
                };

                let existed = gyms::table
                    .find(&row.id)
                    .first::<GymDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?;

                // An upsert never changes activation; that goes through
                // set_active_gym.
                let mut row = row;
                if let Some(existing) = &existed {
                    row.is_active = existing.is_active;
                }

                let result_db = diesel::insert_into(gyms::table)
                    .values(&row)
                    .on_conflict(gyms::id)
                    .do_update()
                    .set(&row)
                    .returning(GymDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;

                let op = if existed.is_some() {
                    SyncOperation::Update
                } else {
                    SyncOperation::Create
                };
                write_outbox_entry(
                    conn,
                    NewOutboxEntry::new(
                        SyncEntity::Gym,
                        result_db.id.clone(),
                        op,
                        serde_json::to_value(&result_db)?,
                    ),
                )?;
                Ok(Gym::from(result_db))
            })
            .await
    }

    async fn set_active_gym(&self, user_id: String, gym_id: String) -> Result<Gym> {
        self.writer
            .exec(move |conn| {
                // Deactivate siblings first so at most one gym per user ever
                // holds the flag; one transaction covers both statements.
                diesel::update(
                    gyms::table
                        .filter(gyms::user_id.eq(&user_id))
                        .filter(gyms::id.ne(&gym_id)),
                )
                .set(gyms::is_active.eq(false))
                .execute(conn)
                .map_err(StorageError::from)?;

                diesel::update(gyms::table.find(&gym_id))
                    .set(gyms::is_active.eq(true))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let result_db = gyms::table
                    .find(&gym_id)
                    .first::<GymDB>(conn)
                    .map_err(StorageError::from)?;
                write_outbox_entry(
                    conn,
                    NewOutboxEntry::new(
                        SyncEntity::Gym,
                        result_db.id.clone(),
                        SyncOperation::Update,
                        serde_json::to_value(&result_db)?,
                    ),
                )?;
                Ok(Gym::from(result_db))
            })
            .await
    }

    async fn delete_gym(&self, gym_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let affected = diesel::delete(gyms::table.find(&gym_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                if affected > 0 {
                    write_outbox_entry(
                        conn,
                        NewOutboxEntry::new(
                            SyncEntity::Gym,
                            gym_id.clone(),
                            SyncOperation::Delete,
                            serde_json::json!({ "id": gym_id }),
                        ),
                    )?;
                }
                Ok(affected)
            })
            .await
    }
}
