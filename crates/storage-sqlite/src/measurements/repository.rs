use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use liftlog_core::errors::Result;
use liftlog_core::measurements::{
    BodyMeasurement, MeasurementRepositoryTrait, NewBodyMeasurement,
};
use liftlog_core::sync::{NewOutboxEntry, SyncEntity, SyncOperation};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::body_measurements;
use crate::sync::write_outbox_entry;

use super::model::BodyMeasurementDB;

pub struct MeasurementRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl MeasurementRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        MeasurementRepository { pool, writer }
    }
}

#[async_trait]
impl MeasurementRepositoryTrait for MeasurementRepository {
    fn get_measurements(&self, user_id: &str) -> Result<Vec<BodyMeasurement>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = body_measurements::table
            .filter(body_measurements::user_id.eq(user_id))
            .order(body_measurements::measured_at.desc())
            .load::<BodyMeasurementDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(BodyMeasurement::from).collect())
    }

    async fn upsert_measurement(
        &self,
        measurement: NewBodyMeasurement,
    ) -> Result<BodyMeasurement> {
        self.writer
            .exec(move |conn| {
                let row = BodyMeasurementDB {
                    id: measurement.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    user_id: measurement.user_id,
                    measured_at: measurement.measured_at,
                    weight_kg: measurement.weight_kg,
                    body_fat_pct: measurement.body_fat_pct,
                    notes: measurement.notes,
                    created_at: Utc::now().to_rfc3339(),
                };

                let existed = body_measurements::table
                    .find(&row.id)
                    .first::<BodyMeasurementDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .is_some();

                let result_db = diesel::insert_into(body_measurements::table)
                    .values(&row)
                    .on_conflict(body_measurements::id)
                    .do_update()
                    .set(&row)
                    .returning(BodyMeasurementDB::as_returning())
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
                        SyncEntity::BodyMeasurement,
                        result_db.id.clone(),
                        op,
                        serde_json::to_value(&result_db)?,
                    ),
                )?;
                Ok(BodyMeasurement::from(result_db))
            })
            .await
    }

    async fn delete_measurement(&self, measurement_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let affected = diesel::delete(body_measurements::table.find(&measurement_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                if affected > 0 {
                    write_outbox_entry(
                        conn,
                        NewOutboxEntry::new(
                            SyncEntity::BodyMeasurement,
                            measurement_id.clone(),
                            SyncOperation::Delete,
                            serde_json::json!({ "id": measurement_id }),
                        ),
                    )?;
                }
                Ok(affected)
            })
            .await
    }
}
