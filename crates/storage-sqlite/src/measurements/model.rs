use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use liftlog_core::measurements::BodyMeasurement;

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::body_measurements)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BodyMeasurementDB {
    pub id: String,
    pub user_id: String,
    pub measured_at: String,
    pub weight_kg: Option<f64>,
    pub body_fat_pct: Option<f64>,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<BodyMeasurementDB> for BodyMeasurement {
    fn from(db: BodyMeasurementDB) -> Self {
        BodyMeasurement {
            id: db.id,
            user_id: db.user_id,
            measured_at: db.measured_at,
            weight_kg: db.weight_kg,
            body_fat_pct: db.body_fat_pct,
            notes: db.notes,
            created_at: db.created_at,
        }
    }
}
