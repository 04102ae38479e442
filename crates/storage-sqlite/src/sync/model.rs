//! Database models for the sync infrastructure tables.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Queryable, Identifiable, Selectable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::sync_outbox)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SyncOutboxRowDB {
    pub id: i64,
    pub entity: String,
    pub entity_id: String,
    pub op: String,
    pub payload: String,
    pub created_at: String,
    pub attempts: i32,
    pub last_error: Option<String>,
}

/// Insert form without the autoincrement sequence id.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::sync_outbox)]
pub struct NewSyncOutboxRowDB {
    pub entity: String,
    pub entity_id: String,
    pub op: String,
    pub payload: String,
    pub created_at: String,
    pub attempts: i32,
    pub last_error: Option<String>,
}

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
#[diesel(table_name = crate::schema::sync_engine_state)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SyncEngineStateDB {
    pub id: i32,
    pub last_drain_at: Option<String>,
    pub consecutive_failures: i32,
    pub last_error: Option<String>,
    pub last_drain_status: Option<String>,
}
