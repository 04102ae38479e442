use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use liftlog_core::goals::Goal;

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
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GoalDB {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub target_value: f64,
    pub target_date: Option<String>,
    pub is_achieved: bool,
    pub created_at: String,
}

impl From<GoalDB> for Goal {
    fn from(db: GoalDB) -> Self {
        Goal {
            id: db.id,
            user_id: db.user_id,
            title: db.title,
            target_value: db.target_value,
            target_date: db.target_date,
            is_achieved: db.is_achieved,
            created_at: db.created_at,
        }
    }
}
