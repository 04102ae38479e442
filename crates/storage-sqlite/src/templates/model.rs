use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use liftlog_core::templates::WorkoutTemplate;

use crate::json::string_list_from_json;

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
#[diesel(table_name = crate::schema::workout_templates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WorkoutTemplateDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub exercises: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<WorkoutTemplateDB> for WorkoutTemplate {
    fn from(db: WorkoutTemplateDB) -> Self {
        let exercises = string_list_from_json(&db.exercises, "exercises", &db.id);
        WorkoutTemplate {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            exercises,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = crate::schema::workout_templates)]
pub struct WorkoutTemplateChangesetDB {
    pub name: Option<String>,
    pub exercises: Option<String>,
    pub updated_at: Option<String>,
}
