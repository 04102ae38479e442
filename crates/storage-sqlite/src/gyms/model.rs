use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use liftlog_core::gyms::Gym;

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
#[diesel(table_name = crate::schema::gyms)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GymDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub equipment: String,
    pub is_active: bool,
}

impl From<GymDB> for Gym {
    fn from(db: GymDB) -> Self {
        let equipment = string_list_from_json(&db.equipment, "equipment", &db.id);
        Gym {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            equipment,
            is_active: db.is_active,
        }
    }
}
