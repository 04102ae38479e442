use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use liftlog_core::achievements::UserAchievement;

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
#[diesel(table_name = crate::schema::user_achievements)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserAchievementDB {
    pub id: String,
    pub user_id: String,
    pub achievement_id: String,
    pub unlocked_at: String,
    pub progress_value: f64,
}

impl From<UserAchievementDB> for UserAchievement {
    fn from(db: UserAchievementDB) -> Self {
        UserAchievement {
            id: db.id,
            user_id: db.user_id,
            achievement_id: db.achievement_id,
            unlocked_at: db.unlocked_at,
            progress_value: db.progress_value,
        }
    }
}
