use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use liftlog_core::achievements::{
    AchievementRepositoryTrait, NewUserAchievement, UserAchievement,
};
use liftlog_core::errors::Result;
use liftlog_core::sync::{NewOutboxEntry, SyncEntity, SyncOperation};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::user_achievements;
use crate::sync::write_outbox_entry;

use super::model::UserAchievementDB;

pub struct AchievementRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AchievementRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        AchievementRepository { pool, writer }
    }
}

#[async_trait]
impl AchievementRepositoryTrait for AchievementRepository {
    fn get_achievements(&self, user_id: &str) -> Result<Vec<UserAchievement>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = user_achievements::table
            .filter(user_achievements::user_id.eq(user_id))
            .order(user_achievements::unlocked_at.desc())
            .load::<UserAchievementDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(UserAchievement::from).collect())
    }

    async fn unlock(&self, unlock: NewUserAchievement) -> Result<UserAchievement> {
        self.writer
            .exec(move |conn| {
                let existing = user_achievements::table
                    .filter(user_achievements::user_id.eq(&unlock.user_id))
                    .filter(user_achievements::achievement_id.eq(&unlock.achievement_id))
                    .first::<UserAchievementDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?;
                // The unique (user, achievement) row survives re-evaluation.
                if let Some(row) = existing {
                    return Ok(UserAchievement::from(row));
                }

                let row = UserAchievementDB {
                    id: unlock.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    user_id: unlock.user_id,
                    achievement_id: unlock.achievement_id,
                    unlocked_at: unlock.unlocked_at,
                    progress_value: unlock.progress_value,
                };
                let result_db = diesel::insert_into(user_achievements::table)
                    .values(&row)
                    .returning(UserAchievementDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;

                write_outbox_entry(
                    conn,
                    NewOutboxEntry::new(
                        SyncEntity::UserAchievement,
                        result_db.id.clone(),
                        SyncOperation::Create,
                        serde_json::to_value(&result_db)?,
                    ),
                )?;
                Ok(UserAchievement::from(result_db))
            })
            .await
    }

    async fn delete_achievement(&self, achievement_row_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let affected =
                    diesel::delete(user_achievements::table.find(&achievement_row_id))
                        .execute(conn)
                        .map_err(StorageError::from)?;

                if affected > 0 {
                    write_outbox_entry(
                        conn,
                        NewOutboxEntry::new(
                            SyncEntity::UserAchievement,
                            achievement_row_id.clone(),
                            SyncOperation::Delete,
                            serde_json::json!({ "id": achievement_row_id }),
                        ),
                    )?;
                }
                Ok(affected)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::setup_db;

    fn unlock_request(user_id: &str, achievement_id: &str, progress: f64) -> NewUserAchievement {
        NewUserAchievement {
            id: None,
            user_id: user_id.to_string(),
            achievement_id: achievement_id.to_string(),
            unlocked_at: "2026-08-05T10:00:00+00:00".to_string(),
            progress_value: progress,
        }
    }

    #[tokio::test]
    async fn unlock_is_idempotent_per_user_and_achievement() {
        let (pool, writer) = setup_db();
        let repo = AchievementRepository::new(pool, writer);

        let first = repo
            .unlock(unlock_request("u1", "week-streak", 7.0))
            .await
            .expect("unlock");
        let second = repo
            .unlock(unlock_request("u1", "week-streak", 9.0))
            .await
            .expect("re-unlock");

        assert_eq!(first.id, second.id);
        assert_eq!(second.progress_value, 7.0);
        assert_eq!(repo.get_achievements("u1").expect("list").len(), 1);
    }

    #[tokio::test]
    async fn different_users_unlock_independently() {
        let (pool, writer) = setup_db();
        let repo = AchievementRepository::new(pool, writer);

        repo.unlock(unlock_request("u1", "week-streak", 7.0))
            .await
            .expect("unlock u1");
        repo.unlock(unlock_request("u2", "week-streak", 7.0))
            .await
            .expect("unlock u2");

        assert_eq!(repo.get_achievements("u1").expect("list").len(), 1);
        assert_eq!(repo.get_achievements("u2").expect("list").len(), 1);
    }
}
