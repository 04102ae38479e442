use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use liftlog_core::errors::Result;
use liftlog_core::goals::{Goal, GoalRepositoryTrait, NewGoal};
use liftlog_core::sync::{NewOutboxEntry, SyncEntity, SyncOperation};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::goals;
use crate::sync::write_outbox_entry;

use super::model::GoalDB;

pub struct GoalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl GoalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        GoalRepository { pool, writer }
    }
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    fn get_goals(&self, user_id: &str) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goals::table
            .filter(goals::user_id.eq(user_id))
            .order(goals::created_at.desc())
            .load::<GoalDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Goal::from).collect())
    }

    async fn upsert_goal(&self, goal: NewGoal) -> Result<Goal> {
        self.writer
            .exec(move |conn| {
                let row = GoalDB {
                    id: goal.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    user_id: goal.user_id,
                    title: goal.title,
                    target_value: goal.target_value,
                    target_date: goal.target_date,
                    is_achieved: false,
                    created_at: Utc::now().to_rfc3339(),
                };

                let existed = goals::table
                    .find(&row.id)
                    .first::<GoalDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .is_some();

                let result_db = diesel::insert_into(goals::table)
                    .values(&row)
                    .on_conflict(goals::id)
                    .do_update()
                    .set(&row)
                    .returning(GoalDB::as_returning())
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
                        SyncEntity::Goal,
                        result_db.id.clone(),
                        op,
                        serde_json::to_value(&result_db)?,
                    ),
                )?;
                Ok(Goal::from(result_db))
            })
            .await
    }

    async fn mark_achieved(&self, goal_id: String) -> Result<Goal> {
        self.writer
            .exec(move |conn| {
                diesel::update(goals::table.find(&goal_id))
                    .set(goals::is_achieved.eq(true))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let result_db = goals::table
                    .find(&goal_id)
                    .first::<GoalDB>(conn)
                    .map_err(StorageError::from)?;
                write_outbox_entry(
                    conn,
                    NewOutboxEntry::new(
                        SyncEntity::Goal,
                        result_db.id.clone(),
                        SyncOperation::Update,
                        serde_json::to_value(&result_db)?,
                    ),
                )?;
                Ok(Goal::from(result_db))
            })
            .await
    }

    async fn delete_goal(&self, goal_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let affected = diesel::delete(goals::table.find(&goal_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                if affected > 0 {
                    write_outbox_entry(
                        conn,
                        NewOutboxEntry::new(
                            SyncEntity::Goal,
                            goal_id.clone(),
                            SyncOperation::Delete,
                            serde_json::json!({ "id": goal_id }),
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

    #[tokio::test]
    async fn goal_lifecycle_create_achieve_delete() {
        let (pool, writer) = setup_db();
        let repo = GoalRepository::new(pool, writer);

        let goal = repo
            .upsert_goal(NewGoal {
                id: Some("goal-1".to_string()),
                user_id: "u1".to_string(),
                title: "Squat 140kg".to_string(),
                target_value: 140.0,
                target_date: None,
            })
            .await
            .expect("upsert");
        assert!(!goal.is_achieved);

        let achieved = repo
            .mark_achieved("goal-1".to_string())
            .await
            .expect("achieve");
        assert!(achieved.is_achieved);

        assert_eq!(
            repo.delete_goal("goal-1".to_string()).await.expect("delete"),
            1
        );
        assert!(repo.get_goals("u1").expect("goals").is_empty());
        assert_eq!(
            repo.delete_goal("goal-1".to_string())
                .await
                .expect("redelete"),
            0
        );
    }
}
