use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use liftlog_core::workouts::{SetLog, WorkoutSession};

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
#[diesel(table_name = crate::schema::workout_sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WorkoutSessionDB {
    pub id: String,
    pub user_id: String,
    pub session_date: String,
    pub template_name: Option<String>,
    pub completed_at: Option<String>,
    pub rating: Option<i32>,
    pub duration_seconds: Option<i32>,
    pub tpath_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<WorkoutSessionDB> for WorkoutSession {
    fn from(db: WorkoutSessionDB) -> Self {
        WorkoutSession {
            id: db.id,
            user_id: db.user_id,
            session_date: db.session_date,
            template_name: db.template_name,
            completed_at: db.completed_at,
            rating: db.rating,
            duration_seconds: db.duration_seconds,
            tpath_id: db.tpath_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Sparse session changeset; `None` fields are left untouched.
#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = crate::schema::workout_sessions)]
pub struct WorkoutSessionChangesetDB {
    pub template_name: Option<String>,
    pub completed_at: Option<String>,
    pub rating: Option<i32>,
    pub duration_seconds: Option<i32>,
    pub updated_at: Option<String>,
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
#[diesel(table_name = crate::schema::set_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SetLogDB {
    pub id: String,
    pub session_id: String,
    pub exercise_id: String,
    pub weight: Option<f64>,
    pub reps: Option<i32>,
    pub reps_left: Option<i32>,
    pub reps_right: Option<i32>,
    pub duration_seconds: Option<i32>,
    pub is_pb: bool,
    pub created_at: String,
}

impl From<SetLogDB> for SetLog {
    fn from(db: SetLogDB) -> Self {
        SetLog {
            id: db.id,
            session_id: db.session_id,
            exercise_id: db.exercise_id,
            weight: db.weight,
            reps: db.reps,
            reps_left: db.reps_left,
            reps_right: db.reps_right,
            duration_seconds: db.duration_seconds,
            is_pb: db.is_pb,
            created_at: db.created_at,
        }
    }
}
