use diesel::prelude::*;
use log::warn;
use serde::{Deserialize, Serialize};

use liftlog_core::tpaths::{GenerationParams, TPathExercise, TPathProgress, TrainingPath};

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
#[diesel(table_name = crate::schema::training_paths)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TrainingPathDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub position: i32,
    pub is_generated: bool,
    pub generation_params: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TrainingPathDB> for TrainingPath {
    fn from(db: TrainingPathDB) -> Self {
        let generation_params = db.generation_params.as_deref().and_then(|raw| {
            serde_json::from_str::<GenerationParams>(raw)
                .map_err(|err| {
                    warn!(
                        "Ignoring malformed generation_params JSON on path {}: {err}",
                        db.id
                    );
                })
                .ok()
        });
        TrainingPath {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            parent_id: db.parent_id,
            position: db.position,
            is_generated: db.is_generated,
            generation_params,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
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
#[diesel(table_name = crate::schema::training_path_exercises)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TPathExerciseDB {
    pub id: String,
    pub tpath_id: String,
    pub exercise_id: String,
    pub position: i32,
    pub is_bonus: bool,
    pub target_sets: i32,
    pub target_reps_min: i32,
    pub target_reps_max: i32,
}

impl From<TPathExerciseDB> for TPathExercise {
    fn from(db: TPathExerciseDB) -> Self {
        TPathExercise {
            id: db.id,
            tpath_id: db.tpath_id,
            exercise_id: db.exercise_id,
            position: db.position,
            is_bonus: db.is_bonus,
            target_sets: db.target_sets,
            target_reps_min: db.target_reps_min,
            target_reps_max: db.target_reps_max,
        }
    }
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
#[diesel(primary_key(user_id, tpath_id))]
#[diesel(table_name = crate::schema::training_path_progress)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TPathProgressDB {
    pub user_id: String,
    pub tpath_id: String,
    pub completed_at: Option<String>,
    pub last_accessed_at: Option<String>,
    pub completed_count: i32,
}

impl From<TPathProgressDB> for TPathProgress {
    fn from(db: TPathProgressDB) -> Self {
        TPathProgress {
            user_id: db.user_id,
            tpath_id: db.tpath_id,
            completed_at: db.completed_at,
            last_accessed_at: db.last_accessed_at,
            completed_count: db.completed_count,
        }
    }
}

impl From<TPathProgress> for TPathProgressDB {
    fn from(progress: TPathProgress) -> Self {
        TPathProgressDB {
            user_id: progress.user_id,
            tpath_id: progress.tpath_id,
            completed_at: progress.completed_at,
            last_accessed_at: progress.last_accessed_at,
            completed_count: progress.completed_count,
        }
    }
}
