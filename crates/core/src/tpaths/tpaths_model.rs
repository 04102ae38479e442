use serde::{Deserialize, Serialize};

/// A program node. Top-level rows (`parent_id == None`) are programs; child
/// rows are the scheduled days inside one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPath {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub position: i32,
    pub is_generated: bool,
    pub generation_params: Option<GenerationParams>,
    pub created_at: String,
    pub updated_at: String,
}

impl TrainingPath {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Provenance of an AI-generated program. Stored as a JSON column; the
/// domain side stays typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub source_model: Option<String>,
    pub goal: Option<String>,
    pub days_per_week: Option<i32>,
    pub experience_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrainingPath {
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub position: i32,
    pub is_generated: bool,
    pub generation_params: Option<GenerationParams>,
}

/// An exercise slot inside a training path day, ordered by `position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TPathExercise {
    pub id: String,
    pub tpath_id: String,
    pub exercise_id: String,
    pub position: i32,
    pub is_bonus: bool,
    pub target_sets: i32,
    pub target_reps_min: i32,
    pub target_reps_max: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTPathExercise {
    pub id: Option<String>,
    pub tpath_id: String,
    pub exercise_id: String,
    pub position: i32,
    pub is_bonus: bool,
    pub target_sets: i32,
    pub target_reps_min: i32,
    pub target_reps_max: i32,
}

/// Per-user aggregate for one path; one row per (user, path), upserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TPathProgress {
    pub user_id: String,
    pub tpath_id: String,
    pub completed_at: Option<String>,
    pub last_accessed_at: Option<String>,
    pub completed_count: i32,
}

/// A path with its exercises resolved, as served to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPathDetail {
    pub path: TrainingPath,
    pub exercises: Vec<TPathExercise>,
    pub days: Vec<TrainingPath>,
}
