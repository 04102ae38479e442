use serde::{Deserialize, Serialize};

/// A named, ordered list of exercises. The exercise list is stored as a JSON
/// column; only the storage layer sees the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplate {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub exercises: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkoutTemplate {
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub exercises: Vec<String>,
}

/// Sparse template update: rename and/or replace the exercise list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplateUpdate {
    pub name: Option<String>,
    pub exercises: Option<Vec<String>>,
}

impl WorkoutTemplateUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.exercises.is_none()
    }
}
