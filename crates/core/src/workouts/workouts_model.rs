use serde::{Deserialize, Serialize};

/// A logged workout. `completed_at` stays `None` while the session is still
/// in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkoutSession {
    pub id: Option<String>,
    pub user_id: String,
    pub session_date: String,
    pub template_name: Option<String>,
    pub tpath_id: Option<String>,
}

/// Sparse update applied when a session is completed or re-rated. Only the
/// supplied fields change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSessionUpdate {
    pub completed_at: Option<String>,
    pub rating: Option<i32>,
    pub duration_seconds: Option<i32>,
    pub template_name: Option<String>,
}

impl WorkoutSessionUpdate {
    pub fn is_empty(&self) -> bool {
        self.completed_at.is_none()
            && self.rating.is_none()
            && self.duration_seconds.is_none()
            && self.template_name.is_none()
    }
}

/// One logged set. Bilateral sets use `reps`, unilateral sets use
/// `reps_left`/`reps_right`, timed holds use `duration_seconds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLog {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSetLog {
    pub id: Option<String>,
    pub session_id: String,
    pub exercise_id: String,
    pub weight: Option<f64>,
    pub reps: Option<i32>,
    pub reps_left: Option<i32>,
    pub reps_right: Option<i32>,
    pub duration_seconds: Option<i32>,
    pub is_pb: bool,
}

/// Tonnage of one set. Timed holds contribute nothing.
pub fn set_volume(weight: Option<f64>, reps: Option<i32>, reps_left: Option<i32>, reps_right: Option<i32>) -> f64 {
    let total_reps = reps.unwrap_or(0) + reps_left.unwrap_or(0) + reps_right.unwrap_or(0);
    weight.unwrap_or(0.0) * f64::from(total_reps)
}

impl SetLog {
    pub fn volume(&self) -> f64 {
        set_volume(self.weight, self.reps, self.reps_left, self.reps_right)
    }
}

/// One set joined with its session's completion timestamp, as consumed by
/// the volume/frequency aggregations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetVolumeRow {
    pub completed_at: String,
    pub exercise_id: String,
    pub weight: Option<f64>,
    pub reps: Option<i32>,
    pub reps_left: Option<i32>,
    pub reps_right: Option<i32>,
}

impl SetVolumeRow {
    pub fn volume(&self) -> f64 {
        set_volume(self.weight, self.reps, self.reps_left, self.reps_right)
    }
}
