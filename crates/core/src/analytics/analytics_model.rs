use serde::{Deserialize, Serialize};

/// Aggregate stats over a window of completed workouts. Streak fields always
/// look back over the full 365-day streak window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutStats {
    pub total_workouts: i64,
    pub total_volume: f64,
    pub current_streak: u32,
    pub streak_started_on: Option<String>,
    pub longest_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumePoint {
    pub date: String,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyPoint {
    pub date: String,
    pub sessions: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrPoint {
    pub date: String,
    pub weight: f64,
}
