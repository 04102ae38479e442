//! Sync domain models shared between the storage outbox and the processor.

use serde::{Deserialize, Serialize};

/// Canonical list of local tables whose writes are replayed to the backend.
pub const SYNCED_TABLES: [&str; 10] = [
    "workout_sessions",
    "set_logs",
    "workout_templates",
    "training_paths",
    "training_path_exercises",
    "training_path_progress",
    "gyms",
    "goals",
    "body_measurements",
    "user_achievements",
];

/// Entity names carried by outbox entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncEntity {
    WorkoutSession,
    SetLog,
    WorkoutTemplate,
    TrainingPath,
    TrainingPathExercise,
    TrainingPathProgress,
    Gym,
    Goal,
    BodyMeasurement,
    UserAchievement,
}

/// Supported mutation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
}

/// Table targeted by an entity's mutations on the remote side.
pub fn entity_table_name(entity: &SyncEntity) -> &'static str {
    match entity {
        SyncEntity::WorkoutSession => "workout_sessions",
        SyncEntity::SetLog => "set_logs",
        SyncEntity::WorkoutTemplate => "workout_templates",
        SyncEntity::TrainingPath => "training_paths",
        SyncEntity::TrainingPathExercise => "training_path_exercises",
        SyncEntity::TrainingPathProgress => "training_path_progress",
        SyncEntity::Gym => "gyms",
        SyncEntity::Goal => "goals",
        SyncEntity::BodyMeasurement => "body_measurements",
        SyncEntity::UserAchievement => "user_achievements",
    }
}

/// A pending mutation in enqueue order. `id` is the queue-local sequence;
/// the payload JSON always carries the target row's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEntry {
    pub id: i64,
    pub entity: SyncEntity,
    pub entity_id: String,
    pub op: SyncOperation,
    pub payload: String,
    pub created_at: String,
    pub attempts: i32,
    pub last_error: Option<String>,
}

/// Outbox append request issued by the façade alongside a local write.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOutboxEntry {
    pub entity: SyncEntity,
    pub entity_id: String,
    pub op: SyncOperation,
    pub payload: serde_json::Value,
}

impl NewOutboxEntry {
    pub fn new(
        entity: SyncEntity,
        entity_id: impl Into<String>,
        op: SyncOperation,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            entity,
            entity_id: entity_id.into(),
            op,
            payload,
        }
    }
}

/// Single-row engine bookkeeping persisted by the outbox repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEngineState {
    pub last_drain_at: Option<String>,
    pub consecutive_failures: i32,
    pub last_error: Option<String>,
    pub last_drain_status: Option<String>,
}

/// Snapshot of processor state served to the UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub is_syncing: bool,
    pub is_online: bool,
    pub queue_length: i64,
    pub consecutive_failures: i32,
    pub last_error: Option<String>,
    /// Entries whose attempt count crossed the surfacing threshold. They are
    /// never dropped; this only lets the UI show stuck work.
    pub stuck_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_entity_serialization_matches_backend_contract() {
        let actual = [
            SyncEntity::WorkoutSession,
            SyncEntity::SetLog,
            SyncEntity::WorkoutTemplate,
            SyncEntity::TrainingPath,
            SyncEntity::TrainingPathExercise,
            SyncEntity::TrainingPathProgress,
            SyncEntity::Gym,
            SyncEntity::Goal,
            SyncEntity::BodyMeasurement,
            SyncEntity::UserAchievement,
        ]
        .iter()
        .map(|entity| serde_json::to_string(entity).expect("serialize sync entity"))
        .collect::<Vec<_>>();

        let expected = vec![
            "\"workout_session\"",
            "\"set_log\"",
            "\"workout_template\"",
            "\"training_path\"",
            "\"training_path_exercise\"",
            "\"training_path_progress\"",
            "\"gym\"",
            "\"goal\"",
            "\"body_measurement\"",
            "\"user_achievement\"",
        ];

        assert_eq!(actual, expected);
    }

    #[test]
    fn every_entity_maps_to_a_synced_table() {
        for entity in [
            SyncEntity::WorkoutSession,
            SyncEntity::SetLog,
            SyncEntity::WorkoutTemplate,
            SyncEntity::TrainingPath,
            SyncEntity::TrainingPathExercise,
            SyncEntity::TrainingPathProgress,
            SyncEntity::Gym,
            SyncEntity::Goal,
            SyncEntity::BodyMeasurement,
            SyncEntity::UserAchievement,
        ] {
            assert!(SYNCED_TABLES.contains(&entity_table_name(&entity)));
        }
    }
}
