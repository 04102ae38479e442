use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    TotalWorkouts,
    CurrentStreak,
    TotalVolume,
    PrWeight,
}

/// One achievement definition. `exercise_id` is only meaningful for
/// `PrWeight` rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementRule {
    pub id: String,
    pub title: String,
    pub kind: RequirementKind,
    pub threshold: f64,
    pub exercise_id: Option<String>,
}

impl AchievementRule {
    fn new(id: &str, title: &str, kind: RequirementKind, threshold: f64) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            kind,
            threshold,
            exercise_id: None,
        }
    }

    fn for_exercise(mut self, exercise_id: &str) -> Self {
        self.exercise_id = Some(exercise_id.to_string());
        self
    }
}

/// Built-in rule table. Apps can extend or replace it at service
/// construction.
pub fn default_rules() -> Vec<AchievementRule> {
    vec![
        AchievementRule::new("first-workout", "First Workout", RequirementKind::TotalWorkouts, 1.0),
        AchievementRule::new("ten-workouts", "Ten Workouts", RequirementKind::TotalWorkouts, 10.0),
        AchievementRule::new("hundred-workouts", "Century Club", RequirementKind::TotalWorkouts, 100.0),
        AchievementRule::new("week-streak", "Seven Day Streak", RequirementKind::CurrentStreak, 7.0),
        AchievementRule::new("month-streak", "Thirty Day Streak", RequirementKind::CurrentStreak, 30.0),
        AchievementRule::new("volume-10k", "10,000 kg Moved", RequirementKind::TotalVolume, 10_000.0),
        AchievementRule::new("volume-100k", "100,000 kg Moved", RequirementKind::TotalVolume, 100_000.0),
        AchievementRule::new("bench-100", "Triple Digit Bench", RequirementKind::PrWeight, 100.0)
            .for_exercise("bench-press"),
    ]
}

/// An unlocked achievement row. At most one per (user, achievement).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAchievement {
    pub id: String,
    pub user_id: String,
    pub achievement_id: String,
    pub unlocked_at: String,
    pub progress_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserAchievement {
    pub id: Option<String>,
    pub user_id: String,
    pub achievement_id: String,
    pub unlocked_at: String,
    pub progress_value: f64,
}

/// Aggregates the evaluator compares against rule thresholds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AchievementInputs {
    pub total_workouts: i64,
    pub current_streak: u32,
    pub total_volume: f64,
    pub pr_weights: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingUnlock {
    pub rule_id: String,
    pub progress_value: f64,
}

/// Progress value of one rule. Missing data reads as zero progress.
pub fn rule_progress(rule: &AchievementRule, inputs: &AchievementInputs) -> f64 {
    match rule.kind {
        RequirementKind::TotalWorkouts => inputs.total_workouts as f64,
        RequirementKind::CurrentStreak => f64::from(inputs.current_streak),
        RequirementKind::TotalVolume => inputs.total_volume,
        RequirementKind::PrWeight => rule
            .exercise_id
            .as_deref()
            .and_then(|exercise_id| inputs.pr_weights.get(exercise_id))
            .copied()
            .unwrap_or(0.0),
    }
}

/// Rules whose threshold is now met and which are not yet unlocked.
pub fn evaluate_rules(
    rules: &[AchievementRule],
    inputs: &AchievementInputs,
    unlocked: &HashSet<String>,
) -> Vec<PendingUnlock> {
    rules
        .iter()
        .filter(|rule| !unlocked.contains(&rule.id))
        .filter_map(|rule| {
            let progress = rule_progress(rule, inputs);
            (progress >= rule.threshold).then(|| PendingUnlock {
                rule_id: rule.id.clone(),
                progress_value: progress,
            })
        })
        .collect()
}
