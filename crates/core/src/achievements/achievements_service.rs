use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::{
    evaluate_rules, AchievementInputs, AchievementRepositoryTrait, AchievementRule,
    NewUserAchievement, RequirementKind, UserAchievement,
};
use crate::analytics::AnalyticsServiceTrait;
use crate::clock::Clock;
use crate::errors::Result;

#[async_trait]
pub trait AchievementServiceTrait: Send + Sync {
    fn get_achievements(&self, user_id: &str) -> Result<Vec<UserAchievement>>;

    fn rules(&self) -> &[AchievementRule];

    /// Re-evaluates every locked rule against current stats and persists any
    /// new unlocks. Safe to run repeatedly.
    async fn evaluate(&self, user_id: &str) -> Result<Vec<UserAchievement>>;
}

pub struct AchievementService {
    repository: Arc<dyn AchievementRepositoryTrait>,
    analytics: Arc<dyn AnalyticsServiceTrait>,
    clock: Arc<dyn Clock>,
    rules: Vec<AchievementRule>,
}

impl AchievementService {
    pub fn new(
        repository: Arc<dyn AchievementRepositoryTrait>,
        analytics: Arc<dyn AnalyticsServiceTrait>,
        clock: Arc<dyn Clock>,
        rules: Vec<AchievementRule>,
    ) -> Self {
        Self {
            repository,
            analytics,
            clock,
            rules,
        }
    }
}

#[async_trait]
impl AchievementServiceTrait for AchievementService {
    fn get_achievements(&self, user_id: &str) -> Result<Vec<UserAchievement>> {
        self.repository.get_achievements(user_id)
    }

    fn rules(&self) -> &[AchievementRule] {
        &self.rules
    }

    async fn evaluate(&self, user_id: &str) -> Result<Vec<UserAchievement>> {
        let unlocked: HashSet<String> = self
            .repository
            .get_achievements(user_id)?
            .into_iter()
            .map(|achievement| achievement.achievement_id)
            .collect();

        let stats = self.analytics.get_workout_stats(user_id, None)?;
        let mut pr_weights: HashMap<String, f64> = HashMap::new();
        for rule in &self.rules {
            if rule.kind != RequirementKind::PrWeight || unlocked.contains(&rule.id) {
                continue;
            }
            if let Some(exercise_id) = rule.exercise_id.as_deref() {
                let weight = self
                    .analytics
                    .max_weight(user_id, exercise_id)?
                    .unwrap_or(0.0);
                pr_weights.insert(exercise_id.to_string(), weight);
            }
        }

        let inputs = AchievementInputs {
            total_workouts: stats.total_workouts,
            current_streak: stats.current_streak,
            total_volume: stats.total_volume,
            pr_weights,
        };

        let mut newly_unlocked = Vec::new();
        for pending in evaluate_rules(&self.rules, &inputs, &unlocked) {
            debug!(
                "Unlocking achievement '{}' for user {} at progress {}",
                pending.rule_id, user_id, pending.progress_value
            );
            let row = self
                .repository
                .unlock(NewUserAchievement {
                    id: None,
                    user_id: user_id.to_string(),
                    achievement_id: pending.rule_id,
                    unlocked_at: self.clock.now_utc().to_rfc3339(),
                    progress_value: pending.progress_value,
                })
                .await?;
            newly_unlocked.push(row);
        }
        Ok(newly_unlocked)
    }
}
