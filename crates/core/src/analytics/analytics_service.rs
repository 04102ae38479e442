use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{Duration, NaiveDate};

use super::streaks::{self, STREAK_LOOKBACK_DAYS};
use super::{FrequencyPoint, PrPoint, VolumePoint, WorkoutStats};
use crate::clock::Clock;
use crate::errors::Result;
use crate::workouts::WorkoutRepositoryTrait;

/// Window applied by callers that do not pass one explicitly.
pub const DEFAULT_STATS_WINDOW_DAYS: u32 = 30;

const EPOCH_RFC3339: &str = "1970-01-01T00:00:00+00:00";

pub trait AnalyticsServiceTrait: Send + Sync {
    /// Aggregate stats for a user. `days == None` means all time, which is
    /// what achievement evaluation feeds on.
    fn get_workout_stats(&self, user_id: &str, days: Option<u32>) -> Result<WorkoutStats>;

    /// History queries fall back to the default 30-day window when no
    /// explicit one is given.
    fn get_volume_history(&self, user_id: &str, days: Option<u32>) -> Result<Vec<VolumePoint>>;

    fn get_workout_frequency(&self, user_id: &str, days: Option<u32>)
        -> Result<Vec<FrequencyPoint>>;

    fn get_pr_history(
        &self,
        user_id: &str,
        exercise_id: &str,
        days: Option<u32>,
    ) -> Result<Vec<PrPoint>>;

    fn max_weight(&self, user_id: &str, exercise_id: &str) -> Result<Option<f64>>;
}

pub struct AnalyticsService {
    workouts: Arc<dyn WorkoutRepositoryTrait>,
    clock: Arc<dyn Clock>,
}

impl AnalyticsService {
    pub fn new(workouts: Arc<dyn WorkoutRepositoryTrait>, clock: Arc<dyn Clock>) -> Self {
        Self { workouts, clock }
    }

    fn window_start(&self, days: Option<u32>) -> String {
        match days {
            Some(days) => (self.clock.now_utc() - Duration::days(i64::from(days))).to_rfc3339(),
            None => EPOCH_RFC3339.to_string(),
        }
    }

    /// Distinct local calendar days with a completed workout inside the
    /// streak lookback window.
    fn workout_days(&self, user_id: &str) -> Result<BTreeSet<NaiveDate>> {
        let since =
            (self.clock.now_utc() - Duration::days(i64::from(STREAK_LOOKBACK_DAYS))).to_rfc3339();
        let offset = self.clock.local_offset();
        Ok(self
            .workouts
            .completed_session_timestamps(user_id, &since)?
            .iter()
            .filter_map(|timestamp| streaks::local_day(timestamp, offset))
            .collect())
    }
}

impl AnalyticsServiceTrait for AnalyticsService {
    fn get_workout_stats(&self, user_id: &str, days: Option<u32>) -> Result<WorkoutStats> {
        let since = self.window_start(days);
        let completed = self
            .workouts
            .completed_session_timestamps(user_id, &since)?;
        let total_volume = self
            .workouts
            .volume_rows_since(user_id, &since)?
            .iter()
            .map(|row| row.volume())
            .sum();

        let workout_days = self.workout_days(user_id)?;
        let current = streaks::current_streak(&workout_days, self.clock.today());

        Ok(WorkoutStats {
            total_workouts: completed.len() as i64,
            total_volume,
            current_streak: current.length,
            streak_started_on: current.started_on.map(|date| date.to_string()),
            longest_streak: streaks::longest_streak(&workout_days),
        })
    }

    fn get_volume_history(&self, user_id: &str, days: Option<u32>) -> Result<Vec<VolumePoint>> {
        let since = self.window_start(Some(days.unwrap_or(DEFAULT_STATS_WINDOW_DAYS)));
        let offset = self.clock.local_offset();
        let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for row in self.workouts.volume_rows_since(user_id, &since)? {
            if let Some(day) = streaks::local_day(&row.completed_at, offset) {
                *per_day.entry(day).or_default() += row.volume();
            }
        }
        Ok(per_day
            .into_iter()
            .map(|(date, volume)| VolumePoint {
                date: date.to_string(),
                volume,
            })
            .collect())
    }

    fn get_workout_frequency(
        &self,
        user_id: &str,
        days: Option<u32>,
    ) -> Result<Vec<FrequencyPoint>> {
        let since = self.window_start(Some(days.unwrap_or(DEFAULT_STATS_WINDOW_DAYS)));
        let offset = self.clock.local_offset();
        let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        for timestamp in self.workouts.completed_session_timestamps(user_id, &since)? {
            if let Some(day) = streaks::local_day(&timestamp, offset) {
                *per_day.entry(day).or_default() += 1;
            }
        }
        Ok(per_day
            .into_iter()
            .map(|(date, sessions)| FrequencyPoint {
                date: date.to_string(),
                sessions,
            })
            .collect())
    }

    fn get_pr_history(
        &self,
        user_id: &str,
        exercise_id: &str,
        days: Option<u32>,
    ) -> Result<Vec<PrPoint>> {
        let since = self.window_start(Some(days.unwrap_or(DEFAULT_STATS_WINDOW_DAYS)));
        let offset = self.clock.local_offset();
        let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for row in self.workouts.volume_rows_since(user_id, &since)? {
            if row.exercise_id != exercise_id {
                continue;
            }
            let Some(weight) = row.weight else { continue };
            if let Some(day) = streaks::local_day(&row.completed_at, offset) {
                let entry = per_day.entry(day).or_default();
                if weight > *entry {
                    *entry = weight;
                }
            }
        }
        Ok(per_day
            .into_iter()
            .map(|(date, weight)| PrPoint {
                date: date.to_string(),
                weight,
            })
            .collect())
    }

    fn max_weight(&self, user_id: &str, exercise_id: &str) -> Result<Option<f64>> {
        self.workouts.max_weight_for_exercise(user_id, exercise_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::workouts::{
        NewSetLog, NewWorkoutSession, SetLog, SetVolumeRow, WorkoutSession, WorkoutSessionUpdate,
    };
    use async_trait::async_trait;
    use chrono::{FixedOffset, TimeZone, Utc};

    struct StubWorkouts {
        completed: Vec<String>,
        volume_rows: Vec<SetVolumeRow>,
    }

    #[async_trait]
    impl WorkoutRepositoryTrait for StubWorkouts {
        fn get_sessions(&self, _user_id: &str) -> Result<Vec<WorkoutSession>> {
            Ok(Vec::new())
        }
        fn get_session(&self, _session_id: &str) -> Result<Option<WorkoutSession>> {
            Ok(None)
        }
        async fn upsert_session(&self, _session: NewWorkoutSession) -> Result<WorkoutSession> {
            unimplemented!("not exercised")
        }
        async fn update_session(
            &self,
            _session_id: String,
            _update: WorkoutSessionUpdate,
        ) -> Result<WorkoutSession> {
            unimplemented!("not exercised")
        }
        async fn delete_session(&self, _session_id: String) -> Result<usize> {
            Ok(0)
        }
        fn get_set_logs(&self, _session_id: &str) -> Result<Vec<SetLog>> {
            Ok(Vec::new())
        }
        async fn add_set_log(&self, _set_log: NewSetLog) -> Result<SetLog> {
            unimplemented!("not exercised")
        }
        fn completed_session_timestamps(
            &self,
            _user_id: &str,
            _since: &str,
        ) -> Result<Vec<String>> {
            Ok(self.completed.clone())
        }
        fn volume_rows_since(&self, _user_id: &str, _since: &str) -> Result<Vec<SetVolumeRow>> {
            Ok(self.volume_rows.clone())
        }
        fn max_weight_for_exercise(
            &self,
            _user_id: &str,
            _exercise_id: &str,
        ) -> Result<Option<f64>> {
            Ok(None)
        }
    }

    fn service(completed: Vec<String>, volume_rows: Vec<SetVolumeRow>) -> AnalyticsService {
        let clock = FixedClock::new(
            Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap(),
            FixedOffset::east_opt(0).unwrap(),
        );
        AnalyticsService::new(
            Arc::new(StubWorkouts {
                completed,
                volume_rows,
            }),
            Arc::new(clock),
        )
    }

    fn row(completed_at: &str, exercise_id: &str, weight: f64, reps: i32) -> SetVolumeRow {
        SetVolumeRow {
            completed_at: completed_at.to_string(),
            exercise_id: exercise_id.to_string(),
            weight: Some(weight),
            reps: Some(reps),
            reps_left: None,
            reps_right: None,
        }
    }

    #[test]
    fn stats_combine_volume_and_streak() {
        let svc = service(
            vec![
                "2026-08-05T09:00:00+00:00".to_string(),
                "2026-08-04T09:00:00+00:00".to_string(),
                "2026-08-03T09:00:00+00:00".to_string(),
            ],
            vec![
                row("2026-08-05T09:00:00+00:00", "squat", 100.0, 5),
                row("2026-08-04T09:00:00+00:00", "squat", 90.0, 5),
            ],
        );
        let stats = svc.get_workout_stats("u1", Some(30)).unwrap();
        assert_eq!(stats.total_workouts, 3);
        assert_eq!(stats.total_volume, 950.0);
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.streak_started_on.as_deref(), Some("2026-08-03"));
    }

    #[test]
    fn volume_history_groups_by_local_day() {
        let svc = service(
            Vec::new(),
            vec![
                row("2026-08-05T09:00:00+00:00", "squat", 100.0, 5),
                row("2026-08-05T18:00:00+00:00", "bench", 60.0, 10),
                row("2026-08-04T09:00:00+00:00", "squat", 80.0, 5),
            ],
        );
        let history = svc.get_volume_history("u1", Some(30)).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date, "2026-08-04");
        assert_eq!(history[0].volume, 400.0);
        assert_eq!(history[1].volume, 1100.0);
    }

    #[test]
    fn malformed_rows_degrade_to_zero_not_error() {
        let svc = service(
            vec!["garbage".to_string()],
            vec![row("also-garbage", "squat", 100.0, 5)],
        );
        let stats = svc.get_workout_stats("u1", None).unwrap();
        assert_eq!(stats.current_streak, 0);
        assert!(svc.get_volume_history("u1", None).unwrap().is_empty());
    }

    #[test]
    fn pr_history_tracks_per_day_max() {
        let svc = service(
            Vec::new(),
            vec![
                row("2026-08-05T09:00:00+00:00", "bench", 60.0, 5),
                row("2026-08-05T10:00:00+00:00", "bench", 65.0, 3),
                row("2026-08-05T10:30:00+00:00", "squat", 120.0, 3),
            ],
        );
        let history = svc.get_pr_history("u1", "bench", Some(30)).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].weight, 65.0);
    }
}
