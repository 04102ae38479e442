//! Wires the SQLite repositories into the core service registry.

use std::sync::Arc;

use liftlog_core::achievements::{default_rules, AchievementRule, AchievementService};
use liftlog_core::analytics::AnalyticsService;
use liftlog_core::clock::Clock;
use liftlog_core::context::ServiceContext;
use liftlog_core::goals::GoalService;
use liftlog_core::gyms::GymService;
use liftlog_core::measurements::MeasurementService;
use liftlog_core::sync::{
    ConnectivityMonitor, SyncBackendClient, SyncProcessor, SyncProcessorOptions,
};
use liftlog_core::templates::TemplateService;
use liftlog_core::tpaths::TrainingPathService;
use liftlog_core::workouts::WorkoutService;

use crate::db::{DbPool, WriteHandle};
use crate::{
    AchievementRepository, GoalRepository, GymRepository, MeasurementRepository, OutboxRepository,
    TemplateRepository, TrainingPathRepository, WorkoutRepository,
};

/// Builds the façade the UI layer talks to. Everything is injected: the
/// backend client, the clock, the connectivity monitor and optionally a
/// custom achievement rule table.
pub fn build_service_context(
    pool: Arc<DbPool>,
    writer: WriteHandle,
    backend: Arc<dyn SyncBackendClient>,
    clock: Arc<dyn Clock>,
    connectivity: Arc<ConnectivityMonitor>,
    sync_options: SyncProcessorOptions,
    rules: Option<Vec<AchievementRule>>,
) -> ServiceContext {
    let workout_repo = Arc::new(WorkoutRepository::new(pool.clone(), writer.clone()));
    let analytics = Arc::new(AnalyticsService::new(workout_repo.clone(), clock.clone()));
    let achievement_repo = Arc::new(AchievementRepository::new(pool.clone(), writer.clone()));
    let outbox = Arc::new(OutboxRepository::new(pool.clone(), writer.clone()));
    let sync_processor = Arc::new(SyncProcessor::new(
        outbox.clone(),
        backend,
        &connectivity,
        sync_options,
    ));

    ServiceContext {
        workout_service: Arc::new(WorkoutService::new(workout_repo, clock.clone())),
        template_service: Arc::new(TemplateService::new(Arc::new(TemplateRepository::new(
            pool.clone(),
            writer.clone(),
        )))),
        tpath_service: Arc::new(TrainingPathService::new(
            Arc::new(TrainingPathRepository::new(pool.clone(), writer.clone())),
            clock.clone(),
        )),
        gym_service: Arc::new(GymService::new(Arc::new(GymRepository::new(
            pool.clone(),
            writer.clone(),
        )))),
        goal_service: Arc::new(GoalService::new(Arc::new(GoalRepository::new(
            pool.clone(),
            writer.clone(),
        )))),
        measurement_service: Arc::new(MeasurementService::new(Arc::new(
            MeasurementRepository::new(pool, writer),
        ))),
        achievement_service: Arc::new(AchievementService::new(
            achievement_repo,
            analytics.clone(),
            clock,
            rules.unwrap_or_else(default_rules),
        )),
        analytics_service: analytics,
        outbox_repository: outbox,
        connectivity,
        sync_processor,
    }
}
