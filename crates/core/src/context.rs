//! Service registry handed to the UI layer. All handles are injected at
//! construction; the core keeps no ambient globals.

use std::sync::Arc;

use crate::achievements::AchievementServiceTrait;
use crate::analytics::AnalyticsServiceTrait;
use crate::errors::Result;
use crate::goals::GoalServiceTrait;
use crate::gyms::GymServiceTrait;
use crate::measurements::MeasurementServiceTrait;
use crate::sync::{ConnectivityMonitor, OutboxRepositoryTrait, SyncProcessor, SyncStatus};
use crate::templates::TemplateServiceTrait;
use crate::tpaths::TrainingPathServiceTrait;
use crate::workouts::WorkoutServiceTrait;

pub struct ServiceContext {
    pub workout_service: Arc<dyn WorkoutServiceTrait>,
    pub template_service: Arc<dyn TemplateServiceTrait>,
    pub tpath_service: Arc<dyn TrainingPathServiceTrait>,
    pub gym_service: Arc<dyn GymServiceTrait>,
    pub goal_service: Arc<dyn GoalServiceTrait>,
    pub measurement_service: Arc<dyn MeasurementServiceTrait>,
    pub achievement_service: Arc<dyn AchievementServiceTrait>,
    pub analytics_service: Arc<dyn AnalyticsServiceTrait>,
    pub outbox_repository: Arc<dyn OutboxRepositoryTrait>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub sync_processor: Arc<SyncProcessor>,
}

impl ServiceContext {
    pub fn workout_service(&self) -> Arc<dyn WorkoutServiceTrait> {
        Arc::clone(&self.workout_service)
    }

    pub fn template_service(&self) -> Arc<dyn TemplateServiceTrait> {
        Arc::clone(&self.template_service)
    }

    pub fn tpath_service(&self) -> Arc<dyn TrainingPathServiceTrait> {
        Arc::clone(&self.tpath_service)
    }

    pub fn gym_service(&self) -> Arc<dyn GymServiceTrait> {
        Arc::clone(&self.gym_service)
    }

    pub fn goal_service(&self) -> Arc<dyn GoalServiceTrait> {
        Arc::clone(&self.goal_service)
    }

    pub fn measurement_service(&self) -> Arc<dyn MeasurementServiceTrait> {
        Arc::clone(&self.measurement_service)
    }

    pub fn achievement_service(&self) -> Arc<dyn AchievementServiceTrait> {
        Arc::clone(&self.achievement_service)
    }

    pub fn analytics_service(&self) -> Arc<dyn AnalyticsServiceTrait> {
        Arc::clone(&self.analytics_service)
    }

    pub fn outbox_repository(&self) -> Arc<dyn OutboxRepositoryTrait> {
        Arc::clone(&self.outbox_repository)
    }

    pub fn connectivity(&self) -> Arc<ConnectivityMonitor> {
        Arc::clone(&self.connectivity)
    }

    pub fn sync_processor(&self) -> Arc<SyncProcessor> {
        Arc::clone(&self.sync_processor)
    }

    /// Status badge fields for the UI ("N items pending / syncing").
    pub fn sync_status(&self) -> Result<SyncStatus> {
        self.sync_processor.status()
    }
}
