use std::sync::Arc;

use async_trait::async_trait;

use super::{BodyMeasurement, MeasurementRepositoryTrait, NewBodyMeasurement};
use crate::errors::{Error, Result};

#[async_trait]
pub trait MeasurementServiceTrait: Send + Sync {
    fn get_measurements(&self, user_id: &str) -> Result<Vec<BodyMeasurement>>;
    async fn save_measurement(&self, measurement: NewBodyMeasurement) -> Result<BodyMeasurement>;
    async fn delete_measurement(&self, measurement_id: String) -> Result<usize>;
}

pub struct MeasurementService {
    repository: Arc<dyn MeasurementRepositoryTrait>,
}

impl MeasurementService {
    pub fn new(repository: Arc<dyn MeasurementRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl MeasurementServiceTrait for MeasurementService {
    fn get_measurements(&self, user_id: &str) -> Result<Vec<BodyMeasurement>> {
        self.repository.get_measurements(user_id)
    }

    async fn save_measurement(&self, measurement: NewBodyMeasurement) -> Result<BodyMeasurement> {
        if measurement.measured_at.trim().is_empty() {
            return Err(Error::validation("Measurement requires a timestamp"));
        }
        self.repository.upsert_measurement(measurement).await
    }

    async fn delete_measurement(&self, measurement_id: String) -> Result<usize> {
        self.repository.delete_measurement(measurement_id).await
    }
}
