use async_trait::async_trait;

use super::{BodyMeasurement, NewBodyMeasurement};
use crate::errors::Result;

#[async_trait]
pub trait MeasurementRepositoryTrait: Send + Sync {
    /// Measurements for a user, newest first.
    fn get_measurements(&self, user_id: &str) -> Result<Vec<BodyMeasurement>>;

    async fn upsert_measurement(&self, measurement: NewBodyMeasurement)
        -> Result<BodyMeasurement>;

    async fn delete_measurement(&self, measurement_id: String) -> Result<usize>;
}
