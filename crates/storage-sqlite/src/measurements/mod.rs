mod model;
mod repository;

pub use model::BodyMeasurementDB;
pub use repository::MeasurementRepository;
