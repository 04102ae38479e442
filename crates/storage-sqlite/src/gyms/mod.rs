mod model;
mod repository;

pub use model::GymDB;
pub use repository::GymRepository;
