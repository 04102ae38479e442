//! Workout sessions and their set logs.

mod workouts_model;
mod workouts_service;
mod workouts_traits;

pub use workouts_model::*;
pub use workouts_service::*;
pub use workouts_traits::*;
