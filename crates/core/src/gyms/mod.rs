//! User gyms and their equipment sets.

mod gyms_model;
mod gyms_service;
mod gyms_traits;

pub use gyms_model::*;
pub use gyms_service::*;
pub use gyms_traits::*;
