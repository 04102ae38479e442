//! Body measurement journal entries.

mod measurements_model;
mod measurements_service;
mod measurements_traits;

pub use measurements_model::*;
pub use measurements_service::*;
pub use measurements_traits::*;
