//! Derived analytics computed purely from locally stored history.

mod analytics_model;
mod analytics_service;
pub mod streaks;

pub use analytics_model::*;
pub use analytics_service::*;
