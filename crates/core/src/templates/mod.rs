//! User-owned workout templates.

mod templates_model;
mod templates_service;
mod templates_traits;

pub use templates_model::*;
pub use templates_service::*;
pub use templates_traits::*;
