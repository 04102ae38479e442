//! Gamified achievements: a declarative rule table evaluated against
//! locally derived stats.

mod achievements_model;
mod achievements_service;
mod achievements_traits;

pub use achievements_model::*;
pub use achievements_service::*;
pub use achievements_traits::*;
