//! Training paths: programs and their scheduled days, with per-user progress.

mod tpaths_model;
mod tpaths_service;
mod tpaths_traits;

pub use tpaths_model::*;
pub use tpaths_service::*;
pub use tpaths_traits::*;
