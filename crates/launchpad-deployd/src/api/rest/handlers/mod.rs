//! API handlers

mod deployments;
mod health;

pub use deployments::*;
pub use health::*;
