//! Diagnostic rules engine
//!
//! Pure functions from snapshots to ordered findings. All thresholds come
//! from [`Config`](crate::config::Config).

mod hardware;
mod performance;

pub use hardware::{compatibility_notes, minimum_for, recommend_hardware, UseCaseMinimum};
pub use performance::diagnose_performance;
