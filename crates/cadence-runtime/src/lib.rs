//! Cadence Runtime - Frame driving infrastructure
//!
//! Provides the pieces a host loop needs around the scheduler:
//! - `GameClock` — fixed-timestep accumulator that yields the per-frame substep count
//! - `SchedulerConfig` / `FailurePolicy` — TOML-backed scheduler settings

mod clock;
mod config;

pub use clock::GameClock;
pub use config::{FailurePolicy, SchedulerConfig};
