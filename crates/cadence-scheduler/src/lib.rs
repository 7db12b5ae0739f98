//! Cadence Scheduler - Phased lifecycle dispatch for components
//!
//! Provides the frame-based scheduler and the types components interact with:
//! - `Behaviour` — trait for components, with optional lifecycle callbacks
//! - `Capabilities` / `ComponentDescriptor` — which callbacks a component defines and its scheduling state
//! - `Template` / `ComponentSpec` / `Instance` — what `instantiate` consumes and returns
//! - `Context` — the scheduler surface handed to callbacks
//! - `ComponentRegistry` / `InstantiationQueue` — the live ordered set and the pending buffer
//! - `Scheduler` — the phase runner and host entry point
//! - `TraceLog` / `Probe` — opt-in callback traces for diagnostics and tests

mod behaviour;
mod context;
mod descriptor;
mod queue;
mod registry;
mod scheduler;
mod template;
mod trace;

pub use behaviour::{Behaviour, Callback};
pub use context::Context;
pub use descriptor::{Capabilities, ComponentDescriptor};
pub use queue::{InstantiationQueue, PendingInstantiation};
pub use registry::{ComponentRegistry, MergeStats};
pub use scheduler::{RunnerState, Scheduler, SimulationState};
pub use template::{ComponentSpec, Instance, Template};
pub use trace::{format_line, Probe, TraceLog};

pub use cadence_core::{CadenceError, ComponentId, GroupId, Phase, Result};
pub use cadence_runtime::{FailurePolicy, GameClock, SchedulerConfig};
