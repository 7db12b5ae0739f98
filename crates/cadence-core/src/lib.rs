//! Cadence Core - Foundational types for the Cadence scheduler
//!
//! This crate provides the core types that all other Cadence crates depend on:
//! - `ComponentId`, `GroupId` - Stable handles for scheduled components and their owning objects
//! - `Phase` - The ordered steps of one frame
//! - Error types and Result alias

mod error;
mod id;
mod phase;

pub use error::{CadenceError, Result};
pub use id::{ComponentId, GroupId, IdAllocator};
pub use phase::Phase;
