//! Frame phases

use std::fmt;

/// One step of a frame, in execution order.
///
/// The three `Pre*Start` steps are StartFlush steps; the others are phase scans.
/// `FixedUpdate` repeats once per substep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    PreFixedStart,
    FixedUpdate,
    PreUpdateStart,
    Update,
    PreLateStart,
    LateUpdate,
}

impl Phase {
    /// All phases in frame order
    pub const ALL: [Phase; 6] = [
        Phase::PreFixedStart,
        Phase::FixedUpdate,
        Phase::PreUpdateStart,
        Phase::Update,
        Phase::PreLateStart,
        Phase::LateUpdate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Phase::PreFixedStart => "PreFixedStart",
            Phase::FixedUpdate => "FixedUpdate",
            Phase::PreUpdateStart => "PreUpdateStart",
            Phase::Update => "Update",
            Phase::PreLateStart => "PreLateStart",
            Phase::LateUpdate => "LateUpdate",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
