//! Stable component and group identifiers

use std::fmt;

/// A stable component identifier, unique for the lifetime of one scheduler.
///
/// Ids are never reused, so a handle to a destroyed component stays dangling
/// instead of silently aliasing a newer component.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ComponentId(pub u64);

impl ComponentId {
    /// Create a ComponentId from a raw value (for diagnostics/testing)
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies the owning object of a set of components that are destroyed together
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct GroupId(pub u64);

impl GroupId {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId({})", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic id source owned by a single scheduler.
///
/// Per-instance counters keep two schedulers fed the same inputs producing
/// identical ids, which global counters would not.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next_component: u64,
    next_group: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next_component: 1,
            next_group: 1,
        }
    }

    /// Allocate the next component id
    pub fn component(&mut self) -> ComponentId {
        let id = ComponentId(self.next_component);
        self.next_component += 1;
        id
    }

    /// Allocate the next group id
    pub fn group(&mut self) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        id
    }
}
