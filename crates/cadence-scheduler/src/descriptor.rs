//! Component descriptors — the scheduler-visible shape of one component

use crate::behaviour::Callback;
use cadence_core::{ComponentId, GroupId, Phase};

/// Which lifecycle callbacks a component defines.
///
/// Read once from [`Behaviour::capabilities`](crate::Behaviour::capabilities) when the
/// component is instantiated and fixed from then on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub awake: bool,
    pub on_enable: bool,
    pub start: bool,
    pub fixed_update: bool,
    pub update: bool,
    pub late_update: bool,
}

impl Capabilities {
    /// No callbacks at all
    pub const NONE: Capabilities = Capabilities {
        awake: false,
        on_enable: false,
        start: false,
        fixed_update: false,
        update: false,
        late_update: false,
    };

    /// Every callback
    pub const ALL: Capabilities = Capabilities {
        awake: true,
        on_enable: true,
        start: true,
        fixed_update: true,
        update: true,
        late_update: true,
    };

    /// Awake, OnEnable and Start; the usual base for a scripted component
    pub fn lifecycle() -> Self {
        Self {
            awake: true,
            on_enable: true,
            start: true,
            ..Self::NONE
        }
    }

    pub fn with_awake(mut self) -> Self {
        self.awake = true;
        self
    }

    pub fn with_on_enable(mut self) -> Self {
        self.on_enable = true;
        self
    }

    pub fn with_start(mut self) -> Self {
        self.start = true;
        self
    }

    pub fn with_fixed_update(mut self) -> Self {
        self.fixed_update = true;
        self
    }

    pub fn with_update(mut self) -> Self {
        self.update = true;
        self
    }

    pub fn with_late_update(mut self) -> Self {
        self.late_update = true;
        self
    }

    /// Whether the component defines `callback`
    pub fn handles(&self, callback: Callback) -> bool {
        match callback {
            Callback::Awake => self.awake,
            Callback::OnEnable => self.on_enable,
            Callback::Start => self.start,
            Callback::FixedUpdate => self.fixed_update,
            Callback::Update => self.update,
            Callback::LateUpdate => self.late_update,
        }
    }
}

/// Snapshot of a component's scheduling state.
///
/// The registry owns the authoritative copy; [`Context::get`](crate::Context::get) and
/// [`Scheduler::get`](crate::Scheduler::get) hand out clones.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDescriptor {
    pub id: ComponentId,
    pub name: String,
    /// Execution order, lower runs first
    pub priority: i32,
    pub capabilities: Capabilities,
    /// True once Start ran, or from creation if the component has no Start
    pub started: bool,
    pub enabled: bool,
    /// Owning object; components of one group are destroyed together
    pub group: GroupId,
    pub created_frame: u64,
    /// `None` when created by the host outside a frame
    pub created_phase: Option<Phase>,
}

impl ComponentDescriptor {
    /// Visit order: ascending priority, ties by creation order.
    ///
    /// Ids are allocated monotonically, so the id doubles as the creation sequence.
    pub fn order_key(&self) -> (i32, ComponentId) {
        (self.priority, self.id)
    }

    /// Whether the next StartFlush should call Start on this component
    pub fn awaiting_start(&self) -> bool {
        self.enabled && !self.started && self.capabilities.start
    }
}
