//! Instantiation templates and the handles `instantiate` returns

use crate::behaviour::Behaviour;
use cadence_core::{ComponentId, GroupId};

/// One component of a template
pub struct ComponentSpec {
    pub(crate) name: String,
    pub(crate) priority: i32,
    pub(crate) enabled: bool,
    pub(crate) behaviour: Box<dyn Behaviour>,
}

impl ComponentSpec {
    /// An enabled component with priority 0
    pub fn new(name: impl Into<String>, behaviour: impl Behaviour + 'static) -> Self {
        Self {
            name: name.into(),
            priority: 0,
            enabled: true,
            behaviour: Box::new(behaviour),
        }
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Create the component disabled: Awake runs, OnEnable and phase callbacks do not
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Blueprint for one owning object: a set of components instantiated together
#[derive(Default)]
pub struct Template {
    pub(crate) parts: Vec<ComponentSpec>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component to the object
    pub fn with(mut self, spec: ComponentSpec) -> Self {
        self.parts.push(spec);
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl From<ComponentSpec> for Template {
    fn from(spec: ComponentSpec) -> Self {
        Template::new().with(spec)
    }
}

/// Handle to an instantiated object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub group: GroupId,
    /// Component ids in template order
    pub components: Vec<ComponentId>,
}

impl Instance {
    /// The first component of the template
    pub fn primary(&self) -> ComponentId {
        self.components[0]
    }
}
