//! Callback context — the scheduler surface handed to component callbacks.
//!
//! A `Context` borrows the registry and the instantiation queue for the span of
//! one callback. Everything it does to them goes through the queue or the
//! tombstone list, so the scan that invoked the callback is never disturbed.

use crate::behaviour::{invoke, Behaviour, Callback};
use crate::descriptor::ComponentDescriptor;
use crate::queue::InstantiationQueue;
use crate::registry::ComponentRegistry;
use crate::template::{Instance, Template};
use cadence_core::{CadenceError, ComponentId, GroupId, IdAllocator, Phase, Result};

pub struct Context<'a> {
    registry: &'a mut ComponentRegistry,
    queue: &'a mut InstantiationQueue,
    ids: &'a mut IdAllocator,
    frame: u64,
    phase: Option<Phase>,
    substep: Option<u32>,
    current: Option<ComponentId>,
    depth: usize,
    max_depth: usize,
}

impl<'a> Context<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        registry: &'a mut ComponentRegistry,
        queue: &'a mut InstantiationQueue,
        ids: &'a mut IdAllocator,
        frame: u64,
        phase: Option<Phase>,
        substep: Option<u32>,
        current: Option<ComponentId>,
        max_depth: usize,
    ) -> Self {
        Self {
            registry,
            queue,
            ids,
            frame,
            phase,
            substep,
            current,
            depth: 0,
            max_depth,
        }
    }

    /// Frame counter; 0 before the first frame
    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    /// Running phase, `None` outside a frame
    pub fn current_phase(&self) -> Option<Phase> {
        self.phase
    }

    /// Zero-based FixedUpdate substep index while the FixedUpdate block runs
    pub fn substep(&self) -> Option<u32> {
        self.substep
    }

    /// The component whose callback is running, `None` for host calls
    pub fn self_id(&self) -> Option<ComponentId> {
        self.current
    }

    /// Nesting level of synchronous instantiation; 0 in phase callbacks
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Snapshot of a live, pending or awakening component. `None` if unknown or destroyed.
    pub fn get(&self, id: ComponentId) -> Option<ComponentDescriptor> {
        self.lookup(id).cloned()
    }

    /// Display name of a component that is not destroyed
    pub fn name_of(&self, id: ComponentId) -> Option<&str> {
        self.lookup(id).map(|d| d.name.as_str())
    }

    fn lookup(&self, id: ComponentId) -> Option<&ComponentDescriptor> {
        if self.registry.is_tombstoned(id) {
            return None;
        }
        self.registry.get(id).or_else(|| self.queue.get(id))
    }

    fn lookup_mut(&mut self, id: ComponentId) -> Option<(&mut ComponentDescriptor, bool)> {
        if self.registry.is_tombstoned(id) {
            return None;
        }
        if let Some(d) = self.registry.get_mut(id) {
            return Some((d, true));
        }
        self.queue.get_mut(id).map(|d| (d, false))
    }

    /// Create the components of `template` as one new object.
    ///
    /// Awake then OnEnable run for each component, in priority order, before this returns.
    /// The components join the live set at the next phase boundary; Start and phase
    /// callbacks come later. Nested instantiation from Awake/OnEnable recurses up to the
    /// configured depth, beyond which `RecursiveInstantiationOverflow` is returned.
    pub fn instantiate(&mut self, template: impl Into<Template>) -> Result<Instance> {
        let template = template.into();
        if template.is_empty() {
            return Err(CadenceError::Configuration(
                "cannot instantiate an empty template".into(),
            ));
        }

        let depth = self.depth + 1;
        if depth > self.max_depth {
            tracing::error!(
                depth,
                limit = self.max_depth,
                frame = self.frame,
                "synchronous instantiation chain too deep"
            );
            return Err(CadenceError::RecursiveInstantiationOverflow {
                depth,
                limit: self.max_depth,
            });
        }

        let group = self.ids.group();
        let mut parts: Vec<(ComponentDescriptor, Box<dyn Behaviour>)> =
            Vec::with_capacity(template.len());
        for spec in template.parts {
            let capabilities = spec.behaviour.capabilities();
            let descriptor = ComponentDescriptor {
                id: self.ids.component(),
                name: spec.name,
                priority: spec.priority,
                capabilities,
                started: !capabilities.start,
                enabled: spec.enabled,
                group,
                created_frame: self.frame,
                created_phase: self.phase,
            };
            parts.push((descriptor, spec.behaviour));
        }
        let components: Vec<ComponentId> = parts.iter().map(|(d, _)| d.id).collect();

        // Stable: equal priorities keep template order
        parts.sort_by_key(|(d, _)| d.order_key());

        let mut behaviours = Vec::with_capacity(parts.len());
        for (descriptor, behaviour) in parts {
            behaviours.push((descriptor.id, behaviour));
            self.queue.stage(descriptor);
        }

        let outer = (self.current, self.depth);
        self.depth = depth;
        let result = self.awaken(behaviours);
        (self.current, self.depth) = outer;

        if let Err(err) = result {
            for id in &components {
                self.queue.unstage(*id);
                self.registry.tombstone(*id);
            }
            return Err(err);
        }

        tracing::debug!(
            %group,
            count = components.len(),
            frame = self.frame,
            phase = ?self.phase,
            "instantiated object"
        );
        Ok(Instance { group, components })
    }

    fn awaken(&mut self, parts: Vec<(ComponentId, Box<dyn Behaviour>)>) -> Result<()> {
        for (id, mut behaviour) in parts {
            self.current = Some(id);

            let wants_awake = self
                .queue
                .get(id)
                .is_some_and(|d| d.capabilities.awake);
            if wants_awake {
                invoke(behaviour.as_mut(), Callback::Awake, self)?;
            }

            // Awake may have destroyed or disabled the component
            let wants_enable = !self.registry.is_tombstoned(id)
                && self
                    .queue
                    .get(id)
                    .is_some_and(|d| d.enabled && d.capabilities.on_enable);
            if wants_enable {
                invoke(behaviour.as_mut(), Callback::OnEnable, self)?;
            }

            if let Some(descriptor) = self.queue.unstage(id) {
                self.queue
                    .enqueue(descriptor, behaviour, self.phase, self.frame);
            }
        }
        Ok(())
    }

    /// Destroy a component. Idempotent: unknown or already destroyed ids are ignored.
    ///
    /// A destroyed component is skipped by the rest of the running scan and leaves the
    /// live set at the next boundary. Returns whether this call marked it.
    pub fn destroy(&mut self, id: ComponentId) -> bool {
        if self.lookup(id).is_none() {
            tracing::debug!(component = %id, "destroy ignored for unknown or destroyed handle");
            return false;
        }
        self.registry.tombstone(id);
        tracing::debug!(component = %id, frame = self.frame, phase = ?self.phase, "tombstoned");
        true
    }

    /// Destroy every component of an object. Returns how many were marked.
    pub fn destroy_object(&mut self, group: GroupId) -> usize {
        let mut ids = self.registry.ids_in_group(group);
        ids.extend(self.queue.ids_in_group(group));
        ids.into_iter().filter(|id| self.destroy(*id)).count()
    }

    /// Change execution order. The new position applies from the next boundary on.
    pub fn set_priority(&mut self, id: ComponentId, priority: i32) -> Result<()> {
        let (descriptor, live) = self
            .lookup_mut(id)
            .ok_or(CadenceError::UnknownHandle(id))?;
        if descriptor.priority == priority {
            return Ok(());
        }
        descriptor.priority = priority;
        if live {
            self.registry.mark_reorder();
        }
        Ok(())
    }

    /// Enable or disable a component. Disabled components get no Start or phase callbacks.
    pub fn set_enabled(&mut self, id: ComponentId, enabled: bool) -> Result<()> {
        let (descriptor, _) = self
            .lookup_mut(id)
            .ok_or(CadenceError::UnknownHandle(id))?;
        descriptor.enabled = enabled;
        Ok(())
    }

    pub fn set_name(&mut self, id: ComponentId, name: impl Into<String>) -> Result<()> {
        let (descriptor, _) = self
            .lookup_mut(id)
            .ok_or(CadenceError::UnknownHandle(id))?;
        descriptor.name = name.into();
        Ok(())
    }
}
