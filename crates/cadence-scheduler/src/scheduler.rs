//! Phase runner — drives one frame of StartFlush steps and phase scans.
//!
//! A frame is six ordered steps:
//!
//! ```text
//! PreFixedStart → FixedUpdate × k → PreUpdateStart → Update → PreLateStart → LateUpdate
//! ```
//!
//! Every scan (and every FixedUpdate substep) iterates a snapshot of the live
//! ordered set taken when the scan begins, and ends in a boundary merge that
//! folds queued instantiations and tombstones into the registry. A component
//! created during a scan therefore never receives a callback from that scan.

use crate::behaviour::{invoke, Callback};
use crate::context::Context;
use crate::descriptor::ComponentDescriptor;
use crate::queue::InstantiationQueue;
use crate::registry::ComponentRegistry;
use crate::template::{Instance, Template};
use cadence_core::{CadenceError, ComponentId, GroupId, IdAllocator, Phase, Result};
use cadence_runtime::{FailurePolicy, SchedulerConfig};

/// Host-facing lifecycle bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    NotStarted,
    Running,
    Stopped,
}

/// Whether a frame is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    RunningFrame,
}

/// The scheduler context object: owns the registry, the instantiation queue and the frame state.
pub struct Scheduler {
    config: SchedulerConfig,
    registry: ComponentRegistry,
    queue: InstantiationQueue,
    ids: IdAllocator,
    frame: u64,
    phase: Option<Phase>,
    substep: Option<u32>,
    state: RunnerState,
    simulation: SimulationState,
}

impl Scheduler {
    /// Create a scheduler after validating `config`
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: ComponentRegistry::new(),
            queue: InstantiationQueue::new(),
            ids: IdAllocator::new(),
            frame: 0,
            phase: None,
            substep: None,
            state: RunnerState::Idle,
            simulation: SimulationState::NotStarted,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn simulation_state(&self) -> SimulationState {
        self.simulation
    }

    pub fn runner_state(&self) -> RunnerState {
        self.state
    }

    /// Number of completed or running frames; 0 before the first `run_frame`
    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    pub fn current_phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn substep(&self) -> Option<u32> {
        self.substep
    }

    /// Begin the simulation. Calling it again while running is a no-op.
    pub fn start_simulation(&mut self) -> Result<()> {
        match self.simulation {
            SimulationState::NotStarted => {
                self.simulation = SimulationState::Running;
                tracing::info!(live = self.registry.len(), pending = self.queue.len(), "simulation started");
                Ok(())
            }
            SimulationState::Running => Ok(()),
            SimulationState::Stopped => Err(CadenceError::Configuration(
                "a stopped simulation cannot be restarted".into(),
            )),
        }
    }

    /// End the simulation. Components stay inspectable; further frames are rejected.
    pub fn stop_simulation(&mut self) {
        if self.simulation != SimulationState::Stopped {
            tracing::info!(frame = self.frame, live = self.registry.len(), "simulation stopped");
        }
        self.simulation = SimulationState::Stopped;
    }

    /// Run one frame with `substeps` FixedUpdate repetitions.
    ///
    /// A negative count is rejected before anything changes: the frame counter
    /// does not advance and the registry is untouched.
    pub fn run_frame(&mut self, substeps: i64) -> Result<()> {
        let substeps = u32::try_from(substeps).map_err(|_| {
            CadenceError::Configuration(format!("invalid substep count {substeps}"))
        })?;
        if self.simulation != SimulationState::Running {
            return Err(CadenceError::NotRunning);
        }

        self.frame += 1;
        self.state = RunnerState::RunningFrame;
        tracing::trace!(frame = self.frame, substeps, "frame begin");

        let result = self.run_steps(substeps);

        self.state = RunnerState::Idle;
        self.phase = None;
        self.substep = None;
        result
    }

    fn run_steps(&mut self, substeps: u32) -> Result<()> {
        // Host-side changes made between frames
        self.boundary();

        self.start_flush(Phase::PreFixedStart)?;
        self.boundary();

        for step in 0..substeps {
            self.substep = Some(step);
            self.scan(Phase::FixedUpdate, Callback::FixedUpdate)?;
            self.boundary();
        }
        self.substep = None;

        self.start_flush(Phase::PreUpdateStart)?;
        self.boundary();
        self.scan(Phase::Update, Callback::Update)?;
        self.boundary();

        self.start_flush(Phase::PreLateStart)?;
        self.boundary();
        self.scan(Phase::LateUpdate, Callback::LateUpdate)?;
        self.boundary();

        Ok(())
    }

    /// Call Start on every live, enabled component still waiting for it
    fn start_flush(&mut self, phase: Phase) -> Result<()> {
        self.phase = Some(phase);
        for id in self.registry.live_ordered() {
            // Destroyed or disabled earlier in this scan
            let Some(descriptor) = self.registry.get(id) else {
                continue;
            };
            if !descriptor.awaiting_start() {
                continue;
            }
            self.mark_started(id);
            self.dispatch(id, Callback::Start)?;
        }
        Ok(())
    }

    /// Visit every live component defining `callback`, pairing Start with it where still due
    fn scan(&mut self, phase: Phase, callback: Callback) -> Result<()> {
        self.phase = Some(phase);
        for id in self.registry.live_ordered() {
            let Some(descriptor) = self.registry.get(id) else {
                continue;
            };
            if !descriptor.enabled || !descriptor.capabilities.handles(callback) {
                continue;
            }
            match (descriptor.started, descriptor.capabilities.start) {
                (true, _) => {
                    self.dispatch(id, callback)?;
                }
                (false, true) => {
                    self.mark_started(id);
                    // Start may have destroyed or disabled the component
                    if self.dispatch(id, Callback::Start)? && self.is_active(id) {
                        self.dispatch(id, callback)?;
                    }
                }
                // Left for a later StartFlush
                (false, false) => continue,
            }
        }
        Ok(())
    }

    /// Live, not tombstoned and enabled
    fn is_active(&self, id: ComponentId) -> bool {
        self.registry.get(id).is_some_and(|d| d.enabled)
    }

    fn mark_started(&mut self, id: ComponentId) {
        if let Some(descriptor) = self.registry.get_mut(id) {
            descriptor.started = true;
        }
    }

    /// Run one callback on a component, applying the failure policy.
    ///
    /// Returns `Ok(false)` when the callback failed and the failure was isolated.
    fn dispatch(&mut self, id: ComponentId, callback: Callback) -> Result<bool> {
        // Scans never nest, so a live slot always holds its behaviour here
        let behaviour = self.registry.take_behaviour(id);
        debug_assert!(behaviour.is_some(), "behaviour of component {id} is already lent out");
        let Some(mut behaviour) = behaviour else {
            tracing::warn!(component = %id, %callback, "behaviour missing during dispatch");
            return Ok(false);
        };

        tracing::trace!(frame = self.frame, phase = ?self.phase, component = %id, %callback, "dispatch");
        let outcome = {
            let mut ctx = self.context(Some(id));
            invoke(behaviour.as_mut(), callback, &mut ctx)
        };
        self.registry.restore_behaviour(id, behaviour);

        let Err(err) = outcome else {
            return Ok(true);
        };
        let name = self
            .registry
            .get(id)
            .map(|d| d.name.clone())
            .unwrap_or_default();
        let callback = callback.name();
        if self.config.failure_policy == FailurePolicy::Isolate && !err.is_fatal() {
            tracing::warn!(frame = self.frame, component = %id, %name, callback, error = %err, "callback failed, continuing scan");
            return Ok(false);
        }
        tracing::error!(frame = self.frame, component = %id, %name, callback, error = %err, "callback failed, aborting frame");
        Err(err)
    }

    /// Fold queued instantiations and tombstones into the live set
    fn boundary(&mut self) {
        let pending = self.queue.drain();
        let stats = self.registry.merge(pending);
        if !stats.is_empty() {
            tracing::debug!(
                frame = self.frame,
                phase = ?self.phase,
                inserted = stats.inserted,
                removed = stats.removed,
                discarded = stats.discarded,
                live = self.registry.len(),
                "boundary merge"
            );
        }
    }

    fn context(&mut self, current: Option<ComponentId>) -> Context<'_> {
        Context::new(
            &mut self.registry,
            &mut self.queue,
            &mut self.ids,
            self.frame,
            self.phase,
            self.substep,
            current,
            self.config.max_instantiation_depth,
        )
    }

    /// Instantiate from the host. Awake/OnEnable run now; the components join the
    /// live set at the start of the next frame.
    pub fn instantiate(&mut self, template: impl Into<Template>) -> Result<Instance> {
        self.context(None).instantiate(template)
    }

    /// Idempotent destroy; see [`Context::destroy`]
    pub fn destroy(&mut self, id: ComponentId) -> bool {
        self.context(None).destroy(id)
    }

    pub fn destroy_object(&mut self, group: GroupId) -> usize {
        self.context(None).destroy_object(group)
    }

    pub fn set_priority(&mut self, id: ComponentId, priority: i32) -> Result<()> {
        self.context(None).set_priority(id, priority)
    }

    pub fn set_enabled(&mut self, id: ComponentId, enabled: bool) -> Result<()> {
        self.context(None).set_enabled(id, enabled)
    }

    pub fn set_name(&mut self, id: ComponentId, name: impl Into<String>) -> Result<()> {
        self.context(None).set_name(id, name)
    }

    /// Snapshot of a live or pending component
    pub fn get(&self, id: ComponentId) -> Option<ComponentDescriptor> {
        if self.registry.is_tombstoned(id) {
            return None;
        }
        self.registry.get(id).or_else(|| self.queue.get(id)).cloned()
    }

    /// Live components in visit order
    pub fn live_ordered(&self) -> Vec<ComponentId> {
        self.registry.live_ordered()
    }

    pub fn live_count(&self) -> usize {
        self.registry.len()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }
}
