//! Shared fixtures for the scheduler integration tests

#![allow(dead_code)]

use cadence_scheduler::{
    Behaviour, Callback, Capabilities, ComponentId, ComponentSpec, Context, Phase, Result,
    Scheduler, SchedulerConfig,
};
use std::cell::RefCell;
use std::rc::Rc;

/// One callback invocation as seen by a component
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub frame: u64,
    pub phase: Option<Phase>,
    pub substep: Option<u32>,
    pub id: ComponentId,
    pub name: String,
    pub callback: Callback,
}

impl Event {
    /// Where in the frame the event happened
    pub fn site(&self) -> (u64, Option<Phase>, Option<u32>) {
        (self.frame, self.phase, self.substep)
    }

    pub fn line(&self) -> String {
        cadence_scheduler::format_line(self.frame, &self.name, self.id, self.callback)
    }
}

#[derive(Clone, Default)]
pub struct Journal {
    events: Rc<RefCell<Vec<Event>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, ctx: &Context<'_>, callback: Callback) {
        let id = ctx.self_id().expect("callbacks always have a current component");
        self.events.borrow_mut().push(Event {
            frame: ctx.current_frame(),
            phase: ctx.current_phase(),
            substep: ctx.substep(),
            id,
            name: ctx.name_of(id).unwrap_or("<destroyed>").to_string(),
            callback,
        });
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn lines(&self) -> Vec<String> {
        self.events.borrow().iter().map(Event::line).collect()
    }

    pub fn of(&self, name: &str) -> Vec<Event> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    /// Compact `name:Callback` strings, handy for exact sequence checks
    pub fn compact(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .map(|e| format!("{}:{}", e.name, e.callback))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

type Action = Box<dyn FnMut(&mut Context<'_>) -> Result<()>>;

/// Records each of its callbacks, then runs any actions attached to that callback
pub struct Actor {
    journal: Journal,
    capabilities: Capabilities,
    actions: Vec<(Callback, Action)>,
}

impl Actor {
    pub fn new(journal: &Journal, capabilities: Capabilities) -> Self {
        Self {
            journal: journal.clone(),
            capabilities,
            actions: Vec::new(),
        }
    }

    pub fn on(
        mut self,
        callback: Callback,
        action: impl FnMut(&mut Context<'_>) -> Result<()> + 'static,
    ) -> Self {
        self.actions.push((callback, Box::new(action)));
        self
    }

    fn fire(&mut self, ctx: &mut Context<'_>, callback: Callback) -> Result<()> {
        self.journal.record(ctx, callback);
        for (on, action) in self.actions.iter_mut() {
            if *on == callback {
                action(ctx)?;
            }
        }
        Ok(())
    }
}

impl Behaviour for Actor {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn awake(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        self.fire(ctx, Callback::Awake)
    }

    fn on_enable(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        self.fire(ctx, Callback::OnEnable)
    }

    fn start(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        self.fire(ctx, Callback::Start)
    }

    fn fixed_update(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        self.fire(ctx, Callback::FixedUpdate)
    }

    fn update(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        self.fire(ctx, Callback::Update)
    }

    fn late_update(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        self.fire(ctx, Callback::LateUpdate)
    }
}

/// Awake, OnEnable, Start plus exactly one phase callback
pub fn archetype_caps(phase: Callback) -> Capabilities {
    let caps = Capabilities::lifecycle();
    match phase {
        Callback::FixedUpdate => caps.with_fixed_update(),
        Callback::Update => caps.with_update(),
        Callback::LateUpdate => caps.with_late_update(),
        other => panic!("{other} is not a phase callback"),
    }
}

pub fn archetype(journal: &Journal, name: &str, phase: Callback) -> ComponentSpec {
    ComponentSpec::new(name, Actor::new(journal, archetype_caps(phase)))
}

/// Instantiate one component of each archetype, named `<Kind>@<site>`
pub fn spawn_trio(ctx: &mut Context<'_>, journal: &Journal, site: Callback) -> Result<()> {
    ctx.instantiate(archetype(journal, &format!("Fixed@{site}"), Callback::FixedUpdate))?;
    ctx.instantiate(archetype(journal, &format!("Update@{site}"), Callback::Update))?;
    ctx.instantiate(archetype(journal, &format!("Late@{site}"), Callback::LateUpdate))?;
    Ok(())
}

/// A component that spawns one of each archetype from every callback it defines
pub fn spawner(journal: &Journal) -> ComponentSpec {
    let mut actor = Actor::new(journal, Capabilities::ALL);
    for site in [
        Callback::Awake,
        Callback::Start,
        Callback::FixedUpdate,
        Callback::Update,
        Callback::LateUpdate,
    ] {
        let journal = journal.clone();
        actor = actor.on(site, move |ctx| spawn_trio(ctx, &journal, site));
    }
    ComponentSpec::new("Spawner", actor)
}

pub fn running(config: SchedulerConfig) -> Scheduler {
    let mut scheduler = Scheduler::new(config).expect("valid config");
    scheduler.start_simulation().expect("fresh scheduler starts");
    scheduler
}

pub fn running_default() -> Scheduler {
    running(SchedulerConfig::default())
}
