//! Callback traces — a diagnostic collaborator that records `Frame <n>: <name>(<id>): <event>` lines.
//!
//! Nothing in the scheduler writes to a trace on its own; components opt in by
//! holding a [`TraceLog`] handle, and [`Probe`] is a ready-made component that
//! records every callback it defines.

use crate::behaviour::{Behaviour, Callback};
use crate::context::Context;
use crate::descriptor::Capabilities;
use cadence_core::{ComponentId, Result};
use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

/// Render one trace line
pub fn format_line(frame: u64, name: &str, id: ComponentId, event: impl Display) -> String {
    format!("Frame {frame}: {name}({id}): {event}")
}

/// Shared, append-only list of trace lines. Clones write to the same list.
#[derive(Debug, Clone, Default)]
pub struct TraceLog {
    lines: Rc<RefCell<Vec<String>>>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `event` for the component whose callback is running.
    ///
    /// Host calls (no current component) are recorded as `host(0)`.
    pub fn record(&self, ctx: &Context<'_>, event: impl Display) {
        let line = match ctx.self_id() {
            Some(id) => format_line(
                ctx.current_frame(),
                ctx.name_of(id).unwrap_or("<destroyed>"),
                id,
                event,
            ),
            None => format_line(ctx.current_frame(), "host", ComponentId::from_raw(0), event),
        };
        self.push(line);
    }

    pub fn push(&self, line: impl Into<String>) {
        self.lines.borrow_mut().push(line.into());
    }

    /// Copy of every recorded line
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Remove and return every recorded line
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.lines.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }

    /// All lines joined with newlines
    pub fn render(&self) -> String {
        self.lines.borrow().join("\n")
    }
}

/// A component that only records its own callbacks
pub struct Probe {
    log: TraceLog,
    capabilities: Capabilities,
}

impl Probe {
    pub fn new(log: &TraceLog, capabilities: Capabilities) -> Self {
        Self {
            log: log.clone(),
            capabilities,
        }
    }

    fn note(&self, ctx: &Context<'_>, callback: Callback) -> Result<()> {
        self.log.record(ctx, callback);
        Ok(())
    }
}

impl Behaviour for Probe {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn awake(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        self.note(ctx, Callback::Awake)
    }

    fn on_enable(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        self.note(ctx, Callback::OnEnable)
    }

    fn start(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        self.note(ctx, Callback::Start)
    }

    fn fixed_update(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        self.note(ctx, Callback::FixedUpdate)
    }

    fn update(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        self.note(ctx, Callback::Update)
    }

    fn late_update(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        self.note(ctx, Callback::LateUpdate)
    }
}
