//! Behaviour trait — the callbacks a component exposes to the scheduler

use crate::context::Context;
use crate::descriptor::Capabilities;
use cadence_core::Result;
use std::fmt;

/// A lifecycle callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Callback {
    Awake,
    OnEnable,
    Start,
    FixedUpdate,
    Update,
    LateUpdate,
}

impl Callback {
    pub const ALL: [Callback; 6] = [
        Callback::Awake,
        Callback::OnEnable,
        Callback::Start,
        Callback::FixedUpdate,
        Callback::Update,
        Callback::LateUpdate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Callback::Awake => "Awake",
            Callback::OnEnable => "OnEnable",
            Callback::Start => "Start",
            Callback::FixedUpdate => "FixedUpdate",
            Callback::Update => "Update",
            Callback::LateUpdate => "LateUpdate",
        }
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A schedulable component.
///
/// Only callbacks listed in [`capabilities`](Behaviour::capabilities) are ever invoked;
/// the flags are read once at instantiation. Every callback receives a [`Context`] through
/// which it can instantiate or destroy components. Those structural changes take effect at
/// the next phase boundary, never inside the scan that is running.
pub trait Behaviour {
    /// Callbacks this component defines
    fn capabilities(&self) -> Capabilities;

    /// Called synchronously inside `instantiate`, before it returns
    fn awake(&mut self, _ctx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Called right after Awake if the component is created enabled
    fn on_enable(&mut self, _ctx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Called exactly once, before the component's first phase callback
    fn start(&mut self, _ctx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Called once per FixedUpdate substep
    fn fixed_update(&mut self, _ctx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Called once per frame
    fn update(&mut self, _ctx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Called once per frame after every Update
    fn late_update(&mut self, _ctx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }
}

/// Route a callback to the matching trait method
pub(crate) fn invoke(
    behaviour: &mut dyn Behaviour,
    callback: Callback,
    ctx: &mut Context<'_>,
) -> Result<()> {
    match callback {
        Callback::Awake => behaviour.awake(ctx),
        Callback::OnEnable => behaviour.on_enable(ctx),
        Callback::Start => behaviour.start(ctx),
        Callback::FixedUpdate => behaviour.fixed_update(ctx),
        Callback::Update => behaviour.update(ctx),
        Callback::LateUpdate => behaviour.late_update(ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_names() {
        let names: Vec<String> = Callback::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(
            names,
            vec!["Awake", "OnEnable", "Start", "FixedUpdate", "Update", "LateUpdate"]
        );
    }
}
