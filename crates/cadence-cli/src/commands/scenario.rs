//! Scenario command — runs a reference scenario and prints its callback trace

use anyhow::Result;
use cadence_scheduler::{
    Behaviour, Callback, Capabilities, ComponentId, ComponentSpec, Context, Probe, Scheduler,
    SchedulerConfig, TraceLog,
};
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenarioName {
    /// Spawner creating one component of each archetype from every callback
    A,
    /// Components spawned from Start, one without FixedUpdate
    B,
    /// The same handle destroyed twice in one callback
    C,
    /// Frames with zero FixedUpdate substeps
    D,
}

impl ScenarioName {
    fn default_substeps(self) -> &'static [i64] {
        match self {
            ScenarioName::A => &[1, 0],
            ScenarioName::B => &[2],
            ScenarioName::C | ScenarioName::D => &[0],
        }
    }

    fn summary(self) -> &'static str {
        match self {
            ScenarioName::A => "spawning from every callback",
            ScenarioName::B => "no implicit Start without FixedUpdate",
            ScenarioName::C => "double destroy",
            ScenarioName::D => "zero substeps",
        }
    }
}

pub struct ScenarioArgs {
    pub name: ScenarioName,
    pub frames: usize,
    pub substeps: Vec<i64>,
}

pub fn run(args: ScenarioArgs) -> Result<()> {
    let substeps = if args.substeps.is_empty() {
        args.name.default_substeps().to_vec()
    } else {
        args.substeps
    };

    let log = trace(args.name, args.frames, &substeps)?;

    println!("Scenario {:?}: {}", args.name, args.name.summary());
    println!("Frames: {}, substeps: {:?}", args.frames, substeps);
    println!();
    for line in log.lines() {
        println!("{}", line);
    }

    Ok(())
}

/// Run a scenario for `frames` frames. Frame `n` uses `substeps[n]`, or the last entry once exhausted.
pub fn trace(name: ScenarioName, frames: usize, substeps: &[i64]) -> Result<TraceLog> {
    let log = TraceLog::new();
    let mut scheduler = Scheduler::new(SchedulerConfig::default())?;
    scheduler.start_simulation()?;

    match name {
        ScenarioName::A => {
            scheduler.instantiate(ComponentSpec::new("Spawner", Spawner { log: log.clone() }))?;
        }
        ScenarioName::B => {
            scheduler.instantiate(ComponentSpec::new("Creator", Creator { log: log.clone() }))?;
        }
        ScenarioName::C => {
            let caps = Capabilities::lifecycle().with_update();
            scheduler.instantiate(ComponentSpec::new("Before", Probe::new(&log, caps)))?;
            let victim = scheduler
                .instantiate(ComponentSpec::new("Victim", Probe::new(&log, caps)).priority(5))?
                .primary();
            scheduler.instantiate(ComponentSpec::new("After", Probe::new(&log, caps)))?;
            scheduler.instantiate(ComponentSpec::new(
                "Killer",
                Killer {
                    log: log.clone(),
                    victim,
                    times: 2,
                },
            ))?;
        }
        ScenarioName::D => {
            let caps = Capabilities::lifecycle().with_fixed_update().with_update();
            scheduler.instantiate(ComponentSpec::new("Body", Probe::new(&log, caps)))?;
        }
    }

    for frame in 0..frames {
        let k = substeps
            .get(frame)
            .or(substeps.last())
            .copied()
            .unwrap_or(0);
        scheduler.run_frame(k)?;
    }
    scheduler.stop_simulation();

    Ok(log)
}

const ARCHETYPES: [(&str, Callback); 3] = [
    ("Fixed", Callback::FixedUpdate),
    ("Update", Callback::Update),
    ("Late", Callback::LateUpdate),
];

/// Awake, OnEnable and Start plus the one phase callback
fn archetype(log: &TraceLog, name: &str, phase: Callback) -> ComponentSpec {
    let caps = Capabilities::lifecycle();
    let caps = match phase {
        Callback::FixedUpdate => caps.with_fixed_update(),
        Callback::LateUpdate => caps.with_late_update(),
        _ => caps.with_update(),
    };
    ComponentSpec::new(name, Probe::new(log, caps))
}

/// Instantiates one of each archetype from every callback it defines
struct Spawner {
    log: TraceLog,
}

impl Spawner {
    fn spawn(&self, ctx: &mut Context<'_>, site: Callback) -> cadence_scheduler::Result<()> {
        self.log.record(ctx, site);
        for (kind, phase) in ARCHETYPES {
            ctx.instantiate(archetype(&self.log, &format!("{kind}@{site}"), phase))?;
        }
        Ok(())
    }
}

impl Behaviour for Spawner {
    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    fn awake(&mut self, ctx: &mut Context<'_>) -> cadence_scheduler::Result<()> {
        self.spawn(ctx, Callback::Awake)
    }

    fn on_enable(&mut self, ctx: &mut Context<'_>) -> cadence_scheduler::Result<()> {
        self.log.record(ctx, Callback::OnEnable);
        Ok(())
    }

    fn start(&mut self, ctx: &mut Context<'_>) -> cadence_scheduler::Result<()> {
        self.spawn(ctx, Callback::Start)
    }

    fn fixed_update(&mut self, ctx: &mut Context<'_>) -> cadence_scheduler::Result<()> {
        self.spawn(ctx, Callback::FixedUpdate)
    }

    fn update(&mut self, ctx: &mut Context<'_>) -> cadence_scheduler::Result<()> {
        self.spawn(ctx, Callback::Update)
    }

    fn late_update(&mut self, ctx: &mut Context<'_>) -> cadence_scheduler::Result<()> {
        self.spawn(ctx, Callback::LateUpdate)
    }
}

/// Spawns a FixedUpdate archetype and an Update archetype from Start
struct Creator {
    log: TraceLog,
}

impl Behaviour for Creator {
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE.with_start()
    }

    fn start(&mut self, ctx: &mut Context<'_>) -> cadence_scheduler::Result<()> {
        self.log.record(ctx, Callback::Start);
        ctx.instantiate(archetype(&self.log, "Mover", Callback::FixedUpdate))?;
        ctx.instantiate(archetype(&self.log, "Idle", Callback::Update))?;
        Ok(())
    }
}

/// Destroys `victim` `times` times on every Update, recording each result
struct Killer {
    log: TraceLog,
    victim: ComponentId,
    times: usize,
}

impl Behaviour for Killer {
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE.with_update()
    }

    fn update(&mut self, ctx: &mut Context<'_>) -> cadence_scheduler::Result<()> {
        self.log.record(ctx, Callback::Update);
        for _ in 0..self.times {
            let marked = ctx.destroy(self.victim);
            self.log
                .record(ctx, format!("destroy {} -> {}", self.victim, marked));
        }
        Ok(())
    }
}
