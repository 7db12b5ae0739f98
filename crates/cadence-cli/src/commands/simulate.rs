//! Simulate command — feeds clock-derived substep counts into the scheduler

use anyhow::{Context as _, Result};
use cadence_runtime::{GameClock, SchedulerConfig};
use cadence_scheduler::{Behaviour, Capabilities, ComponentSpec, Context, Scheduler};
use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

/// Frames between two particle spawns
const EMIT_EVERY: u64 = 2;
/// FixedUpdate steps a particle lives for
const PARTICLE_LIFETIME: u32 = 5;

pub struct SimulateArgs {
    pub config: Option<String>,
    pub frames: usize,
    pub frame_time: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Summary {
    pub frames: u64,
    pub substeps: u64,
    pub spawned: u64,
    pub expired: u64,
    pub live: usize,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => SchedulerConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load config {}", path))?,
        None => SchedulerConfig::default(),
    };

    println!(
        "Fixed timestep: {:.4}s, max substeps: {}, policy: {:?}",
        config.fixed_timestep, config.max_substeps, config.failure_policy
    );
    println!();
    println!("{:>6} {:>9} {:>6} {:>8} {:>6}", "frame", "substeps", "live", "pending", "alpha");

    let summary = simulate(config, args.frames, args.frame_time, |scheduler, clock, substeps| {
        println!(
            "{:>6} {:>9} {:>6} {:>8} {:>6.2}",
            scheduler.current_frame(),
            substeps,
            scheduler.live_count(),
            scheduler.pending_count(),
            clock.interpolation_alpha()
        );
    })?;

    println!();
    println!(
        "Spawned {} particle(s), {} expired, {} component(s) live after {} frame(s)",
        summary.spawned, summary.expired, summary.live, summary.frames
    );
    Ok(())
}

/// Run `frames` frames, advancing the clock by `frame_time` before each one.
/// `on_frame` sees the scheduler after every frame.
pub fn simulate(
    config: SchedulerConfig,
    frames: usize,
    frame_time: f64,
    mut on_frame: impl FnMut(&Scheduler, &GameClock, u32),
) -> Result<Summary> {
    let mut clock = GameClock::from_config(&config);
    let mut scheduler = Scheduler::new(config)?;

    let spawned = Rc::new(Cell::new(0));
    let expired = Rc::new(Cell::new(0));
    scheduler.instantiate(ComponentSpec::new(
        "Emitter",
        Emitter {
            spawned: spawned.clone(),
            expired: expired.clone(),
        },
    ))?;
    scheduler.start_simulation()?;

    let mut summary = Summary::default();
    for _ in 0..frames {
        clock.advance(frame_time);
        let substeps = clock.drain_substeps();
        scheduler.run_frame(i64::from(substeps))?;

        summary.frames += 1;
        summary.substeps += u64::from(substeps);
        on_frame(&scheduler, &clock, substeps);
    }
    scheduler.stop_simulation();

    summary.spawned = spawned.get();
    summary.expired = expired.get();
    summary.live = scheduler.live_count();
    tracing::info!(
        frames = summary.frames,
        substeps = summary.substeps,
        total_time = clock.total_time,
        spawned = summary.spawned,
        live = summary.live,
        "simulation finished"
    );
    Ok(summary)
}

/// Spawns a particle every `EMIT_EVERY` frames
struct Emitter {
    spawned: Rc<Cell<u64>>,
    expired: Rc<Cell<u64>>,
}

impl Behaviour for Emitter {
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE.with_update()
    }

    fn update(&mut self, ctx: &mut Context<'_>) -> cadence_scheduler::Result<()> {
        if ctx.current_frame() % EMIT_EVERY != 0 {
            return Ok(());
        }
        let n = self.spawned.get() + 1;
        self.spawned.set(n);
        ctx.instantiate(ComponentSpec::new(
            format!("Particle#{}", n),
            Particle {
                remaining: PARTICLE_LIFETIME,
                expired: self.expired.clone(),
            },
        ))?;
        Ok(())
    }
}

/// Destroys itself after a fixed number of FixedUpdate steps
struct Particle {
    remaining: u32,
    expired: Rc<Cell<u64>>,
}

impl Behaviour for Particle {
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE.with_start().with_fixed_update()
    }

    fn start(&mut self, ctx: &mut Context<'_>) -> cadence_scheduler::Result<()> {
        tracing::debug!(frame = ctx.current_frame(), phase = ?ctx.current_phase(), "particle started");
        Ok(())
    }

    fn fixed_update(&mut self, ctx: &mut Context<'_>) -> cadence_scheduler::Result<()> {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            if let Some(id) = ctx.self_id() {
                if ctx.destroy(id) {
                    self.expired.set(self.expired.get() + 1);
                }
            }
        }
        Ok(())
    }
}
