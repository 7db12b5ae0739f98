//! Game clock with fixed-timestep accumulator

use crate::config::SchedulerConfig;
use std::time::Instant;

/// Tracks game time and turns elapsed time into a FixedUpdate substep count
pub struct GameClock {
    /// Total elapsed game time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Fixed timestep interval (default: 1/50 second)
    pub fixed_timestep: f64,
    /// Largest frame time fed into the accumulator
    pub max_frame_time: f64,
    /// Most substeps handed out for a single frame
    pub max_substeps: u32,
    /// Accumulated time for fixed-step consumption
    accumulator: f64,
    /// Last tick instant
    last_instant: Instant,
    /// Whether this is the first tick
    first_tick: bool,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}

impl GameClock {
    /// Create a new game clock with the default 50Hz fixed timestep
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a game clock with a custom fixed update rate
    pub fn with_fixed_timestep(hz: f64) -> Self {
        Self {
            fixed_timestep: 1.0 / hz,
            ..Self::default()
        }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            fixed_timestep: config.fixed_timestep,
            max_frame_time: config.max_frame_time,
            max_substeps: config.max_substeps,
            accumulator: 0.0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }

    /// Advance the clock from the wall clock. Call once per frame.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            return;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed);
    }

    /// Advance the clock by an explicit amount of time. Deterministic hosts use this instead of `tick`.
    pub fn advance(&mut self, elapsed: f64) {
        self.delta_time = elapsed.clamp(0.0, self.max_frame_time);
        self.total_time += self.delta_time;
        self.accumulator += self.delta_time;
    }

    /// Returns true if there's enough accumulated time for a fixed update step
    pub fn should_fixed_update(&self) -> bool {
        self.accumulator >= self.fixed_timestep
    }

    /// Consume one fixed timestep from the accumulator
    pub fn consume_fixed_step(&mut self) {
        self.accumulator -= self.fixed_timestep;
    }

    /// Consume every whole timestep available and return how many FixedUpdate substeps this frame runs.
    ///
    /// Capped at `max_substeps`; time beyond the cap is dropped rather than carried into the next frame.
    pub fn drain_substeps(&mut self) -> u32 {
        let mut steps = 0;
        while self.should_fixed_update() && steps < self.max_substeps {
            self.consume_fixed_step();
            steps += 1;
        }
        if self.should_fixed_update() {
            tracing::warn!(
                dropped = self.accumulator,
                max_substeps = self.max_substeps,
                "fixed update falling behind, dropping accumulated time"
            );
            self.accumulator %= self.fixed_timestep;
        }
        steps
    }

    /// Get the interpolation alpha for rendering between fixed steps
    pub fn interpolation_alpha(&self) -> f64 {
        self.accumulator / self.fixed_timestep
    }
}
