//! Fixed-rate tick scheduler.
//!
//! One simulation tick is one frame. Real elapsed time is fed into an
//! accumulator and drained in whole `fixed_dt` slices, so the simulation
//! always advances in identical steps regardless of how long a frame took.

use std::time::{Duration, Instant};

pub const DEFAULT_TICK_HZ: u32 = 60;

pub struct TimeState {
    pub fixed_dt: f64,
    /// Longest real frame fed into the accumulator, in seconds.
    pub max_frame_time: f64,
    accumulator: f64,
    pub tick_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,
}

impl TimeState {
    pub fn new() -> Self {
        Self::with_tick_rate(DEFAULT_TICK_HZ)
    }

    pub fn with_tick_rate(tick_hz: u32) -> Self {
        Self {
            fixed_dt: 1.0 / tick_hz.max(1) as f64,
            max_frame_time: 0.25,
            accumulator: 0.0,
            tick_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
        }
    }

    /// Measure wall-clock time since the previous frame and feed it in.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.feed(real_dt);
    }

    /// Feed an explicit frame delta. Headless runs and tests use this
    /// instead of `begin_frame`.
    pub fn feed(&mut self, real_dt: f64) {
        self.real_dt = real_dt;

        // Spiral-of-death cap
        if self.real_dt > self.max_frame_time {
            log::warn!(
                "Frame took {:.1}ms, clamping to {}ms",
                self.real_dt * 1000.0,
                self.max_frame_time * 1000.0
            );
            self.real_dt = self.max_frame_time;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.tick_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    /// Time left until the next tick is due.
    pub fn until_next_tick(&self) -> Duration {
        Duration::from_secs_f64((self.fixed_dt - self.accumulator).max(0.0))
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}
