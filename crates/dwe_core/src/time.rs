//! Fixed-timestep timing: a wall-clock accumulator for the driver and a
//! deterministic simulation clock for the level.
//!
//! `TimeState` converts irregular wall-clock frames into a whole number of
//! fixed 60 Hz steps. `SimClock` counts those steps in integer microseconds,
//! so every timestamp the simulation ever compares against is exact, with no
//! floating-point drift across platforms.

use std::time::Instant;

/// One fixed simulation step, in microseconds (60 Hz).
pub const FIXED_DT_US: u64 = 16_667;

pub struct TimeState {
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,
}

impl TimeState {
    pub fn new() -> Self {
        Self {
            fixed_dt: FIXED_DT_US as f64 / 1_000_000.0,
            max_accumulator: 0.25,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        self.real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;

        // Spiral-of-death cap
        if self.real_dt > self.max_accumulator {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {}ms",
                self.real_dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            self.real_dt = self.max_accumulator;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_time += self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Monotonic simulation clock, advanced once per fixed step.
///
/// All gameplay timers (invincibility windows, power-up expiry) are polled
/// against `now_ms()`; resolution is therefore bounded by the step rate,
/// which is what the polled-timer model expects.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimClock {
    elapsed_us: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self { elapsed_us: 0 }
    }

    pub fn advance_step(&mut self) {
        self.elapsed_us += FIXED_DT_US;
    }

    pub fn now_ms(&self) -> u64 {
        self.elapsed_us / 1000
    }
}
