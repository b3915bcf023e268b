use std::time::Instant;

/// Source of frame timestamps, in seconds
pub trait Clock {
    fn now(&self) -> f32;
}

/// Clock that only moves when told to.
///
/// Drives tests with synthetic timestamps, and the ECS front-end with bevy's
/// `Time`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualClock {
    now: f32,
}

impl ManualClock {
    pub fn new(now: f32) -> Self {
        Self { now }
    }

    pub fn set(&mut self, now: f32) {
        self.now = now;
    }

    pub fn advance(&mut self, dt: f32) {
        self.now += dt;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f32 {
        self.now
    }
}

/// Wall clock measured from construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f32 {
        self.origin.elapsed().as_secs_f32()
    }
}
