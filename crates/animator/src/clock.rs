use std::time::Instant;

/// Monotonic elapsed-time source, in seconds.
pub trait Clock {
    fn elapsed(&mut self) -> f32;
}

/// Wall clock that starts on its first read.
#[derive(Debug, Default)]
pub struct SystemClock {
    start: Option<Instant>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn elapsed(&mut self) -> f32 {
        self.start.get_or_insert_with(Instant::now).elapsed().as_secs_f32()
    }
}

/// Clock advanced explicitly by the caller. Used for headless runs and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ManualClock {
    now: f32,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, seconds: f32) {
        self.now = seconds;
    }

    pub fn advance(&mut self, seconds: f32) {
        self.now += seconds;
    }
}

impl Clock for ManualClock {
    fn elapsed(&mut self) -> f32 {
        self.now
    }
}
