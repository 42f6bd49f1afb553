use std::time::{Duration, Instant};

/// Counts ticks and reports a rate roughly once per second.
pub struct FpsTracker {
    window_start: Instant,
    ticks: u32,
    window: Duration,
}

impl Default for FpsTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsTracker {
    pub fn new() -> Self {
        Self {
            window_start: Instant::now(),
            ticks: 0,
            window: Duration::from_secs(1),
        }
    }

    /// Record one frame. Returns the measured rate when a full window has
    /// elapsed, `None` otherwise.
    pub fn tick(&mut self) -> Option<f64> {
        self.ticks += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed < self.window {
            return None;
        }

        let fps = self.ticks as f64 / elapsed.as_secs_f64();
        self.ticks = 0;
        self.window_start = Instant::now();
        Some(fps)
    }
}
