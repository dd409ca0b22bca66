//! Time management utilities

use std::time::Instant;

/// Frame timer producing tick deltas in milliseconds
pub struct Timer {
    last_frame: Instant,
    delta_ms: f32,
    total_ms: f64,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_ms: 0.0,
            total_ms: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_ms = now.duration_since(self.last_frame).as_secs_f32() * 1000.0;
        self.total_ms += f64::from(self.delta_ms);
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Time between the two most recent `update` calls, in milliseconds
    pub fn delta_ms(&self) -> f32 {
        self.delta_ms
    }

    /// Total elapsed time since timer creation, in milliseconds
    pub fn total_ms(&self) -> f64 {
        self.total_ms
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_counts_frames() {
        let mut timer = Timer::new();
        timer.update();
        timer.update();
        assert_eq!(timer.frame_count(), 2);
        assert!(timer.delta_ms() >= 0.0);
        assert!(timer.total_ms() >= f64::from(timer.delta_ms()));
    }
}
