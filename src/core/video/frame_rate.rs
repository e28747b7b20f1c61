//=========================================================================
// Frame Rate Counter
//=========================================================================
//
// Counts presented frames and recomputes frames-per-second whenever the
// sampling window elapses. With the default 0.25 s window the reported
// rate is `frames × 4`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{Duration, Instant};

//=== FrameRateCounter ====================================================

#[derive(Debug, Clone)]
pub struct FrameRateCounter {
    window: Duration,
    frame_count: u32,
    window_start: Instant,
    frame_rate: u32,
}

impl FrameRateCounter {
    pub fn new(window: Duration) -> Self {
        Self::starting_at(window, Instant::now())
    }

    pub fn starting_at(window: Duration, start: Instant) -> Self {
        Self {
            window,
            frame_count: 0,
            window_start: start,
            frame_rate: 0,
        }
    }

    /// Counts one frame at the current time.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Counts one frame at `now`.
    pub fn tick_at(&mut self, now: Instant) {
        self.frame_count += 1;

        if now.duration_since(self.window_start) >= self.window {
            let per_second = 1.0 / self.window.as_secs_f64();
            self.frame_rate = (f64::from(self.frame_count) * per_second).round() as u32;
            self.frame_count = 0;
            self.window_start = now;
        }
    }

    /// Rate from the last completed window; 0 until one completes.
    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Restarts the current window without touching the last reported rate.
    pub fn reset(&mut self, now: Instant) {
        self.frame_count = 0;
        self.window_start = now;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_second_window_reports_frames_times_four() {
        let start = Instant::now();
        let mut counter = FrameRateCounter::starting_at(Duration::from_millis(250), start);

        for i in 1..15 {
            counter.tick_at(start + Duration::from_millis(i * 16));
        }
        assert_eq!(counter.frame_rate(), 0);

        counter.tick_at(start + Duration::from_millis(250));
        assert_eq!(counter.frame_rate(), 60);
    }

    #[test]
    fn rate_holds_until_next_window_closes() {
        let start = Instant::now();
        let mut counter = FrameRateCounter::starting_at(Duration::from_millis(250), start);
        counter.tick_at(start + Duration::from_millis(300));
        assert_eq!(counter.frame_rate(), 4);

        counter.tick_at(start + Duration::from_millis(310));
        assert_eq!(counter.frame_rate(), 4);
    }
}
