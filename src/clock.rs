//! Frame timing.
//!
//! [`FrameClock`] is the single source of `time` (seconds since start, drives
//! every oscillator) and `dt` (seconds since the previous frame, drives every
//! damped value). Delta is clamped so a stalled frame, such as a window drag
//! or a debugger pause, does not teleport the transition.

use std::time::{Duration, Instant};

/// Upper bound on a single frame's delta.
pub const MAX_DELTA: f32 = 0.1;

/// Elapsed/delta tracking for the render loop.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
    pause_elapsed: Duration,
    /// Fixed delta for deterministic stepping.
    fixed_delta: Option<f32>,
}

impl FrameClock {
    /// Create a clock starting now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
            pause_elapsed: Duration::ZERO,
            fixed_delta: None,
        }
    }

    /// Advance to the current instant. Call once per frame.
    ///
    /// Returns `(elapsed, delta)` in seconds.
    pub fn tick(&mut self) -> (f32, f32) {
        self.tick_at(Instant::now())
    }

    /// Advance to `now`.
    pub fn tick_at(&mut self, now: Instant) -> (f32, f32) {
        if self.paused {
            self.delta_secs = 0.0;
            return (self.elapsed_secs, self.delta_secs);
        }

        let raw_delta = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.delta_secs = match self.fixed_delta {
            Some(fixed) => fixed,
            None => raw_delta.min(MAX_DELTA),
        };
        self.last_frame = now;

        self.elapsed_secs = match self.fixed_delta {
            Some(fixed) => self.elapsed_secs + fixed,
            None => now
                .saturating_duration_since(self.start)
                .saturating_sub(self.pause_elapsed)
                .as_secs_f32(),
        };

        self.frame_count += 1;

        let fps_elapsed = now.saturating_duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            let now = Instant::now();
            self.pause_elapsed += now.saturating_duration_since(self.last_frame);
            self.last_frame = now;
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Step by a fixed amount every tick instead of wall-clock time.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert!(!clock.is_paused());
        assert_eq!(clock.delta(), 0.0);
    }

    #[test]
    fn test_tick_advances() {
        let mut clock = FrameClock::new();
        let later = clock.start + Duration::from_millis(16);
        let (elapsed, delta) = clock.tick_at(later);
        assert!(elapsed > 0.0);
        assert!((delta - 0.016).abs() < 1e-4);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_stalled_frame_clamped() {
        let mut clock = FrameClock::new();
        let later = clock.start + Duration::from_secs(3);
        let (_, delta) = clock.tick_at(later);
        assert_eq!(delta, MAX_DELTA);
    }

    #[test]
    fn test_pause_freezes() {
        let mut clock = FrameClock::new();
        clock.tick_at(clock.start + Duration::from_millis(10));
        clock.pause();
        let elapsed = clock.elapsed();
        clock.tick_at(clock.start + Duration::from_millis(50));
        assert_eq!(clock.elapsed(), elapsed);
        assert_eq!(clock.delta(), 0.0);
    }

    #[test]
    fn test_toggle_pause_round_trip() {
        let mut clock = FrameClock::new();
        clock.toggle_pause();
        assert!(clock.is_paused());
        clock.toggle_pause();
        assert!(!clock.is_paused());
        let (_, delta) = clock.tick_at(Instant::now() + Duration::from_millis(5));
        assert!(delta > 0.0);
    }

    #[test]
    fn test_fps_refreshes_after_interval() {
        let mut clock = FrameClock::new();
        for i in 1..=30 {
            clock.tick_at(clock.start + Duration::from_millis(20 * i));
        }
        assert_eq!(clock.frame(), 30);
        assert!((clock.fps() - 50.0).abs() < 1.0, "fps {}", clock.fps());
    }

    #[test]
    fn test_fixed_delta() {
        let mut clock = FrameClock::new();
        clock.set_fixed_delta(Some(0.1));
        for _ in 0..5 {
            clock.tick_at(clock.start + Duration::from_secs(10));
        }
        assert!((clock.delta() - 0.1).abs() < 1e-6);
        assert!((clock.elapsed() - 0.5).abs() < 1e-5);
    }
}
