//! Interaction signals posted by the gesture/UI side and read by the frame.
//!
//! [`InteractionSignal`] is the only state shared between the gesture
//! producer and the render tick. The coordinator owns it and lends it to each
//! side in turn, so no locking is involved. Fields come in two flavours:
//!
//! - latest-value-wins: rotation velocity, zoom velocity, target mode. The
//!   producer overwrites them every gesture tick; readers never clear them.
//! - one-shot: the focus trigger. The producer only ever sets it; the frame
//!   reads and clears it in one step via [`InteractionSignal::take_focus_trigger`].

use std::time::Duration;

use crate::transition::Mode;

/// Intents from the gesture/UI producer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionSignal {
    rotation_velocity: f32,
    zoom_velocity: f32,
    target_mode: Option<Mode>,
    trigger_focus: bool,
}

impl InteractionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Producer side ==========

    /// Overwrite the continuous rotation and zoom velocities.
    pub fn post_motion(&mut self, rotation_velocity: f32, zoom_velocity: f32) {
        self.rotation_velocity = rotation_velocity;
        self.zoom_velocity = zoom_velocity;
    }

    /// Overwrite the currently classified mode (`None` = no opinion).
    pub fn post_mode(&mut self, mode: Option<Mode>) {
        self.target_mode = mode;
    }

    /// Raise the one-shot focus trigger. Raising it again before it is
    /// consumed has no further effect.
    pub fn fire_focus(&mut self) {
        self.trigger_focus = true;
    }

    /// Zero velocities and withdraw any mode opinion.
    ///
    /// A pending focus trigger is left alone; only the consumer clears it.
    pub fn neutral(&mut self) {
        self.post_motion(0.0, 0.0);
        self.post_mode(None);
    }

    // ========== Consumer side ==========

    #[inline]
    pub fn rotation_velocity(&self) -> f32 {
        self.rotation_velocity
    }

    #[inline]
    pub fn zoom_velocity(&self) -> f32 {
        self.zoom_velocity
    }

    #[inline]
    pub fn target_mode(&self) -> Option<Mode> {
        self.target_mode
    }

    /// Whether a focus trigger is pending, without consuming it.
    #[inline]
    pub fn focus_pending(&self) -> bool {
        self.trigger_focus
    }

    /// Read and clear the focus trigger.
    pub fn take_focus_trigger(&mut self) -> bool {
        std::mem::take(&mut self.trigger_focus)
    }
}

/// Debounces the gesture's target mode into committed mode changes.
///
/// Polls at a fixed interval and commits only a non-`None` value that
/// differs from the committed mode, so flicker between polls is never seen.
#[derive(Debug, Clone)]
pub struct ModeConfirmer {
    interval: Duration,
    since_poll: Duration,
}

impl ModeConfirmer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            since_poll: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Advance by `dt` and poll if an interval has elapsed.
    ///
    /// Returns the newly committed mode, if any. At most one commit happens
    /// per call, however many intervals `dt` spans.
    pub fn update(&mut self, dt: Duration, signal: &InteractionSignal, committed: &mut Mode) -> Option<Mode> {
        self.since_poll += dt;
        if self.since_poll < self.interval {
            return None;
        }
        self.since_poll = Duration::ZERO;

        match signal.target_mode() {
            Some(mode) if mode != *committed => {
                log::info!("gesture mode confirmed: {:?} -> {:?}", committed, mode);
                *committed = mode;
                Some(mode)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_focus_trigger_is_one_shot() {
        let mut signal = InteractionSignal::new();
        signal.fire_focus();
        assert!(signal.take_focus_trigger());
        assert!(!signal.take_focus_trigger());
    }

    #[test]
    fn test_double_fire_collapses() {
        let mut signal = InteractionSignal::new();
        signal.fire_focus();
        signal.fire_focus();
        assert!(signal.take_focus_trigger());
        assert!(!signal.take_focus_trigger());
    }

    #[test]
    fn test_trigger_survives_unrelated_reads_and_neutral() {
        let mut signal = InteractionSignal::new();
        signal.fire_focus();
        let _ = signal.rotation_velocity();
        signal.neutral();
        assert!(signal.focus_pending());
        assert!(signal.take_focus_trigger());
    }

    #[test]
    fn test_velocities_persist_until_overwritten() {
        let mut signal = InteractionSignal::new();
        signal.post_motion(1.5, -2.0);
        assert_eq!(signal.rotation_velocity(), 1.5);
        assert_eq!(signal.rotation_velocity(), 1.5);
        signal.post_motion(0.0, 0.0);
        assert_eq!(signal.zoom_velocity(), 0.0);
    }

    #[test]
    fn test_confirmer_waits_for_interval() {
        let mut confirmer = ModeConfirmer::new(100 * MS);
        let mut signal = InteractionSignal::new();
        let mut committed = Mode::Formed;
        signal.post_mode(Some(Mode::Chaos));

        assert_eq!(confirmer.update(60 * MS, &signal, &mut committed), None);
        assert_eq!(committed, Mode::Formed);
        assert_eq!(confirmer.update(40 * MS, &signal, &mut committed), Some(Mode::Chaos));
        assert_eq!(committed, Mode::Chaos);
    }

    #[test]
    fn test_confirmer_ignores_none_and_same() {
        let mut confirmer = ModeConfirmer::new(100 * MS);
        let mut signal = InteractionSignal::new();
        let mut committed = Mode::Formed;

        assert_eq!(confirmer.update(100 * MS, &signal, &mut committed), None);
        signal.post_mode(Some(Mode::Formed));
        assert_eq!(confirmer.update(100 * MS, &signal, &mut committed), None);
        assert_eq!(committed, Mode::Formed);
    }

    #[test]
    fn test_flicker_between_polls_is_invisible() {
        let mut confirmer = ModeConfirmer::new(100 * MS);
        let mut signal = InteractionSignal::new();
        let mut committed = Mode::Formed;
        let mut commits = 0;

        // Alternate every 10ms; only the value seen at each poll matters.
        for i in 0..100 {
            let mode = if i % 2 == 0 { Mode::Chaos } else { Mode::Formed };
            signal.post_mode(Some(mode));
            if confirmer.update(10 * MS, &signal, &mut committed).is_some() {
                commits += 1;
            }
        }
        // 1000ms of ticks -> 10 polls -> at most 10 commits.
        assert!(commits <= 10);
    }

    #[test]
    fn test_one_commit_per_update_even_with_long_dt() {
        let mut confirmer = ModeConfirmer::new(100 * MS);
        let mut signal = InteractionSignal::new();
        let mut committed = Mode::Formed;
        signal.post_mode(Some(Mode::Chaos));
        assert_eq!(confirmer.update(1000 * MS, &signal, &mut committed), Some(Mode::Chaos));
        assert_eq!(confirmer.update(0 * MS, &signal, &mut committed), None);
    }
}
