//! The asynchronous landmark producer.
//!
//! Camera capture and hand inference block, so they run on their own thread
//! behind a [`HandTracker`]. Frames come back over a channel that the render
//! loop drains without ever waiting. Dropping the [`GestureSource`] stops the
//! loop and lets the tracker release its camera. A tracker stuck inside
//! capture is detached after [`TEARDOWN_TIMEOUT`] so exit never waits on it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use glam::Vec2;

use crate::error::GestureError;
use crate::gesture::hand::{Hand, HandFrame};

/// A blocking camera + landmark inference backend.
pub trait HandTracker: Send {
    /// Capture and analyse the next frame.
    ///
    /// `Ok(None)` ends the stream. A frame with no hands is a normal result,
    /// not an error.
    fn next_frame(&mut self) -> Result<Option<HandFrame>, GestureError>;

    /// Release the camera and inference resources.
    fn shutdown(&mut self) -> Result<(), GestureError> {
        Ok(())
    }
}

type Message = Result<HandFrame, GestureError>;

/// How long dropping a [`GestureSource`] waits for the tracker to finish.
pub const TEARDOWN_TIMEOUT: Duration = Duration::from_millis(250);

/// Runs a [`HandTracker`] on a background thread.
pub struct GestureSource {
    rx: Receiver<Message>,
    stop: Arc<AtomicBool>,
    done: Receiver<Result<(), GestureError>>,
    handle: Option<JoinHandle<()>>,
}

impl GestureSource {
    /// Start `tracker` on a thread named `gesture`.
    pub fn spawn<T: HandTracker + 'static>(mut tracker: T) -> Result<Self, GestureError> {
        let (tx, rx) = mpsc::channel::<Message>();
        let (done_tx, done) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let handle = thread::Builder::new().name("gesture".into()).spawn(move || {
            while !thread_stop.load(Ordering::Acquire) {
                match tracker.next_frame() {
                    Ok(Some(frame)) => {
                        if tx.send(Ok(frame)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        break;
                    }
                }
            }
            let _ = done_tx.send(tracker.shutdown());
        })?;

        Ok(Self {
            rx,
            stop,
            done,
            handle: Some(handle),
        })
    }

    /// Next pending frame, if any. Never blocks.
    pub fn try_next(&mut self) -> Result<Option<HandFrame>, GestureError> {
        match self.rx.try_recv() {
            Ok(Ok(frame)) => Ok(Some(frame)),
            Ok(Err(e)) => Err(e),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(GestureError::Disconnected),
        }
    }
}

impl Drop for GestureSource {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        let Some(handle) = self.handle.take() else {
            return;
        };
        match self.done.recv_timeout(TEARDOWN_TIMEOUT) {
            Ok(Ok(())) => log::debug!("gesture thread stopped"),
            Ok(Err(e)) => log::warn!("gesture teardown: {e}"),
            Err(RecvTimeoutError::Timeout) => {
                // Still inside the tracker; leave it detached.
                log::warn!("gesture thread did not stop within {TEARDOWN_TIMEOUT:?}, detaching");
                return;
            }
            Err(RecvTimeoutError::Disconnected) => log::warn!("gesture thread panicked during teardown"),
        }
        let _ = handle.join();
    }
}

/// Tracker used when no capture backend is available.
#[derive(Debug, Default)]
pub struct NoCamera;

impl NoCamera {
    /// Always fails: there is no camera to open.
    pub fn open() -> Result<Self, GestureError> {
        Err(GestureError::CameraUnavailable("no capture backend compiled in".into()))
    }
}

impl HandTracker for NoCamera {
    fn next_frame(&mut self) -> Result<Option<HandFrame>, GestureError> {
        Err(GestureError::CameraUnavailable("no capture backend compiled in".into()))
    }
}

/// One step of a scripted performance: hold `hand` (or no hand) for `hold`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptStep {
    pub hold: Duration,
    pub hand: Option<Hand>,
}

impl ScriptStep {
    pub fn new(hold_ms: u64, hand: Option<Hand>) -> Self {
        Self {
            hold: Duration::from_millis(hold_ms),
            hand,
        }
    }
}

/// Replays a looping sequence of hand poses at a fixed frame interval.
#[derive(Debug, Clone)]
pub struct ScriptedTracker {
    steps: Vec<ScriptStep>,
    frame_interval: Duration,
    looping: bool,
    started: Option<Instant>,
    /// Synthetic clock, advanced by `frame_interval` per frame.
    clock: Duration,
}

impl ScriptedTracker {
    pub fn new(steps: Vec<ScriptStep>, frame_interval: Duration, looping: bool) -> Self {
        Self {
            steps,
            frame_interval,
            looping,
            started: None,
            clock: Duration::ZERO,
        }
    }

    /// A thirty-ish second show: form, scatter, spin, zoom and a double pinch.
    pub fn demo() -> Self {
        let center = Vec2::new(0.5, 0.5);
        let fist = |wrist| Some(Hand::synthetic(wrist, 0.1, false));
        let open = |wrist| Some(Hand::synthetic(wrist, 0.35, false));
        let relaxed = |pinched| Some(Hand::synthetic(center, 0.24, pinched));

        let steps = vec![
            ScriptStep::new(1500, None),
            ScriptStep::new(4000, fist(center)),
            ScriptStep::new(4000, open(center)),
            ScriptStep::new(3000, fist(Vec2::new(0.2, 0.5))),
            ScriptStep::new(2000, fist(Vec2::new(0.5, 0.2))),
            ScriptStep::new(2000, fist(Vec2::new(0.5, 0.8))),
            ScriptStep::new(150, relaxed(true)),
            ScriptStep::new(150, relaxed(false)),
            ScriptStep::new(150, relaxed(true)),
            ScriptStep::new(5000, relaxed(false)),
            ScriptStep::new(150, relaxed(true)),
            ScriptStep::new(150, relaxed(false)),
            ScriptStep::new(150, relaxed(true)),
            ScriptStep::new(2000, None),
        ];
        Self::new(steps, Duration::from_millis(33), true)
    }

    fn total(&self) -> Duration {
        self.steps.iter().map(|s| s.hold).sum()
    }

    /// The pose active at script time `t`, or `None` past the end of a
    /// non-looping script.
    fn pose_at(&self, t: Duration) -> Option<Option<Hand>> {
        let total = self.total();
        if total.is_zero() {
            return None;
        }
        let t = if self.looping {
            Duration::from_nanos((t.as_nanos() % total.as_nanos()) as u64)
        } else if t >= total {
            return None;
        } else {
            t
        };

        let mut acc = Duration::ZERO;
        for step in &self.steps {
            acc += step.hold;
            if t < acc {
                return Some(step.hand);
            }
        }
        None
    }
}

impl HandTracker for ScriptedTracker {
    fn next_frame(&mut self) -> Result<Option<HandFrame>, GestureError> {
        let started = *self.started.get_or_insert_with(Instant::now);
        if !self.frame_interval.is_zero() {
            // Pace to wall clock like a real camera would.
            let due = started + self.clock;
            let now = Instant::now();
            if due > now {
                thread::sleep(due - now);
            }
        }

        let timestamp = self.clock;
        self.clock += self.frame_interval;
        Ok(self
            .pose_at(timestamp)
            .map(|hand| HandFrame::new(timestamp, hand.into_iter().collect())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(source: &mut GestureSource, want: usize) -> Vec<Message> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut out = Vec::new();
        while out.len() < want && Instant::now() < deadline {
            match source.try_next() {
                Ok(Some(frame)) => out.push(Ok(frame)),
                Ok(None) => thread::sleep(Duration::from_millis(1)),
                Err(e) => {
                    out.push(Err(e));
                    break;
                }
            }
        }
        out
    }

    #[test]
    fn test_scripted_tracker_timeline() {
        let hand = Hand::synthetic(Vec2::splat(0.5), 0.2, false);
        let mut tracker = ScriptedTracker::new(
            vec![ScriptStep::new(100, None), ScriptStep::new(100, Some(hand))],
            Duration::from_millis(60),
            false,
        );
        tracker.started = Some(Instant::now() - Duration::from_secs(1));
        let stamps_and_hands: Vec<_> = std::iter::from_fn(|| tracker.next_frame().unwrap())
            .map(|f| (f.timestamp.as_millis(), f.hands.len()))
            .collect();
        assert_eq!(stamps_and_hands, vec![(0, 0), (60, 0), (120, 1), (180, 1)]);
    }

    #[test]
    fn test_non_looping_script_ends() {
        let mut tracker = ScriptedTracker::new(vec![ScriptStep::new(50, None)], Duration::from_millis(20), false);
        tracker.started = Some(Instant::now() - Duration::from_secs(1));
        let mut frames = 0;
        while tracker.next_frame().unwrap().is_some() {
            frames += 1;
        }
        // Timestamps 0, 20, 40 fall inside the 50ms script.
        assert_eq!(frames, 3);
    }

    #[test]
    fn test_looping_script_wraps() {
        let hand = Hand::synthetic(Vec2::splat(0.5), 0.2, false);
        let tracker = ScriptedTracker::new(
            vec![ScriptStep::new(100, None), ScriptStep::new(100, Some(hand))],
            Duration::from_millis(10),
            true,
        );
        assert_eq!(tracker.pose_at(Duration::from_millis(150)), Some(Some(hand)));
        assert_eq!(tracker.pose_at(Duration::from_millis(250)), Some(None));
    }

    #[test]
    fn test_source_delivers_then_disconnects() {
        let tracker = ScriptedTracker::new(vec![ScriptStep::new(30, None)], Duration::from_millis(10), false);
        let mut source = GestureSource::spawn(tracker).unwrap();
        let messages = drain(&mut source, 4);
        let frames = messages.iter().filter(|m| m.is_ok()).count();
        assert_eq!(frames, 3);
        assert!(matches!(messages.last(), Some(Err(GestureError::Disconnected))));
    }

    #[test]
    fn test_source_forwards_tracker_error() {
        let mut source = GestureSource::spawn(NoCamera).unwrap();
        let messages = drain(&mut source, 1);
        assert!(matches!(messages.first(), Some(Err(GestureError::CameraUnavailable(_)))));
    }

    #[test]
    fn test_drop_stops_looping_tracker() {
        let source = GestureSource::spawn(ScriptedTracker::demo()).unwrap();
        let started = Instant::now();
        drop(source);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    /// Blocks inside capture far longer than any exit should wait.
    struct StuckTracker;

    impl HandTracker for StuckTracker {
        fn next_frame(&mut self) -> Result<Option<HandFrame>, GestureError> {
            thread::sleep(Duration::from_secs(3));
            Ok(None)
        }
    }

    #[test]
    fn test_drop_detaches_stuck_tracker() {
        let source = GestureSource::spawn(StuckTracker).unwrap();
        thread::sleep(Duration::from_millis(50));
        let started = Instant::now();
        drop(source);
        assert!(started.elapsed() < Duration::from_millis(1000));
    }

    #[test]
    fn test_no_camera_fails_to_open() {
        assert!(matches!(NoCamera::open(), Err(GestureError::CameraUnavailable(_))));
    }
}
