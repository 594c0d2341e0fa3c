//! Hand-gesture input.
//!
//! A [`HandTracker`] runs on its own thread inside a [`GestureSource`]. Each
//! frame, the render loop calls [`GesturePipeline::pump`], which drains every
//! frame the tracker produced since last time through the [`GestureDeriver`]
//! into the [`InteractionSignal`]. If the camera can't be opened, or the
//! tracker fails later, the pipeline drops to [`GestureStatus::Degraded`],
//! neutralizes the signal and the scene carries on under UI control.
//!
//! ```ignore
//! let mut gestures = GesturePipeline::start(ScriptedTracker::demo(), config.gesture);
//! // every frame
//! gestures.pump(scene.signal_mut());
//! ```

pub mod derive;
pub mod hand;
pub mod source;

pub use derive::{GestureDeriver, GestureReading};
pub use hand::{Hand, HandFrame};
pub use source::{GestureSource, HandTracker, NoCamera, ScriptStep, ScriptedTracker};

use crate::config::GestureConfig;
use crate::error::GestureError;
use crate::signal::InteractionSignal;

/// Whether gestures are currently driving the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureStatus {
    Active,
    /// Gestures are off; the reason is shown to the user.
    Degraded(String),
}

impl GestureStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, GestureStatus::Active)
    }
}

/// Tracker thread plus deriver, owned by the render loop.
pub struct GesturePipeline {
    source: Option<GestureSource>,
    deriver: GestureDeriver,
    status: GestureStatus,
}

impl GesturePipeline {
    /// Start gestures from a tracker, or from the error opening one produced.
    pub fn start<T: HandTracker + 'static>(
        tracker: Result<T, GestureError>,
        config: GestureConfig,
    ) -> Self {
        let deriver = GestureDeriver::new(config);
        match tracker.and_then(GestureSource::spawn) {
            Ok(source) => {
                log::info!("gesture input active");
                Self {
                    source: Some(source),
                    deriver,
                    status: GestureStatus::Active,
                }
            }
            Err(e) => {
                log::warn!("gesture input unavailable: {e}");
                Self {
                    source: None,
                    deriver,
                    status: GestureStatus::Degraded(e.to_string()),
                }
            }
        }
    }

    /// A pipeline that never produces gestures.
    pub fn disabled(reason: impl Into<String>, config: GestureConfig) -> Self {
        Self {
            source: None,
            deriver: GestureDeriver::new(config),
            status: GestureStatus::Degraded(reason.into()),
        }
    }

    pub fn status(&self) -> &GestureStatus {
        &self.status
    }

    /// Post every pending tracker frame to `signal`. Never blocks.
    ///
    /// Returns the number of frames consumed.
    pub fn pump(&mut self, signal: &mut InteractionSignal) -> usize {
        let Some(source) = self.source.as_mut() else {
            return 0;
        };

        let mut consumed = 0;
        loop {
            match source.try_next() {
                Ok(Some(frame)) => {
                    self.deriver.apply(&frame, signal);
                    consumed += 1;
                }
                Ok(None) => break,
                Err(e) => {
                    self.degrade(e, signal);
                    break;
                }
            }
        }
        consumed
    }

    /// Stop the tracker thread and release the camera.
    pub fn shutdown(&mut self) {
        if self.source.take().is_some() {
            self.status = GestureStatus::Degraded("stopped".into());
        }
    }

    fn degrade(&mut self, error: GestureError, signal: &mut InteractionSignal) {
        log::warn!("gesture input lost: {error}");
        signal.neutral();
        self.source = None;
        self.status = GestureStatus::Degraded(error.to_string());
    }
}
