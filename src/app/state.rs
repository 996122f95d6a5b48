// SPDX-License-Identifier: GPL-3.0-only

//! Kiosk application state

use crate::app::scan_session::{ScanHint, ScanSession};
use crate::app::screens::{AnalyzeStage, ConsentForm, Screen, StepIcons};
use crate::backends::camera::CameraBackend;
use crate::config::Config;
use crate::pipelines::photo::{AnalysisSink, CapturePipeline, CapturedStill};
use crate::sync::SyncChannel;
use std::time::Instant;

/// Kiosk inputs other than detector results
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Go to a screen (consent gating still applies)
    Navigate(Screen),
    /// Tick or untick a consent item
    SetConsent { index: usize, checked: bool },
    /// Capture button pressed
    ManualCapture,
    /// Kiosk window regained focus
    WindowFocused,
    /// Restart button on the analyze or result screen
    Restart,
    /// Periodic timer for the analyze stage
    Tick(Instant),
}

/// Visitor-facing kiosk
///
/// Owns the screen flow, the current scan session, the captured still and
/// the sending end of the projection link.
pub struct KioskApp {
    pub(super) config: Config,
    pub(super) screen: Screen,
    pub(super) consent: ConsentForm,
    pub(super) icons: StepIcons,
    pub(super) camera: Option<Box<dyn CameraBackend>>,
    pub(super) session: Option<ScanSession>,
    pub(super) capture: CapturePipeline,
    pub(super) still: Option<CapturedStill>,
    pub(super) sync: SyncChannel,
    pub(super) analyze: Option<AnalyzeStage>,
    pub(super) sink: Box<dyn AnalysisSink>,
}

impl std::fmt::Debug for KioskApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KioskApp")
            .field("screen", &self.screen)
            .field("session", &self.session.as_ref().map(ScanSession::id))
            .field("has_still", &self.still.is_some())
            .field("sync", &self.sync)
            .finish()
    }
}

impl KioskApp {
    pub fn new(config: Config, sink: Box<dyn AnalysisSink>) -> Self {
        let capture = CapturePipeline::new(
            config.scan.snapshot_width,
            config.scan.snapshot_height,
        );
        Self {
            config,
            screen: Screen::Start,
            consent: ConsentForm::default(),
            icons: StepIcons::default(),
            camera: None,
            session: None,
            capture,
            still: None,
            sync: SyncChannel::new(),
            analyze: None,
            sink,
        }
    }

    /// Use `camera` for the scan screen
    pub fn attach_camera(&mut self, camera: Box<dyn CameraBackend>) {
        self.camera = Some(camera);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn consent(&self) -> &ConsentForm {
        &self.consent
    }

    pub fn session(&self) -> Option<&ScanSession> {
        self.session.as_ref()
    }

    /// Hint under the camera preview, while scanning
    pub fn hint(&self) -> Option<ScanHint> {
        self.session.as_ref().map(ScanSession::hint)
    }

    /// Whether the capture button is enabled
    pub fn capture_enabled(&self) -> bool {
        self.screen == Screen::Scan && self.session.as_ref().is_some_and(|s| s.capture_enabled())
    }

    pub fn captured_still(&self) -> Option<&CapturedStill> {
        self.still.as_ref()
    }

    pub fn sync(&self) -> &SyncChannel {
        &self.sync
    }

    /// Step icon opacities for the current screen
    pub fn step_icons(&self) -> Vec<(Screen, f32)> {
        self.icons.weights(self.screen)
    }

    /// Analyze animation progress, while on the analyze screen
    pub fn analyze_progress(&self, now: Instant) -> Option<f32> {
        self.analyze.map(|stage| stage.progress(now))
    }
}
