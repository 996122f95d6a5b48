// SPDX-License-Identifier: GPL-3.0-only

//! Kiosk message handling
//!
//! Screen enter/exit hooks, the per-frame pipeline and capture. Nothing in
//! here fails outward: camera and capture errors end up as hints, log lines
//! or no-ops.

use super::state::{KioskApp, Message};
use crate::app::frame_processor::{FrameTicket, LandmarkSet};
use crate::app::scan_session::{FrameOutcome, ScanSession};
use crate::app::screens::{AnalyzeStage, Screen};
use crate::backends::camera::CameraFrame;
use crate::errors::{CameraError, CaptureError};
use crate::pipelines::photo::CaptureTrigger;
use crate::sync::{SyncMessage, SyncSender};
use std::time::Instant;
use tracing::{debug, info, warn};

impl KioskApp {
    pub fn update(&mut self, message: Message) {
        match message {
            Message::Navigate(screen) => self.navigate(screen),
            Message::SetConsent { index, checked } => self.consent.set(index, checked),
            Message::ManualCapture => {
                self.manual_capture();
            }
            Message::WindowFocused => self.sync.on_focus(),
            Message::Restart => self.restart(),
            Message::Tick(now) => self.tick(now),
        }
    }

    /// Attach (or re-attach) the projection; it is blanked straight away
    pub fn attach_projection(&mut self, link: SyncSender) {
        self.sync.acquire(link);
    }

    /// Switch screens, running exit and enter hooks
    pub fn navigate(&mut self, next: Screen) {
        if next == self.screen {
            return;
        }
        if next == Screen::Scan && !self.consent.all_checked() {
            debug!("Consent incomplete, staying on {}", self.screen);
            return;
        }

        info!(from = %self.screen, to = %next, "Screen change");
        self.exit_screen(self.screen);
        self.screen = next;
        self.enter_screen(next);
    }

    fn exit_screen(&mut self, screen: Screen) {
        match screen {
            Screen::Scan => {
                if let Some(mut session) = self.session.take() {
                    session.end();
                }
                if let Some(camera) = self.camera.as_mut()
                    && !camera.try_stop()
                {
                    debug!("Camera keeps running, late frames are ignored");
                }
            }
            Screen::Analyze => self.analyze = None,
            Screen::Start | Screen::Consent | Screen::Result => {}
        }
    }

    fn enter_screen(&mut self, screen: Screen) {
        match screen {
            Screen::Start => {
                self.still = None;
                self.consent.reset();
                self.sync.post(SyncMessage::Clear);
            }
            Screen::Consent => {}
            Screen::Scan => self.start_scan(),
            Screen::Analyze => {
                if self.still.is_none() {
                    warn!("Nothing captured to analyze, back to start");
                    self.navigate(Screen::Start);
                    return;
                }
                self.analyze = Some(AnalyzeStage::new(
                    Instant::now(),
                    self.config.analyze_duration(),
                ));
            }
            Screen::Result => {
                if let Some(still) = self.still.as_ref() {
                    self.sink.analyze(still);
                    self.sync.post(SyncMessage::ShowResultFrame {
                        image: still.image.clone(),
                        landmarks: Some(still.landmarks.clone()),
                    });
                }
            }
        }
    }

    fn start_scan(&mut self) {
        let mut session = ScanSession::new(&self.config.scan);

        let started = match self.camera.as_mut() {
            None => Err(CameraError::Unavailable("no camera attached".to_string())),
            Some(camera) if camera.is_running() => Ok(()),
            Some(camera) => camera.start().map_err(CameraError::from),
        };
        if let Err(e) = started {
            session.report_camera_error(&e);
        }

        self.session = Some(session);
    }

    /// Pull the next camera frame and admit it for detection
    ///
    /// `None` when not scanning, no frame is ready, or the detector is still
    /// busy with the previous frame (that frame is skipped).
    pub fn next_frame(&mut self) -> Option<(FrameTicket, CameraFrame)> {
        if self.screen != Screen::Scan {
            return None;
        }
        let frame = self.camera.as_mut()?.poll_frame()?;
        let ticket = self.session.as_mut()?.submit_frame()?;
        Some((ticket, frame))
    }

    /// Hand a detector result back to the kiosk
    pub fn on_face_results(
        &mut self,
        ticket: FrameTicket,
        detection: Option<LandmarkSet>,
        now: Instant,
    ) -> FrameOutcome {
        let Some(session) = self.session.as_mut() else {
            return FrameOutcome::Ignored;
        };

        let outcome = session.on_face_results(ticket, detection, now);
        match &outcome {
            FrameOutcome::Tracking { landmarks, .. } => {
                self.sync.post(SyncMessage::UpdateFace {
                    landmarks: landmarks.clone(),
                });
            }
            FrameOutcome::Locked { landmarks } => {
                if let Err(e) = self.capture_still(landmarks, CaptureTrigger::Automatic) {
                    warn!(error = %e, "Automatic capture failed");
                    if let Some(session) = self.session.as_mut() {
                        session.capture_failed();
                    }
                }
            }
            FrameOutcome::Ignored | FrameOutcome::NoFace => {}
        }
        outcome
    }

    /// Capture button; a no-op unless the last verdict was aligned
    pub fn manual_capture(&mut self) -> bool {
        if self.screen != Screen::Scan {
            return false;
        }
        let Some(landmarks) = self
            .session
            .as_ref()
            .and_then(|s| s.capture_landmarks())
            .cloned()
        else {
            debug!("Capture pressed while disabled");
            return false;
        };

        match self.capture_still(&landmarks, CaptureTrigger::Manual) {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "Manual capture did nothing");
                false
            }
        }
    }

    fn capture_still(
        &mut self,
        landmarks: &LandmarkSet,
        trigger: CaptureTrigger,
    ) -> Result<(), CaptureError> {
        let frame = self.camera.as_ref().and_then(|c| c.current_frame());
        let still = self.capture.capture(frame, landmarks, trigger)?;

        self.sync.post(SyncMessage::ShowResultFrame {
            image: still.image.clone(),
            landmarks: Some(still.landmarks.clone()),
        });
        self.still = Some(still);
        self.navigate(Screen::Analyze);
        Ok(())
    }

    /// Advance the analyze stage once its time is up
    pub fn tick(&mut self, now: Instant) {
        if self.screen == Screen::Analyze
            && self.analyze.is_some_and(|stage| stage.is_complete(now))
        {
            self.navigate(Screen::Result);
        }
    }

    /// Back to start; entering start drops the captured still
    pub fn restart(&mut self) {
        if !self.screen.can_restart() {
            debug!(screen = %self.screen, "Restart ignored");
            return;
        }
        self.navigate(Screen::Start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::frame_processor::{Landmark, StabilityPolicy};
    use crate::app::scan_session::ScanHint;
    use crate::backends::camera::SequenceCamera;
    use crate::config::Config;
    use crate::pipelines::photo::LoggingAnalysisSink;
    use crate::sync::{SyncReceiver, projection_link};
    use std::time::Duration;

    fn aligned_face() -> LandmarkSet {
        let cx = 401.5 / 805.0;
        let cy = 310.5 / 672.0;
        LandmarkSet::new(vec![
            Landmark::new(cx - 80.0 / 805.0, cy - 100.0 / 672.0),
            Landmark::new(cx + 80.0 / 805.0, cy + 100.0 / 672.0),
        ])
    }

    fn kiosk(frames: u32) -> (KioskApp, SyncReceiver) {
        let mut config = Config::default();
        config.scan.stability = StabilityPolicy::Frames(frames);
        config.scan.snapshot_width = 16;
        config.scan.snapshot_height = 12;

        let mut app = KioskApp::new(config, Box::new(LoggingAnalysisSink::default()));
        app.attach_camera(Box::new(SequenceCamera::from_frames(vec![
            CameraFrame::solid(8, 6, [10, 20, 30, 255]),
        ])));
        let (tx, rx) = projection_link();
        app.attach_projection(tx);
        (app, rx)
    }

    fn to_scan(app: &mut KioskApp) {
        app.navigate(Screen::Consent);
        for index in 0..3 {
            app.update(Message::SetConsent {
                index,
                checked: true,
            });
        }
        app.navigate(Screen::Scan);
    }

    fn drain(rx: &mut SyncReceiver) -> Vec<&'static str> {
        let mut kinds = Vec::new();
        while let Ok(Some(message)) = rx.try_next() {
            kinds.push(message.kind());
        }
        kinds
    }

    fn feed(app: &mut KioskApp, detection: Option<LandmarkSet>) -> FrameOutcome {
        let (ticket, _frame) = app.next_frame().unwrap();
        app.on_face_results(ticket, detection, Instant::now())
    }

    #[test]
    fn test_scan_requires_consent() {
        let (mut app, _rx) = kiosk(100);
        app.navigate(Screen::Consent);
        app.update(Message::SetConsent {
            index: 0,
            checked: true,
        });
        app.navigate(Screen::Scan);
        assert_eq!(app.screen(), Screen::Consent);

        to_scan(&mut app);
        assert_eq!(app.screen(), Screen::Scan);
        assert!(app.session().is_some());
    }

    #[test]
    fn test_live_frames_send_face_updates() {
        let (mut app, mut rx) = kiosk(100);
        to_scan(&mut app);
        drain(&mut rx);

        feed(&mut app, Some(aligned_face()));
        feed(&mut app, None);
        assert_eq!(drain(&mut rx), ["UPDATE_FACE"]);
        assert!(!app.capture_enabled());
    }

    #[test]
    fn test_automatic_capture_flow() {
        let (mut app, mut rx) = kiosk(3);
        to_scan(&mut app);
        drain(&mut rx);

        feed(&mut app, Some(aligned_face()));
        feed(&mut app, Some(aligned_face()));
        let outcome = feed(&mut app, Some(aligned_face()));

        assert!(matches!(outcome, FrameOutcome::Locked { .. }));
        assert_eq!(app.screen(), Screen::Analyze);
        assert!(app.session().is_none());
        let still = app.captured_still().unwrap();
        assert_eq!(still.image.dimensions(), (16, 12));
        assert_eq!(still.landmarks, aligned_face());
        assert_eq!(drain(&mut rx), ["UPDATE_FACE", "UPDATE_FACE", "SHOW_RESULT_FRAME"]);
    }

    #[test]
    fn test_manual_capture_needs_aligned_face() {
        let (mut app, mut rx) = kiosk(100);
        to_scan(&mut app);
        assert!(!app.manual_capture());

        // Aligned then off-centre: the button is disabled again
        feed(&mut app, Some(aligned_face()));
        assert!(app.capture_enabled());
        let off_centre = LandmarkSet::new(vec![
            Landmark::new(0.01, 0.01),
            Landmark::new(0.2, 0.25),
        ]);
        feed(&mut app, Some(off_centre));
        assert!(!app.capture_enabled());
        assert!(!app.manual_capture());
        assert_eq!(app.screen(), Screen::Scan);

        feed(&mut app, Some(aligned_face()));
        assert!(app.capture_enabled());
        drain(&mut rx);
        app.update(Message::ManualCapture);
        assert_eq!(app.screen(), Screen::Analyze);
        assert_eq!(drain(&mut rx), ["SHOW_RESULT_FRAME"]);
        assert!(app.captured_still().is_some());
    }

    #[test]
    fn test_failed_automatic_capture_keeps_scanning() {
        let (mut app, mut rx) = kiosk(1);
        to_scan(&mut app);
        let (ticket, _frame) = app.next_frame().unwrap();

        // Fresh camera that never delivered a frame
        app.attach_camera(Box::new(SequenceCamera::from_frames(vec![])));
        drain(&mut rx);

        let outcome = app.on_face_results(ticket, Some(aligned_face()), Instant::now());
        assert!(matches!(outcome, FrameOutcome::Locked { .. }));
        assert_eq!(app.screen(), Screen::Scan);
        assert!(app.captured_still().is_none());
        assert_eq!(app.hint(), Some(ScanHint::Holding { seconds: 0 }));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_analyze_then_result_then_restart() {
        let (mut app, mut rx) = kiosk(1);
        to_scan(&mut app);
        feed(&mut app, Some(aligned_face()));
        assert_eq!(app.screen(), Screen::Analyze);
        drain(&mut rx);

        app.update(Message::Tick(Instant::now()));
        assert_eq!(app.screen(), Screen::Analyze);

        app.update(Message::Tick(Instant::now() + Duration::from_secs(6)));
        assert_eq!(app.screen(), Screen::Result);
        assert_eq!(drain(&mut rx), ["SHOW_RESULT_FRAME"]);

        app.update(Message::Restart);
        assert_eq!(app.screen(), Screen::Start);
        assert!(app.captured_still().is_none());
        assert!(!app.consent().all_checked());
        assert_eq!(drain(&mut rx), ["CLEAR"]);
    }

    #[test]
    fn test_back_to_start_drops_still() {
        let (mut app, _rx) = kiosk(1);
        to_scan(&mut app);
        feed(&mut app, Some(aligned_face()));
        assert_eq!(app.screen(), Screen::Analyze);
        assert!(app.captured_still().is_some());

        app.navigate(Screen::Start);
        assert!(app.captured_still().is_none());

        app.navigate(Screen::Analyze);
        assert_eq!(app.screen(), Screen::Start);
        app.update(Message::Tick(Instant::now() + Duration::from_secs(6)));
        assert_eq!(app.screen(), Screen::Start);
        assert!(app.captured_still().is_none());
    }

    #[test]
    fn test_step_icons_follow_screen() {
        let (mut app, _rx) = kiosk(100);
        to_scan(&mut app);

        let icons = app.step_icons();
        assert_eq!(icons.len(), 4);
        assert!(icons.contains(&(Screen::Scan, 1.0)));
        assert!(icons.contains(&(Screen::Consent, 0.40)));
        assert!(icons.contains(&(Screen::Result, 0.50)));
    }

    #[test]
    fn test_analyze_without_still_bounces_to_start() {
        let (mut app, _rx) = kiosk(100);
        app.navigate(Screen::Analyze);
        assert_eq!(app.screen(), Screen::Start);
    }

    #[test]
    fn test_leaving_scan_ignores_late_results() {
        let (mut app, mut rx) = kiosk(100);
        to_scan(&mut app);
        let (ticket, _frame) = app.next_frame().unwrap();

        app.navigate(Screen::Start);
        drain(&mut rx);

        let outcome = app.on_face_results(ticket, Some(aligned_face()), Instant::now());
        assert_eq!(outcome, FrameOutcome::Ignored);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_denied_camera_shows_hint() {
        let mut config = Config::default();
        config.scan.stability = StabilityPolicy::Frames(100);
        let mut app = KioskApp::new(config, Box::new(LoggingAnalysisSink::default()));
        app.attach_camera(Box::new(
            SequenceCamera::from_frames(vec![CameraFrame::solid(2, 2, [0, 0, 0, 255])]).denied(),
        ));

        to_scan(&mut app);
        assert_eq!(app.hint(), Some(ScanHint::CameraDenied));
        assert!(app.next_frame().is_none());
    }

    #[test]
    fn test_focus_resends_clear() {
        let (mut app, mut rx) = kiosk(100);
        drain(&mut rx);
        app.update(Message::WindowFocused);
        assert_eq!(drain(&mut rx), ["CLEAR"]);
    }
}
