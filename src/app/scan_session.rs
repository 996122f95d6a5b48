// SPDX-License-Identifier: GPL-3.0-only

//! Per-visit scan state
//!
//! A `ScanSession` is created when the kiosk enters the scan screen and
//! dropped when it leaves. Everything a scan accumulates (stability counter,
//! last landmarks, last verdict, pending detector work) lives here, so a new
//! visit always starts clean. Detector results are matched against the
//! session's frame tickets; anything arriving after `end()` or carrying a
//! ticket from another session is ignored.

use crate::app::frame_processor::{
    AlignmentThresholds, AlignmentVerdict, CoordinateMapper, FrameGate, FrameTicket, GuideRegion,
    LandmarkSet, StabilityEvent, StabilityTracker, evaluate,
};
use crate::config::ScanSettings;
use crate::errors::CameraError;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

/// Hint shown under the camera preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanHint {
    /// Camera is starting, nothing analyzed yet
    Searching,
    NoFace,
    OutsideGuide,
    TooSmall,
    TooBig,
    /// Aligned; whole seconds held so far
    Holding { seconds: u32 },
    /// Still locked, capture is under way
    Captured,
    CameraDenied,
    CameraUnavailable,
}

impl ScanHint {
    pub fn message(&self) -> String {
        match self {
            ScanHint::Searching => "Starting camera...".to_string(),
            ScanHint::NoFace => "No face detected".to_string(),
            ScanHint::OutsideGuide => "Center your face in the frame".to_string(),
            ScanHint::TooSmall => "Come closer".to_string(),
            ScanHint::TooBig => "Move back".to_string(),
            ScanHint::Holding { seconds } => format!("Hold still... {}s", seconds),
            ScanHint::Captured => "Got it!".to_string(),
            ScanHint::CameraDenied => "Please allow camera access".to_string(),
            ScanHint::CameraUnavailable => "Camera unavailable".to_string(),
        }
    }

    /// Whether the hint reports a camera that never started
    pub fn is_camera_error(&self) -> bool {
        matches!(self, ScanHint::CameraDenied | ScanHint::CameraUnavailable)
    }
}

impl fmt::Display for ScanHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// What a detector result did to the session
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Late, foreign, or post-teardown result; session untouched
    Ignored,
    /// No face this frame; stability reset
    NoFace,
    /// Face evaluated, no capture yet
    Tracking {
        landmarks: LandmarkSet,
        verdict: AlignmentVerdict,
        event: StabilityEvent,
    },
    /// Stability threshold reached on this frame
    Locked { landmarks: LandmarkSet },
}

/// State owned by one scan screen visit
#[derive(Debug)]
pub struct ScanSession {
    id: Uuid,
    active: bool,
    gate: FrameGate,
    tracker: StabilityTracker,
    mapper: CoordinateMapper,
    guide: GuideRegion,
    thresholds: AlignmentThresholds,
    hint_frame_rate: u32,
    last_landmarks: Option<LandmarkSet>,
    last_verdict: Option<AlignmentVerdict>,
    hint: ScanHint,
}

impl ScanSession {
    pub fn new(settings: &ScanSettings) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, "Scan session started");
        Self {
            id,
            active: true,
            gate: FrameGate::new(id),
            tracker: StabilityTracker::new(settings.stability),
            mapper: settings.mapper(),
            guide: settings.guide_region(),
            thresholds: settings.thresholds(),
            hint_frame_rate: settings.hint_frame_rate.max(1),
            last_landmarks: None,
            last_verdict: None,
            hint: ScanHint::Searching,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Ask to send a frame to the detector
    ///
    /// Returns `None` when the session has ended or a previous frame is
    /// still being analyzed; the frame is then skipped.
    pub fn submit_frame(&mut self) -> Option<FrameTicket> {
        if !self.active {
            return None;
        }
        self.gate.try_admit()
    }

    /// Apply a detector result
    pub fn on_face_results(
        &mut self,
        ticket: FrameTicket,
        detection: Option<LandmarkSet>,
        now: Instant,
    ) -> FrameOutcome {
        if !self.active || !self.gate.complete(&ticket) {
            trace!(
                session = %self.id,
                ticket_session = %ticket.session(),
                sequence = ticket.sequence(),
                "Ignoring stale detector result"
            );
            return FrameOutcome::Ignored;
        }

        let Some(landmarks) = detection.filter(|l| !l.is_empty()) else {
            self.tracker.reset();
            self.last_landmarks = None;
            self.last_verdict = None;
            self.hint = ScanHint::NoFace;
            return FrameOutcome::NoFace;
        };

        let verdict = match self.mapper.map(&landmarks) {
            Some(face) => evaluate(&face, &self.guide, &self.thresholds),
            None => AlignmentVerdict::default(),
        };

        self.last_verdict = Some(verdict);
        self.last_landmarks = Some(landmarks.clone());

        match self.tracker.observe(verdict.is_aligned(), now) {
            StabilityEvent::Fire => {
                info!(session = %self.id, "Face locked");
                self.hint = ScanHint::Captured;
                FrameOutcome::Locked { landmarks }
            }
            event => {
                self.hint = self.hint_for(&verdict);
                FrameOutcome::Tracking {
                    landmarks,
                    verdict,
                    event,
                }
            }
        }
    }

    fn hint_for(&self, verdict: &AlignmentVerdict) -> ScanHint {
        if !verdict.within_bounds {
            ScanHint::OutsideGuide
        } else if verdict.too_small {
            ScanHint::TooSmall
        } else if verdict.too_big {
            ScanHint::TooBig
        } else {
            ScanHint::Holding {
                seconds: self.tracker.counter() / self.hint_frame_rate,
            }
        }
    }

    /// Camera start failed; shown as a hint, never fatal
    pub fn report_camera_error(&mut self, error: &CameraError) {
        warn!(session = %self.id, %error, "Camera failed to start");
        self.hint = match error {
            CameraError::PermissionDenied => ScanHint::CameraDenied,
            _ => ScanHint::CameraUnavailable,
        };
    }

    /// The locked frame could not be captured; keep scanning
    pub fn capture_failed(&mut self) {
        debug!(session = %self.id, "Capture failed, back to holding");
        self.hint = ScanHint::Holding { seconds: 0 };
    }

    /// Manual capture is allowed only right after an aligned verdict
    pub fn capture_enabled(&self) -> bool {
        self.active
            && self.last_landmarks.is_some()
            && self.last_verdict.is_some_and(|v| v.is_aligned())
    }

    /// Landmarks for a manual capture, if the affordance is enabled
    pub fn capture_landmarks(&self) -> Option<&LandmarkSet> {
        if self.capture_enabled() {
            self.last_landmarks.as_ref()
        } else {
            None
        }
    }

    pub fn last_landmarks(&self) -> Option<&LandmarkSet> {
        self.last_landmarks.as_ref()
    }

    pub fn last_verdict(&self) -> Option<AlignmentVerdict> {
        self.last_verdict
    }

    pub fn stability_counter(&self) -> u32 {
        self.tracker.counter()
    }

    pub fn hint(&self) -> ScanHint {
        self.hint
    }

    /// Stop accepting results and drop per-session state
    pub fn end(&mut self) {
        if !self.active {
            return;
        }
        debug!(
            session = %self.id,
            dropped_frames = self.gate.dropped(),
            "Scan session ended"
        );
        self.active = false;
        self.tracker.reset();
        self.last_landmarks = None;
        self.last_verdict = None;
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::frame_processor::{Landmark, StabilityPolicy};

    /// Face centred in the default guide at about 0.55 of its width
    fn aligned_face() -> LandmarkSet {
        // Guide in camera pixels: left 257, top 160, 289x301
        // Centre (401.5, 310.5); width 160 px = 0.1988 of 805
        let cx = 401.5 / 805.0;
        let cy = 310.5 / 672.0;
        let half_w = 80.0 / 805.0;
        let half_h = 100.0 / 672.0;
        LandmarkSet::new(vec![
            Landmark::new(cx - half_w, cy - half_h),
            Landmark::new(cx + half_w, cy + half_h),
        ])
    }

    fn tiny_face() -> LandmarkSet {
        let cx = 401.5 / 805.0;
        let cy = 310.5 / 672.0;
        LandmarkSet::new(vec![
            Landmark::new(cx - 0.01, cy - 0.01),
            Landmark::new(cx + 0.01, cy + 0.01),
        ])
    }

    fn feed(session: &mut ScanSession, detection: Option<LandmarkSet>) -> FrameOutcome {
        let ticket = session.submit_frame().unwrap();
        session.on_face_results(ticket, detection, Instant::now())
    }

    fn settings(frames: u32) -> ScanSettings {
        ScanSettings {
            stability: StabilityPolicy::Frames(frames),
            ..ScanSettings::default()
        }
    }

    #[test]
    fn test_aligned_face_tracks_and_enables_capture() {
        let mut session = ScanSession::new(&settings(100));
        match feed(&mut session, Some(aligned_face())) {
            FrameOutcome::Tracking { verdict, event, .. } => {
                assert!(verdict.is_aligned());
                assert_eq!(event, StabilityEvent::Holding(1));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(session.capture_enabled());
        assert_eq!(session.hint(), ScanHint::Holding { seconds: 0 });
    }

    #[test]
    fn test_no_face_resets_and_disables_capture() {
        let mut session = ScanSession::new(&settings(100));
        feed(&mut session, Some(aligned_face()));
        feed(&mut session, Some(aligned_face()));
        assert_eq!(session.stability_counter(), 2);

        assert_eq!(feed(&mut session, None), FrameOutcome::NoFace);
        assert_eq!(session.stability_counter(), 0);
        assert!(!session.capture_enabled());
        assert!(session.capture_landmarks().is_none());
        assert_eq!(session.hint(), ScanHint::NoFace);
    }

    #[test]
    fn test_small_face_hint() {
        let mut session = ScanSession::new(&settings(100));
        feed(&mut session, Some(tiny_face()));
        assert_eq!(session.hint(), ScanHint::TooSmall);
        assert_eq!(session.hint().message(), "Come closer");
        assert!(!session.capture_enabled());
    }

    #[test]
    fn test_lock_after_threshold() {
        let mut session = ScanSession::new(&settings(3));
        feed(&mut session, Some(aligned_face()));
        feed(&mut session, Some(aligned_face()));
        match feed(&mut session, Some(aligned_face())) {
            FrameOutcome::Locked { landmarks } => assert_eq!(landmarks, aligned_face()),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(session.stability_counter(), 0);
        assert_eq!(session.hint(), ScanHint::Captured);

        session.capture_failed();
        assert_eq!(session.hint(), ScanHint::Holding { seconds: 0 });
    }

    #[test]
    fn test_holding_hint_counts_seconds() {
        let mut session = ScanSession::new(&settings(100));
        for _ in 0..50 {
            feed(&mut session, Some(aligned_face()));
        }
        assert_eq!(session.hint(), ScanHint::Holding { seconds: 2 });
    }

    #[test]
    fn test_pending_frame_blocks_submission() {
        let mut session = ScanSession::new(&settings(100));
        let ticket = session.submit_frame().unwrap();
        assert!(session.submit_frame().is_none());
        session.on_face_results(ticket, None, Instant::now());
        assert!(session.submit_frame().is_some());
    }

    #[test]
    fn test_late_result_after_end_is_ignored() {
        let mut session = ScanSession::new(&settings(100));
        let ticket = session.submit_frame().unwrap();
        session.end();

        let outcome = session.on_face_results(ticket, Some(aligned_face()), Instant::now());
        assert_eq!(outcome, FrameOutcome::Ignored);
        assert!(session.last_landmarks().is_none());
        assert!(session.submit_frame().is_none());
    }

    #[test]
    fn test_result_from_old_session_does_not_touch_new_one() {
        let mut old = ScanSession::new(&settings(100));
        let stale = old.submit_frame().unwrap();
        old.end();

        let mut current = ScanSession::new(&settings(100));
        let outcome = current.on_face_results(stale, Some(aligned_face()), Instant::now());
        assert_eq!(outcome, FrameOutcome::Ignored);
        assert_eq!(current.stability_counter(), 0);
        assert!(current.last_verdict().is_none());
    }

    #[test]
    fn test_camera_denied_becomes_hint() {
        let mut session = ScanSession::new(&settings(100));
        session.report_camera_error(&CameraError::PermissionDenied);
        assert_eq!(session.hint(), ScanHint::CameraDenied);
    }
}
