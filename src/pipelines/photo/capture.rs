// SPDX-License-Identifier: GPL-3.0-only

//! Still capture from the live camera frame
//!
//! Renders the current frame at the fixed snapshot resolution and freezes a
//! deep copy of the landmarks that locked the face.

use crate::app::frame_processor::types::LandmarkSet;
use crate::backends::camera::types::CameraFrame;
use crate::errors::CaptureError;
use chrono::{DateTime, Local};
use image::RgbaImage;
use image::imageops::{self, FilterType};
use std::sync::Arc;
use tracing::{debug, info};

/// What triggered a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTrigger {
    /// The stability threshold was reached
    Automatic,
    /// A visitor or operator pressed the capture button
    Manual,
}

/// Frozen image and landmark pair
#[derive(Debug, Clone)]
pub struct CapturedStill {
    /// Snapshot at the capture resolution
    pub image: Arc<RgbaImage>,
    /// Independent copy of the landmarks at capture time
    pub landmarks: LandmarkSet,
    pub captured_at: DateTime<Local>,
    pub trigger: CaptureTrigger,
}

/// Snapshot renderer
#[derive(Debug, Clone, Copy)]
pub struct CapturePipeline {
    width: u32,
    height: u32,
}

impl CapturePipeline {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Snapshot `frame` and freeze `landmarks`
    ///
    /// Fails with `SourceUnavailable` when there is no usable frame; callers
    /// treat that as a silent no-op.
    pub fn capture(
        &self,
        frame: Option<&CameraFrame>,
        landmarks: &LandmarkSet,
        trigger: CaptureTrigger,
    ) -> Result<CapturedStill, CaptureError> {
        if landmarks.is_empty() {
            return Err(CaptureError::NoFaceLocked);
        }

        let source = frame
            .and_then(CameraFrame::to_rgba_image)
            .ok_or(CaptureError::SourceUnavailable)?;

        debug!(
            src_width = source.width(),
            src_height = source.height(),
            width = self.width,
            height = self.height,
            "Rendering snapshot"
        );

        let image = if source.dimensions() == (self.width, self.height) {
            source
        } else {
            imageops::resize(&source, self.width, self.height, FilterType::Triangle)
        };

        info!(?trigger, points = landmarks.len(), "Captured still");

        Ok(CapturedStill {
            image: Arc::new(image),
            landmarks: landmarks.snapshot(),
            captured_at: Local::now(),
            trigger,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::frame_processor::types::Landmark;

    fn face() -> LandmarkSet {
        LandmarkSet::new(vec![Landmark::new(0.4, 0.4), Landmark::new(0.6, 0.6)])
    }

    #[test]
    fn test_capture_renders_fixed_resolution() {
        let frame = CameraFrame::solid(805, 672, [200, 100, 50, 255]);
        let pipeline = CapturePipeline::new(1600, 1336);

        let still = pipeline
            .capture(Some(&frame), &face(), CaptureTrigger::Automatic)
            .unwrap();
        assert_eq!(still.image.dimensions(), (1600, 1336));
        assert_eq!(still.image.get_pixel(800, 668).0, [200, 100, 50, 255]);
        assert_eq!(still.trigger, CaptureTrigger::Automatic);
    }

    #[test]
    fn test_captured_landmarks_are_independent() {
        let frame = CameraFrame::solid(8, 8, [0, 0, 0, 255]);
        let pipeline = CapturePipeline::new(16, 16);
        let mut live = face();

        let still = pipeline
            .capture(Some(&frame), &live, CaptureTrigger::Manual)
            .unwrap();
        live.points_mut()[0].x = 0.99;
        live = LandmarkSet::default();

        assert!(live.is_empty());
        assert_eq!(still.landmarks.points()[0].x, 0.4);
        assert_eq!(still.landmarks.len(), 2);
    }

    #[test]
    fn test_capture_without_source_fails() {
        let pipeline = CapturePipeline::new(16, 16);
        assert_eq!(
            pipeline
                .capture(None, &face(), CaptureTrigger::Manual)
                .unwrap_err(),
            CaptureError::SourceUnavailable
        );
    }

    #[test]
    fn test_capture_without_landmarks_fails() {
        let frame = CameraFrame::solid(8, 8, [0, 0, 0, 255]);
        let pipeline = CapturePipeline::new(16, 16);
        assert_eq!(
            pipeline
                .capture(Some(&frame), &LandmarkSet::default(), CaptureTrigger::Manual)
                .unwrap_err(),
            CaptureError::NoFaceLocked
        );
    }
}
