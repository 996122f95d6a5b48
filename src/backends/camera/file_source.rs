// SPDX-License-Identifier: GPL-3.0-only

//! Image-file camera
//!
//! Plays a still image or a directory of images as a camera feed. Used by
//! the replay CLI and by tests in place of a real webcam.

use super::CameraBackend;
use super::types::{BackendError, BackendResult, CameraFrame};
use crate::constants::file_formats;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Load a still image as an RGBA camera frame
pub fn load_image_as_frame(path: &Path) -> BackendResult<CameraFrame> {
    info!(path = %path.display(), "Loading image file");

    let img = image::open(path).map_err(|e| {
        BackendError::IoError(format!("Failed to load image '{}': {}", path.display(), e))
    })?;

    let frame = CameraFrame::from_rgba_image(img.to_rgba8());
    debug!(width = frame.width, height = frame.height, "Image loaded");
    Ok(frame)
}

/// Camera that cycles through a fixed list of frames
pub struct SequenceCamera {
    frames: Vec<CameraFrame>,
    next: usize,
    current: Option<CameraFrame>,
    running: bool,
    looping: bool,
    /// Simulates a refused camera permission
    deny: bool,
}

impl SequenceCamera {
    /// Build from frames already in memory
    pub fn from_frames(frames: Vec<CameraFrame>) -> Self {
        Self {
            frames,
            next: 0,
            current: None,
            running: false,
            looping: true,
            deny: false,
        }
    }

    /// Load a single image, or every image in a directory sorted by name
    pub fn from_path(path: &Path) -> BackendResult<Self> {
        if path.is_dir() {
            let mut paths: Vec<_> = std::fs::read_dir(path)
                .map_err(|e| BackendError::IoError(e.to_string()))?
                .flatten()
                .map(|entry| entry.path())
                .filter(|p| {
                    p.extension()
                        .and_then(|e| e.to_str())
                        .map(|e| file_formats::is_image_extension(&e.to_lowercase()))
                        .unwrap_or(false)
                })
                .collect();
            paths.sort();

            if paths.is_empty() {
                return Err(BackendError::DeviceNotFound(format!(
                    "No images in '{}'",
                    path.display()
                )));
            }

            let frames = paths
                .iter()
                .map(|p| load_image_as_frame(p))
                .collect::<BackendResult<Vec<_>>>()?;
            Ok(Self::from_frames(frames))
        } else {
            Ok(Self::from_frames(vec![load_image_as_frame(path)?]))
        }
    }

    /// Stop after the last frame instead of wrapping around
    pub fn once(mut self) -> Self {
        self.looping = false;
        self
    }

    /// Refuse to start, as a camera with permission denied would
    pub fn denied(mut self) -> Self {
        self.deny = true;
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl CameraBackend for SequenceCamera {
    fn start(&mut self) -> BackendResult<()> {
        if self.deny {
            return Err(BackendError::PermissionDenied);
        }
        if self.frames.is_empty() {
            return Err(BackendError::NotAvailable("no frames to play".to_string()));
        }
        self.running = true;
        info!(frames = self.frames.len(), "Sequence camera started");
        Ok(())
    }

    fn try_stop(&mut self) -> bool {
        self.running = false;
        true
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn poll_frame(&mut self) -> Option<CameraFrame> {
        if !self.running {
            return None;
        }
        if self.next >= self.frames.len() {
            if !self.looping {
                return None;
            }
            self.next = 0;
        }

        let mut frame = self.frames.get(self.next)?.clone();
        frame.captured_at = Instant::now();
        self.next += 1;
        self.current = Some(frame.clone());
        Some(frame)
    }

    fn current_frame(&self) -> Option<&CameraFrame> {
        self.current.as_ref()
    }
}
