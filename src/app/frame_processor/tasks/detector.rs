// SPDX-License-Identifier: GPL-3.0-only

//! Landmark detector contract
//!
//! Detection itself is an external capability. The kiosk only relies on
//! this contract: for a frame, zero or one face as an ordered set of points
//! in normalized frame coordinates.

use crate::app::frame_processor::types::LandmarkSet;
use crate::backends::camera::types::CameraFrame;
use crate::constants::detector;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, warn};

/// Options handed to the detector when it is created
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    pub max_faces: u32,
    pub refine_landmarks: bool,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            max_faces: detector::MAX_FACES,
            refine_landmarks: detector::REFINE_LANDMARKS,
            min_detection_confidence: detector::MIN_DETECTION_CONFIDENCE,
            min_tracking_confidence: detector::MIN_TRACKING_CONFIDENCE,
        }
    }
}

/// A face landmark detector
pub trait LandmarkDetector: Send {
    /// Analyze one frame; `Ok(None)` means no face
    fn detect(&mut self, frame: &CameraFrame) -> AppResult<Option<LandmarkSet>>;
}

impl DetectorOptions {
    /// Points a face carries with these options
    pub fn landmark_count(&self) -> usize {
        if self.refine_landmarks {
            detector::REFINED_LANDMARK_COUNT
        } else {
            detector::BASE_LANDMARK_COUNT
        }
    }
}

/// Replays recorded detector output, one frame per line
///
/// Each line of the script is JSON: `null` for "no face" or an array of
/// `{"x": .., "y": .., "z": ..}` points. Blank lines are skipped. Recorded
/// faces already passed the confidence thresholds when they were captured,
/// so only `max_faces` and the expected point count apply on replay.
#[derive(Debug, Clone)]
pub struct ScriptedDetector {
    script: Vec<Option<LandmarkSet>>,
    next: usize,
    looping: bool,
    options: DetectorOptions,
}

impl ScriptedDetector {
    pub fn new(script: Vec<Option<LandmarkSet>>) -> Self {
        Self {
            script,
            next: 0,
            looping: false,
            options: DetectorOptions::default(),
        }
    }

    /// Replay under the given detector options
    pub fn with_options(mut self, options: DetectorOptions) -> Self {
        debug!(?options, "Detector options");
        self.options = options;
        self
    }

    pub fn options(&self) -> &DetectorOptions {
        &self.options
    }

    /// Parse a JSON-lines script
    pub fn from_reader(reader: impl BufRead) -> AppResult<Self> {
        let mut script = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let entry: Option<LandmarkSet> = serde_json::from_str(line).map_err(|e| {
                AppError::Other(format!("landmark script line {}: {}", line_no + 1, e))
            })?;
            script.push(entry);
        }
        debug!(frames = script.len(), "Loaded landmark script");
        Ok(Self::new(script))
    }

    pub fn from_path(path: &Path) -> AppResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Start over at the first line when the script runs out
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len().saturating_sub(self.next)
    }
}

impl LandmarkDetector for ScriptedDetector {
    fn detect(&mut self, _frame: &CameraFrame) -> AppResult<Option<LandmarkSet>> {
        if self.next >= self.script.len() {
            if !self.looping || self.script.is_empty() {
                return Ok(None);
            }
            self.next = 0;
        }

        let entry = self.script[self.next].clone();
        self.next += 1;

        if self.options.max_faces == 0 {
            return Ok(None);
        }

        if let Some(set) = &entry
            && set.len() != self.options.landmark_count()
        {
            warn!(
                points = set.len(),
                expected = self.options.landmark_count(),
                refine = self.options.refine_landmarks,
                "Scripted face has an unexpected point count"
            );
        }

        Ok(entry)
    }
}
