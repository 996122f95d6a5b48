// SPDX-License-Identifier: GPL-3.0-only

use crate::app::frame_processor::{
    AlignmentThresholds, CoordinateMapper, DetectorOptions, GuideRegion, StabilityPolicy,
};
use crate::constants::{projection, scan, session};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Top-left corner of an element on the kiosk page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PagePoint {
    pub left: f32,
    pub top: f32,
}

/// Settings for the scan screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Live preview resolution requested from the camera
    pub camera_width: u32,
    pub camera_height: u32,
    /// Resolution of the captured still
    pub snapshot_width: u32,
    pub snapshot_height: u32,
    /// Guide frame in page coordinates
    pub guide: GuideRegion,
    /// Camera viewport origin in page coordinates
    pub camera_origin: PagePoint,
    /// Smallest acceptable face width as a fraction of the guide width
    pub min_face_ratio: f32,
    /// Largest acceptable face width as a fraction of the guide width
    pub max_face_ratio: f32,
    /// When a held alignment triggers the automatic capture
    pub stability: StabilityPolicy,
    /// Frames per second assumed when showing the hold-still countdown
    pub hint_frame_rate: u32,
    /// Options passed to the landmark detector
    pub detector: DetectorOptions,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            camera_width: scan::CAMERA_WIDTH,
            camera_height: scan::CAMERA_HEIGHT,
            snapshot_width: scan::SNAPSHOT_WIDTH,
            snapshot_height: scan::SNAPSHOT_HEIGHT,
            guide: GuideRegion::new(
                scan::GUIDE_PAGE_ORIGIN.0,
                scan::GUIDE_PAGE_ORIGIN.1,
                scan::GUIDE_PAGE_SIZE.0,
                scan::GUIDE_PAGE_SIZE.1,
            ),
            camera_origin: PagePoint {
                left: scan::CAMERA_PAGE_ORIGIN.0,
                top: scan::CAMERA_PAGE_ORIGIN.1,
            },
            min_face_ratio: scan::MIN_FACE_RATIO,
            max_face_ratio: scan::MAX_FACE_RATIO,
            stability: StabilityPolicy::Frames(scan::STABLE_FRAMES),
            hint_frame_rate: scan::HINT_FRAME_RATE,
            detector: DetectorOptions::default(),
        }
    }
}

impl ScanSettings {
    /// Guide frame expressed in camera viewport pixels
    pub fn guide_region(&self) -> GuideRegion {
        self.guide
            .offset_by(-self.camera_origin.left, -self.camera_origin.top)
    }

    /// Mapper from normalized landmarks to camera viewport pixels
    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(self.camera_width, self.camera_height)
    }

    pub fn thresholds(&self) -> AlignmentThresholds {
        AlignmentThresholds {
            min_ratio: self.min_face_ratio,
            max_ratio: self.max_face_ratio,
        }
    }

    fn validate(&self) -> AppResult<()> {
        if self.camera_width == 0 || self.camera_height == 0 {
            return Err(AppError::Config("camera resolution must be non-zero".into()));
        }
        if self.snapshot_width == 0 || self.snapshot_height == 0 {
            return Err(AppError::Config("snapshot resolution must be non-zero".into()));
        }
        if !(self.min_face_ratio < self.max_face_ratio) {
            return Err(AppError::Config(format!(
                "min_face_ratio {} must be below max_face_ratio {}",
                self.min_face_ratio, self.max_face_ratio
            )));
        }
        if !self.stability.is_valid() {
            return Err(AppError::Config(format!(
                "invalid stability policy {:?}",
                self.stability
            )));
        }
        Ok(())
    }
}

/// Settings for the projection surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionSettings {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Name of the persisted calibration entry
    pub storage_key: String,
    /// Directory for persisted entries (default: platform data dir)
    pub data_dir: Option<PathBuf>,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            canvas_width: projection::CANVAS_WIDTH,
            canvas_height: projection::CANVAS_HEIGHT,
            storage_key: projection::STORAGE_KEY.to_string(),
            data_dir: None,
        }
    }
}

impl ProjectionSettings {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(crate::storage::default_data_dir)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scan screen and alignment settings
    pub scan: ScanSettings,
    /// Projection surface settings
    pub projection: ProjectionSettings,
    /// Time spent on the analyze screen
    pub analyze_duration_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan: ScanSettings::default(),
            projection: ProjectionSettings::default(),
            analyze_duration_ms: session::ANALYZE_DURATION.as_millis() as u64,
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("facemask")
            .join("config.json")
    }

    pub fn analyze_duration(&self) -> Duration {
        Duration::from_millis(self.analyze_duration_ms)
    }

    /// Parse and validate a config file
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.scan.validate()?;
        Ok(config)
    }

    /// Load a config, falling back to defaults when it is missing or unusable
    pub fn load(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unusable config file");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
