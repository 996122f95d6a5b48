// SPDX-License-Identifier: GPL-3.0-only

//! Installation-wide constants
//!
//! Geometry values are taken from the kiosk layout (a 1920x1080 page with the
//! camera viewport and guide frame at fixed positions).

use std::time::Duration;

/// Scan screen geometry and alignment tuning
pub mod scan {
    /// Live camera preview width
    pub const CAMERA_WIDTH: u32 = 805;

    /// Live camera preview height
    pub const CAMERA_HEIGHT: u32 = 672;

    /// Captured still width, independent of the preview resolution
    pub const SNAPSHOT_WIDTH: u32 = 1600;

    /// Captured still height
    pub const SNAPSHOT_HEIGHT: u32 = 1336;

    /// Guide frame position on the page (left, top)
    pub const GUIDE_PAGE_ORIGIN: (f32, f32) = (815.0, 351.0);

    /// Guide frame size on the page (width, height)
    pub const GUIDE_PAGE_SIZE: (f32, f32) = (289.0, 301.0);

    /// Camera viewport position on the page (left, top)
    pub const CAMERA_PAGE_ORIGIN: (f32, f32) = (558.0, 191.0);

    /// Face narrower than this fraction of the guide width is too far away
    pub const MIN_FACE_RATIO: f32 = 0.40;

    /// Face wider than this fraction of the guide width is too close
    pub const MAX_FACE_RATIO: f32 = 0.75;

    /// Consecutive aligned frames before the automatic capture fires
    pub const STABLE_FRAMES: u32 = 100;

    /// Nominal camera rate used to turn the frame counter into seconds for hints
    pub const HINT_FRAME_RATE: u32 = 25;
}

/// Face landmark detector settings
pub mod detector {
    /// Only the best face is tracked
    pub const MAX_FACES: u32 = 1;

    /// Iris/lip refinement produces the 478-point mesh
    pub const REFINE_LANDMARKS: bool = true;

    pub const MIN_DETECTION_CONFIDENCE: f32 = 0.5;

    pub const MIN_TRACKING_CONFIDENCE: f32 = 0.5;

    /// Points per face with refinement enabled
    pub const REFINED_LANDMARK_COUNT: usize = 478;

    /// Points per face without refinement
    pub const BASE_LANDMARK_COUNT: usize = 468;
}

/// Projection surface constants
pub mod projection {
    /// Projection canvas width
    pub const CANVAS_WIDTH: u32 = 1920;

    /// Projection canvas height
    pub const CANVAS_HEIGHT: u32 = 1080;

    /// Key of the persisted calibration record
    pub const STORAGE_KEY: &str = "projSettings";

    /// Face-mesh indices tracing the face perimeter as one closed loop.
    ///
    /// Adjacent entries are adjacent on the outline; the loop starts and ends
    /// at the forehead point.
    pub const FACE_OUTLINE: [usize; 36] = [
        10, 338, 297, 332, 284, 251, 389, 356, 454, 323, 361, 288, 397, 365, 379, 378, 400, 377,
        152, 148, 176, 149, 150, 136, 172, 58, 132, 93, 234, 127, 162, 21, 54, 103, 67, 10,
    ];

    /// Guide overlay colour (RGBA)
    pub const GUIDE_COLOR: [u8; 4] = [0, 255, 0, 255];

    /// Guide overlay border thickness in canvas pixels
    pub const GUIDE_BORDER: u32 = 2;
}

/// Keyboard calibration step sizes
pub mod calibration {
    /// Position step in pixels
    pub const MOVE_STEP: f32 = 1.0;

    /// Position step with Shift held
    pub const MOVE_STEP_FAST: f32 = 10.0;

    /// Rotation step in degrees
    pub const ROTATE_STEP: f32 = 0.2;

    /// Rotation step with Shift held
    pub const ROTATE_STEP_FAST: f32 = 2.0;

    /// Scale / squash step
    pub const SCALE_STEP: f32 = 0.005;
}

/// Kiosk session flow
pub mod session {
    use super::Duration;

    /// Time spent on the analyze screen before the result is shown
    pub const ANALYZE_DURATION: Duration = Duration::from_millis(5000);

    /// Number of consent checkboxes on the consent screen
    pub const CONSENT_ITEMS: usize = 3;

    /// Bound of the kiosk to projection link
    pub const LINK_CAPACITY: usize = 8;
}

/// Step icon display weights
pub mod ui {
    /// Opacity of the icon for the current step
    pub const ICON_ACTIVE: f32 = 1.0;

    /// Opacity of inactive icons
    pub const ICON_DIM: f32 = 0.40;

    /// Opacity of the inactive icon whose artwork is darker
    pub const ICON_DIM_DARK: f32 = 0.50;
}

/// Still image file types accepted by the file camera
pub mod file_formats {
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp"];

    /// Check whether an extension (lowercase, no dot) is a supported image
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext)
    }
}
