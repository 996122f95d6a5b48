// SPDX-License-Identifier: GPL-3.0-only

//! Guide-box alignment check

use crate::app::frame_processor::types::{AlignmentVerdict, FaceBounds, GuideRegion};
use crate::constants::scan;

/// Acceptable face width range as fractions of the guide width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentThresholds {
    pub min_ratio: f32,
    pub max_ratio: f32,
}

impl Default for AlignmentThresholds {
    fn default() -> Self {
        Self {
            min_ratio: scan::MIN_FACE_RATIO,
            max_ratio: scan::MAX_FACE_RATIO,
        }
    }
}

/// Judge one frame's face against the guide
pub fn evaluate(
    face: &FaceBounds,
    guide: &GuideRegion,
    thresholds: &AlignmentThresholds,
) -> AlignmentVerdict {
    AlignmentVerdict {
        within_bounds: guide.contains_strict(face.center_x, face.center_y),
        too_small: face.width < guide.width * thresholds.min_ratio,
        too_big: face.width > guide.width * thresholds.max_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUIDE: GuideRegion = GuideRegion::new(100.0, 100.0, 200.0, 200.0);

    fn face(center_x: f32, center_y: f32, width: f32) -> FaceBounds {
        FaceBounds {
            center_x,
            center_y,
            width,
        }
    }

    #[test]
    fn test_aligned_inside_envelope() {
        let thresholds = AlignmentThresholds::default();
        for width in [81.0, 100.0, 120.0, 149.0] {
            for (cx, cy) in [(101.0, 101.0), (200.0, 200.0), (299.0, 299.0)] {
                let verdict = evaluate(&face(cx, cy, width), &GUIDE, &thresholds);
                assert!(verdict.is_aligned(), "{cx},{cy} w={width}: {verdict:?}");
            }
        }
    }

    #[test]
    fn test_outside_guide() {
        let thresholds = AlignmentThresholds::default();
        for (cx, cy) in [(100.0, 200.0), (300.0, 200.0), (200.0, 99.0), (200.0, 301.0)] {
            let verdict = evaluate(&face(cx, cy, 100.0), &GUIDE, &thresholds);
            assert!(!verdict.within_bounds);
            assert!(!verdict.is_aligned());
        }
    }

    #[test]
    fn test_too_small_and_too_big() {
        let thresholds = AlignmentThresholds::default();

        let small = evaluate(&face(200.0, 200.0, 79.0), &GUIDE, &thresholds);
        assert!(small.too_small && !small.too_big && !small.is_aligned());

        let big = evaluate(&face(200.0, 200.0, 151.0), &GUIDE, &thresholds);
        assert!(big.too_big && !big.too_small && !big.is_aligned());
    }

    #[test]
    fn test_custom_thresholds() {
        let loose = AlignmentThresholds {
            min_ratio: 0.1,
            max_ratio: 0.9,
        };
        assert!(evaluate(&face(200.0, 200.0, 30.0), &GUIDE, &loose).is_aligned());
        assert!(!evaluate(&face(200.0, 200.0, 30.0), &GUIDE, &AlignmentThresholds::default()).is_aligned());
    }
}
