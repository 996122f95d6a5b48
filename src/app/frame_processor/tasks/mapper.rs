// SPDX-License-Identifier: GPL-3.0-only

//! Normalized landmarks to viewport pixels

use crate::app::frame_processor::types::{FaceBounds, LandmarkSet};

/// Maps detector output into the camera viewport the guide is drawn over
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    frame_width: f32,
    frame_height: f32,
}

impl CoordinateMapper {
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        Self {
            frame_width: frame_width as f32,
            frame_height: frame_height as f32,
        }
    }

    /// Face centre and width from the extremes of every landmark
    ///
    /// Returns `None` for an empty landmark set.
    pub fn map(&self, landmarks: &LandmarkSet) -> Option<FaceBounds> {
        let extent = landmarks.extent()?;
        Some(FaceBounds {
            center_x: (extent.min_x + extent.max_x) / 2.0 * self.frame_width,
            center_y: (extent.min_y + extent.max_y) / 2.0 * self.frame_height,
            width: (extent.max_x - extent.min_x) * self.frame_width,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::frame_processor::types::Landmark;

    #[test]
    fn test_map_uses_extremes() {
        let mapper = CoordinateMapper::new(800, 600);
        let landmarks = LandmarkSet::new(vec![
            Landmark::new(0.25, 0.5),
            Landmark::new(0.75, 0.25),
            Landmark::new(0.5, 0.75),
        ]);

        let bounds = mapper.map(&landmarks).unwrap();
        assert!((bounds.center_x - 400.0).abs() < 1e-3);
        assert!((bounds.center_y - 300.0).abs() < 1e-3);
        assert!((bounds.width - 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_empty_set_maps_to_nothing() {
        let mapper = CoordinateMapper::new(800, 600);
        assert!(mapper.map(&LandmarkSet::default()).is_none());
    }
}
