// SPDX-License-Identifier: GPL-3.0-only

//! Core types for per-frame face analysis
//!
//! Landmarks arrive from the detector in normalized (0.0 to 1.0) camera
//! coordinates. Guide regions and face bounds are in camera viewport pixels.

use serde::{Deserialize, Serialize};

/// One tracked facial keypoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// 0.0 = left edge of the frame, 1.0 = right edge
    pub x: f32,
    /// 0.0 = top edge of the frame, 1.0 = bottom edge
    pub y: f32,
    /// Relative depth, unused by alignment
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// Ordered landmark points for one face
///
/// Index `i` always denotes the same anatomical point. The set owns its
/// points; cloning it is a deep copy, so a frozen capture never aliases the
/// live per-frame set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    /// Mutable access for detectors that refine points in place
    pub fn points_mut(&mut self) -> &mut [Landmark] {
        &mut self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    /// Independent copy for freezing
    pub fn snapshot(&self) -> LandmarkSet {
        LandmarkSet {
            points: self.points.to_vec(),
        }
    }

    /// Normalized extremes of all points, `None` for an empty set
    pub fn extent(&self) -> Option<NormalizedExtent> {
        let first = self.points.first()?;
        let init = NormalizedExtent {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };

        Some(self.points.iter().fold(init, |acc, p| NormalizedExtent {
            min_x: acc.min_x.min(p.x),
            max_x: acc.max_x.max(p.x),
            min_y: acc.min_y.min(p.y),
            max_y: acc.max_y.max(p.y),
        }))
    }

    /// Pixel polygon through the given indices, scaled to `width` x `height`
    ///
    /// Returns `None` if any index is missing from this set.
    pub fn polygon(&self, indices: &[usize], width: u32, height: u32) -> Option<Vec<(f32, f32)>> {
        indices
            .iter()
            .map(|&i| {
                self.points
                    .get(i)
                    .map(|p| (p.x * width as f32, p.y * height as f32))
            })
            .collect()
    }
}

impl From<Vec<Landmark>> for LandmarkSet {
    fn from(points: Vec<Landmark>) -> Self {
        Self::new(points)
    }
}

/// Bounding extremes of a landmark set in normalized coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedExtent {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

/// Fixed rectangle a visitor's face must sit inside
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideRegion {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl GuideRegion {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Same rectangle shifted by (dx, dy)
    pub fn offset_by(&self, dx: f32, dy: f32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }

    /// Strict containment: points on the edge are outside
    pub fn contains_strict(&self, x: f32, y: f32) -> bool {
        x > self.left && x < self.left + self.width && y > self.top && y < self.top + self.height
    }
}

/// Face bounding box reduced to what alignment needs, in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBounds {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
}

/// Per-frame alignment result, never stored across frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlignmentVerdict {
    pub within_bounds: bool,
    pub too_small: bool,
    pub too_big: bool,
}

impl AlignmentVerdict {
    /// Inside the guide and neither too small nor too big
    pub fn is_aligned(&self) -> bool {
        self.within_bounds && !self.too_small && !self.too_big
    }
}
