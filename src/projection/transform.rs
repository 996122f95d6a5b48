// SPDX-License-Identifier: GPL-3.0-only

//! Perspective transform applied to the projection canvas
//!
//! The record is persisted with short field names (`scaleY`, `rX`, `rY`,
//! `rZ`, `persp`) so existing calibration entries keep loading. Composition
//! order matches a CSS transform list applied about the canvas centre:
//!
//! ```text
//! perspective(p) translate(x, y) scale(s) scaleY(sy) rotateX(rx) rotateY(ry) rotateZ(rz)
//! ```

use nalgebra::{Matrix3, Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// Operator-tuned placement of the projection canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionTransform {
    /// Horizontal offset in pixels
    pub x: f32,
    /// Vertical offset in pixels
    pub y: f32,
    /// Uniform scale
    pub scale: f32,
    /// Extra vertical squash, offsets the projector's tilt
    #[serde(rename = "scaleY")]
    pub scale_y: f32,
    /// Tilt in degrees
    #[serde(rename = "rX")]
    pub rotate_x: f32,
    #[serde(rename = "rY")]
    pub rotate_y: f32,
    #[serde(rename = "rZ")]
    pub rotate_z: f32,
    /// Focal distance in pixels
    #[serde(rename = "persp")]
    pub perspective: f32,
}

impl Default for ProjectionTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            scale_y: 0.6,
            rotate_x: 50.0,
            rotate_y: 0.0,
            rotate_z: 0.0,
            perspective: 600.0,
        }
    }
}

impl ProjectionTransform {
    /// No-op transform (still with a focal distance, which is inert without rotation)
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            scale_y: 1.0,
            rotate_x: 0.0,
            rotate_y: 0.0,
            rotate_z: 0.0,
            perspective: 600.0,
        }
    }

    /// Every field finite and a positive focal distance
    pub fn is_valid(&self) -> bool {
        [
            self.x,
            self.y,
            self.scale,
            self.scale_y,
            self.rotate_x,
            self.rotate_y,
            self.rotate_z,
            self.perspective,
        ]
        .iter()
        .all(|v| v.is_finite())
            && self.perspective > 0.0
    }

    /// Transform list in CSS syntax
    pub fn css(&self) -> String {
        format!(
            "perspective({}px) translate3d({}px, {}px, 0px) scale({}) scaleY({}) rotateX({}deg) rotateY({}deg) rotateZ({}deg)",
            self.perspective,
            self.x,
            self.y,
            self.scale,
            self.scale_y,
            self.rotate_x,
            self.rotate_y,
            self.rotate_z
        )
    }

    /// Homogeneous 4x4 matrix for a canvas of the given size
    ///
    /// Column-vector convention: a canvas point `(x, y, 0, 1)` maps to
    /// `matrix * p`, with the origin at the canvas top-left.
    pub fn matrix(&self, width: u32, height: u32) -> Matrix4<f64> {
        let cx = width as f64 / 2.0;
        let cy = height as f64 / 2.0;

        let mut perspective = Matrix4::identity();
        perspective[(3, 2)] = -1.0 / self.perspective as f64;

        let translate = Matrix4::new_translation(&Vector3::new(self.x as f64, self.y as f64, 0.0));
        let scale = Matrix4::new_nonuniform_scaling(&Vector3::new(
            self.scale as f64,
            self.scale as f64 * self.scale_y as f64,
            1.0,
        ));

        let to_origin = Matrix4::new_translation(&Vector3::new(-cx, -cy, 0.0));
        let from_origin = Matrix4::new_translation(&Vector3::new(cx, cy, 0.0));

        from_origin
            * perspective
            * translate
            * scale
            * rotate_x(self.rotate_x)
            * rotate_y(self.rotate_y)
            * rotate_z(self.rotate_z)
            * to_origin
    }

    /// Plane-to-plane homography for points on the canvas (z = 0)
    pub fn homography(&self, width: u32, height: u32) -> Matrix3<f64> {
        let m = self.matrix(width, height);
        let pick = [0, 1, 3];
        Matrix3::from_fn(|r, c| m[(pick[r], pick[c])])
    }
}

fn rotate_x(degrees: f32) -> Matrix4<f64> {
    let (s, c) = (degrees as f64).to_radians().sin_cos();
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0, //
        0.0, c, -s, 0.0, //
        0.0, s, c, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    )
}

fn rotate_y(degrees: f32) -> Matrix4<f64> {
    let (s, c) = (degrees as f64).to_radians().sin_cos();
    Matrix4::new(
        c, 0.0, s, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        -s, 0.0, c, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    )
}

fn rotate_z(degrees: f32) -> Matrix4<f64> {
    let (s, c) = (degrees as f64).to_radians().sin_cos();
    Matrix4::new(
        c, -s, 0.0, 0.0, //
        s, c, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Apply a homography to a 2D point; `None` behind the viewer or at infinity
pub fn project(h: &Matrix3<f64>, x: f64, y: f64) -> Option<(f64, f64)> {
    let p = h * Vector3::new(x, y, 1.0);
    if p.z <= f64::EPSILON {
        return None;
    }
    Some((p.x / p.z, p.y / p.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Option<(f64, f64)>, expected: (f64, f64)) {
        let (x, y) = actual.unwrap();
        assert!(
            (x - expected.0).abs() < 1e-6 && (y - expected.1).abs() < 1e-6,
            "{:?} != {:?}",
            (x, y),
            expected
        );
    }

    #[test]
    fn test_default_record() {
        let t = ProjectionTransform::default();
        assert_eq!(t.scale_y, 0.6);
        assert_eq!(t.rotate_x, 50.0);
        assert_eq!(t.perspective, 600.0);
        assert!(t.is_valid());
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(ProjectionTransform::default()).unwrap();
        for key in ["x", "y", "scale", "scaleY", "rX", "rY", "rZ", "persp"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_css_string() {
        assert_eq!(
            ProjectionTransform::default().css(),
            "perspective(600px) translate3d(0px, 0px, 0px) scale(1) scaleY(0.6) rotateX(50deg) rotateY(0deg) rotateZ(0deg)"
        );
    }

    #[test]
    fn test_identity_homography() {
        let h = ProjectionTransform::identity().homography(1920, 1080);
        assert_close(project(&h, 10.0, 20.0), (10.0, 20.0));
        assert_close(project(&h, 1919.0, 1079.0), (1919.0, 1079.0));
    }

    #[test]
    fn test_translation_and_centre_scale() {
        let t = ProjectionTransform {
            x: 15.0,
            y: -5.0,
            scale: 2.0,
            ..ProjectionTransform::identity()
        };
        let h = t.homography(100, 100);
        assert_close(project(&h, 50.0, 50.0), (65.0, 45.0));
        assert_close(project(&h, 60.0, 50.0), (85.0, 45.0));
    }

    #[test]
    fn test_rotate_z_about_centre() {
        let t = ProjectionTransform {
            rotate_z: 90.0,
            ..ProjectionTransform::identity()
        };
        let h = t.homography(100, 100);
        // y grows downward, so +90 degrees turns +x into +y
        assert_close(project(&h, 60.0, 50.0), (50.0, 60.0));
    }

    #[test]
    fn test_tilt_foreshortens_far_edge() {
        let t = ProjectionTransform {
            rotate_x: 50.0,
            ..ProjectionTransform::identity()
        };
        let h = t.homography(1920, 1080);
        let (top_left, _) = project(&h, 0.0, 0.0).unwrap();
        let (bottom_left, _) = project(&h, 0.0, 1080.0).unwrap();
        // Top edge tilts away from the viewer and shrinks toward the centre
        assert!(top_left > bottom_left);
    }

    #[test]
    fn test_invalid_records() {
        let zero_focus = ProjectionTransform {
            perspective: 0.0,
            ..ProjectionTransform::default()
        };
        let nan = ProjectionTransform {
            x: f32::NAN,
            ..ProjectionTransform::default()
        };
        assert!(!zero_focus.is_valid());
        assert!(!nan.is_valid());
    }
}
