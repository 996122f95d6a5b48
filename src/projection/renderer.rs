// SPDX-License-Identifier: GPL-3.0-only

//! Masked face compositing for the projection canvas
//!
//! Every draw starts from opaque black. With landmarks, the source image is
//! scaled to the canvas and only the pixels inside the face outline polygon
//! are kept. The finished canvas is then warped through the calibration
//! homography by [`ProjectionRenderer::present`].

use super::transform::{ProjectionTransform, project};
use crate::app::frame_processor::types::LandmarkSet;
use crate::constants::projection::{FACE_OUTLINE, GUIDE_BORDER, GUIDE_COLOR};
use image::{Rgba, RgbaImage};
use tracing::{debug, warn};

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

#[derive(Debug, Clone)]
pub struct ProjectionRenderer {
    canvas: RgbaImage,
    outline: Vec<usize>,
}

impl ProjectionRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbaImage::from_pixel(width, height, BLACK),
            outline: FACE_OUTLINE.to_vec(),
        }
    }

    /// Use a different outline loop (for another landmark topology)
    pub fn with_outline(mut self, outline: Vec<usize>) -> Self {
        self.outline = outline;
        self
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Fill the canvas with opaque black
    pub fn clear(&mut self) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = BLACK;
        }
    }

    /// Draw `source` clipped to the face outline from `landmarks`
    ///
    /// Returns false, leaving the canvas black, when the set lacks an
    /// outline index.
    pub fn draw_masked(&mut self, source: &RgbaImage, landmarks: &LandmarkSet) -> bool {
        self.clear();

        let (width, height) = self.canvas.dimensions();
        let Some(polygon) = landmarks.polygon(&self.outline, width, height) else {
            warn!(
                points = landmarks.len(),
                "Landmark set has no face outline, nothing drawn"
            );
            return false;
        };

        let mut covered = 0u64;
        for y in 0..height {
            let spans = scanline_spans(&polygon, y as f32 + 0.5);
            for (start, end) in spans {
                let first = (start - 0.5).ceil().max(0.0) as u32;
                let last = ((end - 0.5).ceil().min(width as f32)).max(0.0) as u32;
                for x in first..last {
                    let pixel = sample(source, x, y, width, height);
                    self.canvas.put_pixel(x, y, pixel);
                    covered += 1;
                }
            }
        }

        debug!(covered, "Masked face drawn");
        true
    }

    /// Draw `source` over the whole canvas
    pub fn draw_unclipped(&mut self, source: &RgbaImage) {
        self.clear();
        let (width, height) = self.canvas.dimensions();
        for y in 0..height {
            for x in 0..width {
                let pixel = sample(source, x, y, width, height);
                self.canvas.put_pixel(x, y, pixel);
            }
        }
    }

    /// Warp the canvas (plus optional guide overlay) into output space
    pub fn present(&self, transform: &ProjectionTransform, guide: bool) -> RgbaImage {
        let mut layer = self.canvas.clone();
        if guide {
            draw_guide(&mut layer);
        }

        let (width, height) = layer.dimensions();
        let Some(inverse) = transform.homography(width, height).try_inverse() else {
            warn!(css = %transform.css(), "Degenerate projection transform");
            return RgbaImage::from_pixel(width, height, BLACK);
        };

        RgbaImage::from_fn(width, height, |x, y| {
            project(&inverse, x as f64 + 0.5, y as f64 + 0.5)
                .and_then(|(sx, sy)| {
                    let (sx, sy) = (sx.floor(), sy.floor());
                    (sx >= 0.0 && sy >= 0.0 && sx < width as f64 && sy < height as f64)
                        .then(|| *layer.get_pixel(sx as u32, sy as u32))
                })
                .unwrap_or(BLACK)
        })
    }
}

/// Green border plus centre cross, drawn in canvas space so it warps with the canvas
pub fn draw_guide(layer: &mut RgbaImage) {
    let (width, height) = layer.dimensions();
    let color = Rgba(GUIDE_COLOR);
    let border = GUIDE_BORDER.min(width / 2).min(height / 2);
    let (mid_x, mid_y) = (width / 2, height / 2);
    let half = GUIDE_BORDER / 2;

    for y in 0..height {
        for x in 0..width {
            let on_border =
                x < border || y < border || x >= width - border || y >= height - border;
            let on_cross = (x + half >= mid_x && x < mid_x + GUIDE_BORDER - half)
                || (y + half >= mid_y && y < mid_y + GUIDE_BORDER - half);
            if on_border || on_cross {
                layer.put_pixel(x, y, color);
            }
        }
    }
}

/// Nearest-neighbour sample of `source` stretched over a `width` x `height` target
fn sample(source: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> Rgba<u8> {
    let (sw, sh) = source.dimensions();
    if sw == 0 || sh == 0 {
        return BLACK;
    }
    let sx = (x as u64 * sw as u64 / width as u64) as u32;
    let sy = (y as u64 * sh as u64 / height as u64) as u32;
    *source.get_pixel(sx.min(sw - 1), sy.min(sh - 1))
}

/// Interior spans of a closed polygon on one scanline (even-odd rule)
fn scanline_spans(polygon: &[(f32, f32)], y: f32) -> Vec<(f32, f32)> {
    let mut crossings: Vec<f32> = polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .filter_map(|(&(x0, y0), &(x1, y1))| {
            let spans_row = (y0 <= y && y < y1) || (y1 <= y && y < y0);
            spans_row.then(|| x0 + (y - y0) / (y1 - y0) * (x1 - x0))
        })
        .collect();
    crossings.sort_by(|a, b| a.total_cmp(b));
    crossings
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect()
}
