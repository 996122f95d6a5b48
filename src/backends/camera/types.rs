// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera backends

use image::RgbaImage;
use std::sync::Arc;
use std::time::Instant;

/// A single RGBA camera frame
///
/// Pixel data is reference counted so frames can be handed to the detector,
/// the capture pipeline and the preview without copying.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, `stride` bytes per row
    pub data: Arc<[u8]>,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// When the frame was delivered
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Wrap a tightly packed RGBA image
    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let width = image.width();
        let height = image.height();
        Self {
            data: Arc::from(image.into_raw().into_boxed_slice()),
            width,
            height,
            stride: width * 4,
            captured_at: Instant::now(),
        }
    }

    /// A frame filled with one colour
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from_rgba_image(RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
    }

    /// Copy the frame into a packed image, dropping stride padding
    ///
    /// Returns `None` when the buffer is shorter than the declared geometry.
    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        let width = self.width as usize;
        let height = self.height as usize;
        let stride = self.stride as usize;
        let row_bytes = width * 4;

        if width == 0 || height == 0 || stride < row_bytes {
            return None;
        }

        let mut packed = Vec::with_capacity(row_bytes * height);
        for y in 0..height {
            let row_start = y * stride;
            let row = self.data.get(row_start..row_start + row_bytes)?;
            packed.extend_from_slice(row);
        }

        RgbaImage::from_raw(self.width, self.height, packed)
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Access to the device was refused
    PermissionDenied,
    /// Backend is not available on this system
    NotAvailable(String),
    /// Camera device not found
    DeviceNotFound(String),
    /// General I/O error
    IoError(String),
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::PermissionDenied => write!(f, "Permission denied"),
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::IoError(msg) => write!(f, "I/O error: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<BackendError> for crate::errors::CameraError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::PermissionDenied => crate::errors::CameraError::PermissionDenied,
            other => crate::errors::CameraError::Unavailable(other.to_string()),
        }
    }
}
