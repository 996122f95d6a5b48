// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the kiosk and projection surfaces
//!
//! None of these reach a visitor: the kiosk turns them into hint text or
//! silent no-ops and they only show up in logs and CLI exit codes.

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera-related errors
    Camera(CameraError),
    /// Still capture errors
    Capture(CaptureError),
    /// Projection calibration errors
    Calibration(CalibrationError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Camera-specific errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// The visitor or the OS refused camera access
    PermissionDenied,
    /// No usable camera source
    Unavailable(String),
}

/// Still capture errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// No aligned face to freeze
    NoFaceLocked,
    /// No video frame to snapshot
    SourceUnavailable,
    /// Encoding the still failed
    EncodingFailed(String),
    /// Writing the still failed
    SaveFailed(String),
}

/// Persisted calibration errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalibrationError {
    /// The record could not be read or written
    Storage(String),
    /// The record exists but does not describe a usable transform
    Malformed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Calibration(e) => write!(f, "Calibration error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::PermissionDenied => write!(f, "Camera permission denied"),
            CameraError::Unavailable(msg) => write!(f, "Camera unavailable: {}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::NoFaceLocked => write!(f, "No aligned face to capture"),
            CaptureError::SourceUnavailable => write!(f, "Video source unavailable"),
            CaptureError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            CaptureError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::Storage(msg) => write!(f, "Calibration storage: {}", msg),
            CalibrationError::Malformed(msg) => write!(f, "Malformed calibration: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for CaptureError {}
impl std::error::Error for CalibrationError {}

impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<CalibrationError> for AppError {
    fn from(err: CalibrationError) -> Self {
        AppError::Calibration(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::SaveFailed(err.to_string())
    }
}

impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        CaptureError::EncodingFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_errors_wrap_into_app_error() {
        let err: AppError = CaptureError::SourceUnavailable.into();
        assert!(matches!(err, AppError::Capture(CaptureError::SourceUnavailable)));
        assert_eq!(err.to_string(), "Capture error: Video source unavailable");
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
