// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! Both surfaces own a camera: the kiosk feeds its frames to the landmark
//! detector and snapshots them on capture, the projection draws its own feed
//! inside the live mask.
//!
//! ```text
//! ┌──────────────────┐      ┌──────────────────┐
//! │ Kiosk (scan)     │      │ Projection       │
//! └────────┬─────────┘      └────────┬─────────┘
//!          ▼                         ▼
//! ┌─────────────────────────────────────────────┐
//! │            CameraBackend trait              │
//! └──────────────────────┬──────────────────────┘
//!                        ▼
//!                ┌───────────────┐
//!                │ SequenceCamera│  ← image file / directory
//!                └───────────────┘
//! ```

pub mod file_source;
pub mod types;

pub use file_source::{SequenceCamera, load_image_as_frame};
pub use types::*;

/// Common camera interface
pub trait CameraBackend: Send {
    /// Start delivering frames
    ///
    /// Failures such as a denied permission are returned so the caller can
    /// show a hint; they are never fatal.
    fn start(&mut self) -> BackendResult<()>;

    /// Attempt to stop the camera
    ///
    /// Returns `false` when the backend cannot be stopped cleanly; callers
    /// must then gate frame handling on their own session flag instead.
    fn try_stop(&mut self) -> bool;

    /// Whether `start` succeeded and no stop has happened since
    fn is_running(&self) -> bool;

    /// Advance to and return the next frame, `None` when nothing is available
    fn poll_frame(&mut self) -> Option<CameraFrame>;

    /// Most recently delivered frame
    fn current_frame(&self) -> Option<&CameraFrame>;
}
