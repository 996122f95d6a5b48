// SPDX-License-Identifier: GPL-3.0-only

//! Face-alignment kiosk with a synchronized projection mask
//!
//! A visitor lines their face up with a guide box on the kiosk. Once the face
//! has held still long enough a still is captured; meanwhile a second surface
//! projects a masked, perspective-corrected view of the same face.
//!
//! # Architecture
//!
//! - [`app`]: kiosk screens, scan session, per-frame alignment pipeline
//! - [`backends`]: camera abstraction and the image-sequence camera
//! - [`pipelines`]: still capture and saving
//! - [`sync`]: one-way kiosk to projection messaging
//! - [`projection`]: calibration, masked rendering, perspective warp
//! - [`config`]: user configuration
//! - [`storage`]: key-value persistence for calibration

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;
pub mod projection;
pub mod storage;
pub mod sync;
pub mod terminal;

// Re-export commonly used types
pub use app::{KioskApp, Message, Screen};
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use projection::{ProjectionSurface, ProjectionTransform};
pub use sync::SyncMessage;
