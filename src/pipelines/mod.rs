// SPDX-License-Identifier: GPL-3.0-only

//! Capture pipelines
//!
//! The kiosk only produces stills; there is no recording path.

pub mod photo;

pub use photo::{CapturePipeline, CaptureTrigger, CapturedStill};
