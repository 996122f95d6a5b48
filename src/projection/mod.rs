// SPDX-License-Identifier: GPL-3.0-only

//! Projection surface
//!
//! ```text
//! SyncMessage ──→ ProjectionSurface::handle ──→ ProjectionRenderer (masked canvas)
//!                         ▲                              │
//!   key presses ──→ calibration ──→ TransformStore ──→ present() ──→ output frame
//! ```

pub mod calibration;
pub mod renderer;
pub mod store;
pub mod surface;
pub mod transform;

pub use calibration::{Adjustment, CalibrationCommand, TransformField, command_for_key};
pub use renderer::ProjectionRenderer;
pub use store::TransformStore;
pub use surface::{ProjectionSurface, Showing};
pub use transform::ProjectionTransform;

use crate::backends::camera::CameraBackend;
use crate::config::ProjectionSettings;
use crate::storage::JsonFileStore;

/// Build a surface from settings, with calibration kept in the data directory
pub fn open_surface(
    settings: &ProjectionSettings,
    feed: Option<Box<dyn CameraBackend>>,
) -> ProjectionSurface {
    let store = TransformStore::load(
        Box::new(JsonFileStore::new(settings.data_dir())),
        settings.storage_key.clone(),
    );
    let renderer = ProjectionRenderer::new(settings.canvas_width, settings.canvas_height);
    ProjectionSurface::new(renderer, store, feed)
}
