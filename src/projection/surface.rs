// SPDX-License-Identifier: GPL-3.0-only

//! Projection surface: message handling, calibration input, output frames
//!
//! The surface owns its renderer, its calibration and its own live camera.
//! It only borrows landmark geometry from the kiosk; on `UPDATE_FACE` it
//! masks whatever its own feed shows right now.

use super::calibration::{CalibrationCommand, command_for_key};
use super::renderer::ProjectionRenderer;
use super::store::TransformStore;
use crate::app::frame_processor::types::LandmarkSet;
use crate::backends::camera::CameraBackend;
use crate::sync::{SyncMessage, SyncReceiver};
use crossterm::event::KeyEvent;
use futures::StreamExt;
use image::RgbaImage;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the canvas currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum Showing {
    Blank,
    /// Live feed masked by the latest landmarks
    Live { landmarks: LandmarkSet },
    /// Frozen capture, held until the next `Clear` or `UpdateFace`
    Result {
        image: Arc<RgbaImage>,
        masked: bool,
    },
}

pub struct ProjectionSurface {
    renderer: ProjectionRenderer,
    store: TransformStore,
    feed: Option<Box<dyn CameraBackend>>,
    guide_visible: bool,
    showing: Showing,
    handled: u64,
}

impl std::fmt::Debug for ProjectionSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectionSurface")
            .field("store", &self.store)
            .field("has_feed", &self.feed.is_some())
            .field("guide_visible", &self.guide_visible)
            .field("handled", &self.handled)
            .finish()
    }
}

impl ProjectionSurface {
    /// Create the surface and start its camera
    ///
    /// A camera that fails to start is logged and left out; live updates
    /// then draw nothing inside the mask.
    pub fn new(
        renderer: ProjectionRenderer,
        store: TransformStore,
        mut feed: Option<Box<dyn CameraBackend>>,
    ) -> Self {
        if let Some(camera) = feed.as_mut()
            && let Err(e) = camera.start()
        {
            warn!(error = %e, "Projection camera failed to start");
            feed = None;
        }

        info!(css = %store.css(), "Projection surface ready");

        Self {
            renderer,
            store,
            feed,
            guide_visible: false,
            showing: Showing::Blank,
            handled: 0,
        }
    }

    /// Apply one kiosk message
    pub fn handle(&mut self, message: SyncMessage) {
        self.handled += 1;
        debug!(kind = message.kind(), "Projection message");

        match message {
            SyncMessage::Clear => {
                self.renderer.clear();
                self.showing = Showing::Blank;
            }
            SyncMessage::UpdateFace { landmarks } => {
                match self.live_image() {
                    Some(image) => {
                        self.renderer.draw_masked(&image, &landmarks);
                    }
                    None => self.renderer.clear(),
                }
                self.showing = Showing::Live { landmarks };
            }
            SyncMessage::ShowResultFrame { image, landmarks } => {
                let masked = match &landmarks {
                    Some(landmarks) => self.renderer.draw_masked(&image, landmarks),
                    None => {
                        self.renderer.draw_unclipped(&image);
                        false
                    }
                };
                self.showing = Showing::Result { image, masked };
            }
        }
    }

    fn live_image(&mut self) -> Option<RgbaImage> {
        let camera = self.feed.as_mut()?;
        if camera.poll_frame().is_none() {
            debug!("No new projection camera frame, reusing last");
        }
        camera.current_frame()?.to_rgba_image()
    }

    /// Apply a calibration key; `confirm` is asked only for a reset
    pub fn handle_key(
        &mut self,
        key: &KeyEvent,
        confirm: impl FnOnce() -> bool,
    ) -> Option<CalibrationCommand> {
        let command = command_for_key(key)?;
        match command {
            CalibrationCommand::Adjust(adjustment) => {
                self.store.update(|t| adjustment.apply(t));
            }
            CalibrationCommand::ToggleGuide => {
                self.guide_visible = !self.guide_visible;
                debug!(visible = self.guide_visible, "Guide overlay toggled");
            }
            CalibrationCommand::Reset => {
                self.store.reset(confirm());
            }
            CalibrationCommand::LogCurrent => {
                info!(record = ?self.store.current(), css = %self.store.css(), "Current calibration");
            }
        }
        Some(command)
    }

    /// Output frame: the canvas warped by the current calibration
    pub fn frame(&self) -> RgbaImage {
        self.renderer.present(self.store.current(), self.guide_visible)
    }

    pub fn canvas(&self) -> &RgbaImage {
        self.renderer.canvas()
    }

    pub fn showing(&self) -> &Showing {
        &self.showing
    }

    pub fn store(&self) -> &TransformStore {
        &self.store
    }

    pub fn guide_visible(&self) -> bool {
        self.guide_visible
    }

    pub fn handled(&self) -> u64 {
        self.handled
    }

    /// Handle messages until the kiosk drops its end of the link
    pub async fn run(mut self, mut messages: SyncReceiver) -> Self {
        while let Some(message) = messages.next().await {
            self.handle(message);
        }
        info!(handled = self.handled, "Projection link closed");
        if let Some(camera) = self.feed.as_mut()
            && !camera.try_stop()
        {
            warn!("Projection camera could not be stopped");
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::frame_processor::types::Landmark;
    use crate::backends::camera::{CameraFrame, SequenceCamera};
    use crate::projection::transform::ProjectionTransform;
    use crate::storage::MemoryStore;
    use crate::sync::projection_link;
    use crossterm::event::{KeyCode, KeyModifiers};
    use image::Rgba;

    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    /// Outline loop over a small square, indices 0..4
    fn square(min: f32, max: f32) -> LandmarkSet {
        LandmarkSet::new(vec![
            Landmark::new(min, min),
            Landmark::new(max, min),
            Landmark::new(max, max),
            Landmark::new(min, max),
        ])
    }

    fn surface(storage: MemoryStore) -> ProjectionSurface {
        let renderer = ProjectionRenderer::new(40, 40).with_outline(vec![0, 1, 2, 3, 0]);
        let store = TransformStore::load(Box::new(storage), "projSettings");
        let feed = SequenceCamera::from_frames(vec![CameraFrame::solid(8, 8, BLUE)]);
        ProjectionSurface::new(renderer, store, Some(Box::new(feed)))
    }

    #[test]
    fn test_clear_then_update_draws_live_mask() {
        let mut surface = surface(MemoryStore::new());
        surface.handle(SyncMessage::Clear);
        surface.handle(SyncMessage::UpdateFace {
            landmarks: square(0.25, 0.75),
        });

        assert_eq!(surface.canvas().get_pixel(20, 20).0, BLUE);
        assert_eq!(*surface.canvas().get_pixel(2, 2), BLACK);
        assert!(matches!(surface.showing(), Showing::Live { .. }));
    }

    #[test]
    fn test_result_frame_persists_until_next_message() {
        let mut surface = surface(MemoryStore::new());
        let still = Arc::new(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])));
        surface.handle(SyncMessage::ShowResultFrame {
            image: still.clone(),
            landmarks: Some(square(0.25, 0.75)),
        });

        assert_eq!(surface.canvas().get_pixel(20, 20).0, [255, 0, 0, 255]);
        assert_eq!(*surface.canvas().get_pixel(2, 2), BLACK);
        assert_eq!(
            *surface.showing(),
            Showing::Result {
                image: still,
                masked: true
            }
        );

        surface.handle(SyncMessage::UpdateFace {
            landmarks: square(0.25, 0.75),
        });
        assert_eq!(surface.canvas().get_pixel(20, 20).0, BLUE);
    }

    #[test]
    fn test_result_without_landmarks_is_unclipped() {
        let mut surface = surface(MemoryStore::new());
        surface.handle(SyncMessage::ShowResultFrame {
            image: Arc::new(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]))),
            landmarks: None,
        });
        assert_eq!(surface.canvas().get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_keys_update_and_persist() {
        let storage = MemoryStore::new();
        let mut surface = surface(storage.clone());

        surface.handle_key(&KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT), || false);
        surface.handle_key(&KeyEvent::new(KeyCode::Char('g'), KeyModifiers::NONE), || false);

        assert_eq!(surface.store().current().x, 10.0);
        assert!(surface.guide_visible());

        let reloaded = TransformStore::load(Box::new(storage), "projSettings");
        assert_eq!(reloaded.current().x, 10.0);
    }

    #[test]
    fn test_reset_key_asks_for_confirmation() {
        let mut surface = surface(MemoryStore::new());
        surface.handle_key(&KeyEvent::new(KeyCode::Up, KeyModifiers::NONE), || true);

        let reset = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE);
        surface.handle_key(&reset, || false);
        assert_eq!(surface.store().current().y, -1.0);

        surface.handle_key(&reset, || true);
        assert_eq!(*surface.store().current(), ProjectionTransform::default());
    }

    #[tokio::test]
    async fn test_run_until_link_closes() {
        let (mut tx, rx) = projection_link();
        let task = tokio::spawn(surface(MemoryStore::new()).run(rx));

        tx.try_send(SyncMessage::Clear).unwrap();
        tx.try_send(SyncMessage::UpdateFace {
            landmarks: square(0.25, 0.75),
        })
        .unwrap();
        drop(tx);

        let surface = task.await.unwrap();
        assert_eq!(surface.handled(), 2);
        assert_eq!(surface.canvas().get_pixel(20, 20).0, BLUE);
    }
}
