// SPDX-License-Identifier: GPL-3.0-only

//! Kiosk to projection messaging
//!
//! One-way and fire-and-forget. The kiosk holds an optional sender; when the
//! projection is closed (no sender, receiver dropped, or buffer full) a
//! message is dropped on the spot. Nothing is queued for later delivery, so
//! the first message after a reconnect reflects only current state.

use crate::app::frame_processor::types::LandmarkSet;
use crate::constants::session;
use futures::channel::mpsc;
use image::RgbaImage;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Messages understood by the projection surface
#[derive(Debug, Clone, PartialEq)]
pub enum SyncMessage {
    /// Blank the projection to opaque black
    Clear,
    /// Live landmarks for the projection's own camera feed
    UpdateFace { landmarks: LandmarkSet },
    /// Frozen capture; stays on screen until the next `Clear` or `UpdateFace`
    ShowResultFrame {
        image: Arc<RgbaImage>,
        landmarks: Option<LandmarkSet>,
    },
}

impl SyncMessage {
    /// Wire name of the message kind
    pub fn kind(&self) -> &'static str {
        match self {
            SyncMessage::Clear => "CLEAR",
            SyncMessage::UpdateFace { .. } => "UPDATE_FACE",
            SyncMessage::ShowResultFrame { .. } => "SHOW_RESULT_FRAME",
        }
    }
}

impl fmt::Display for SyncMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

pub type SyncSender = mpsc::Sender<SyncMessage>;
pub type SyncReceiver = mpsc::Receiver<SyncMessage>;

/// Open a new kiosk to projection link
pub fn projection_link() -> (SyncSender, SyncReceiver) {
    mpsc::channel(session::LINK_CAPACITY)
}

/// Kiosk end of the link
#[derive(Debug, Default)]
pub struct SyncChannel {
    link: Option<SyncSender>,
    sent: u64,
    dropped: u64,
}

impl SyncChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take hold of a (new) projection link and blank it
    pub fn acquire(&mut self, link: SyncSender) {
        debug!("Projection link acquired");
        self.link = Some(link);
        self.post(SyncMessage::Clear);
    }

    /// Kiosk regained focus; re-blank whatever projection is attached
    pub fn on_focus(&mut self) {
        self.post(SyncMessage::Clear);
    }

    /// Forget the current link
    pub fn release(&mut self) {
        self.link = None;
    }

    pub fn is_connected(&self) -> bool {
        self.link.as_ref().is_some_and(|link| !link.is_closed())
    }

    /// Send without waiting; returns whether the message was handed over
    pub fn post(&mut self, message: SyncMessage) -> bool {
        let Some(link) = self.link.as_mut() else {
            self.dropped += 1;
            trace!(kind = message.kind(), "No projection attached, message dropped");
            return false;
        };

        match link.try_send(message) {
            Ok(()) => {
                self.sent += 1;
                true
            }
            Err(e) => {
                self.dropped += 1;
                let disconnected = e.is_disconnected();
                let kind = e.into_inner().kind();
                if disconnected {
                    debug!(kind, "Projection closed, releasing link");
                    self.link = None;
                } else {
                    trace!(kind, "Projection busy, message dropped");
                }
                false
            }
        }
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
