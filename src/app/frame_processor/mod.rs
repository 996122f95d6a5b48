// SPDX-License-Identifier: GPL-3.0-only

//! Frame processor for face alignment
//!
//! Camera frames go to the landmark detector one at a time. A frame that
//! arrives while the previous analysis is still pending is dropped rather
//! than queued, so results can never land out of order.

pub mod tasks;
pub mod types;

pub use tasks::{
    AlignmentThresholds, CoordinateMapper, DetectorOptions, LandmarkDetector, ScriptedDetector,
    StabilityEvent, StabilityPolicy, StabilityTracker, evaluate,
};
pub use types::{
    AlignmentVerdict, FaceBounds, GuideRegion, Landmark, LandmarkSet, NormalizedExtent,
};

use tracing::trace;
use uuid::Uuid;

/// Proof that a frame was admitted for analysis by a given scan session
///
/// Results must be handed back with their ticket; results whose ticket
/// belongs to an ended session are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket {
    pub(crate) session: Uuid,
    pub(crate) sequence: u64,
}

impl FrameTicket {
    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Admits one frame at a time
#[derive(Debug)]
pub struct FrameGate {
    session: Uuid,
    pending: Option<u64>,
    issued: u64,
    dropped: u64,
}

impl FrameGate {
    pub fn new(session: Uuid) -> Self {
        Self {
            session,
            pending: None,
            issued: 0,
            dropped: 0,
        }
    }

    /// Admit a frame unless one is still being analyzed
    pub fn try_admit(&mut self) -> Option<FrameTicket> {
        if self.pending.is_some() {
            self.dropped += 1;
            trace!(dropped = self.dropped, "Analysis pending, frame dropped");
            return None;
        }
        self.issued += 1;
        self.pending = Some(self.issued);
        Some(FrameTicket {
            session: self.session,
            sequence: self.issued,
        })
    }

    /// Release the gate for a returned ticket; false if the ticket is not the pending one
    pub fn complete(&mut self, ticket: &FrameTicket) -> bool {
        if ticket.session != self.session || self.pending != Some(ticket.sequence) {
            return false;
        }
        self.pending = None;
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Frames rejected because analysis was pending
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
