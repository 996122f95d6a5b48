// SPDX-License-Identifier: GPL-3.0-only

//! Still capture pipeline
//!
//! ```text
//! Camera frame + locked landmarks → Capture → CapturedStill
//!                                               ├─→ projection (SHOW_RESULT_FRAME)
//!                                               ├─→ analysis collaborator
//!                                               └─→ optional PNG + JSON on disk
//! ```
//!
//! At most one still is live per kiosk session; a new capture replaces the
//! previous one and a restart clears it.

pub mod capture;
pub mod encoding;

pub use capture::{CapturePipeline, CaptureTrigger, CapturedStill};
pub use encoding::{SavedStill, decode_image, encode_png, save_still};

use tracing::info;

/// Downstream consumer of captured stills (scoring, result rendering)
pub trait AnalysisSink: Send {
    fn analyze(&mut self, still: &CapturedStill);
}

/// Sink that only records the hand-off in the log
#[derive(Debug, Default)]
pub struct LoggingAnalysisSink {
    handed_off: usize,
}

impl LoggingAnalysisSink {
    pub fn handed_off(&self) -> usize {
        self.handed_off
    }
}

impl AnalysisSink for LoggingAnalysisSink {
    fn analyze(&mut self, still: &CapturedStill) {
        self.handed_off += 1;
        info!(
            width = still.image.width(),
            height = still.image.height(),
            points = still.landmarks.len(),
            "Still handed to analysis"
        );
    }
}
