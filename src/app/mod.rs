// SPDX-License-Identifier: GPL-3.0-only

//! Visitor-facing kiosk
//!
//! # Architecture
//!
//! - `frame_processor`: landmark types, coordinate mapping, alignment,
//!   stability counting, detector interface, one-at-a-time frame gate
//! - `scan_session`: state owned by one visit to the scan screen
//! - `screens`: screen flow, consent form, analyze timing, step icons
//! - `state`: `KioskApp` and its `Message` type
//! - `update`: screen hooks, per-frame pipeline, capture
//!
//! # Frame flow
//!
//! ```text
//! camera ─→ next_frame() ─→ detector ─→ on_face_results()
//!                                          ├─ Tracking ─→ UPDATE_FACE
//!                                          └─ Locked ──→ capture ─→ SHOW_RESULT_FRAME ─→ analyze
//! ```

pub mod frame_processor;
pub mod scan_session;
pub mod screens;
mod state;
mod update;

pub use scan_session::{FrameOutcome, ScanHint, ScanSession};
pub use screens::{AnalyzeStage, ConsentForm, Screen, StepIcons};
pub use state::{KioskApp, Message};
