// SPDX-License-Identifier: GPL-3.0-only

//! Capture backends
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │        Kiosk            Projection          │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              CameraBackend                  │
//! │  ┌──────────────────────────────────────┐   │
//! │  │ SequenceCamera (image / directory)   │   │
//! │  └──────────────────────────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```

pub mod camera;
