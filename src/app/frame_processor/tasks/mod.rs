// SPDX-License-Identifier: GPL-3.0-only

//! Per-frame analysis stages
//!
//! detector (external) → mapper → alignment → stability

pub mod alignment;
pub mod detector;
pub mod mapper;
pub mod stability;

pub use alignment::{AlignmentThresholds, evaluate};
pub use detector::{DetectorOptions, LandmarkDetector, ScriptedDetector};
pub use mapper::CoordinateMapper;
pub use stability::{StabilityEvent, StabilityPolicy, StabilityTracker};
