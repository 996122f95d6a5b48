// SPDX-License-Identifier: GPL-3.0-only

//! Consecutive-alignment counter that triggers the automatic capture
//!
//! The default policy counts frames, so capture latency follows the camera
//! rate: 100 frames is about four seconds at 25 fps and about three at 30.
//! `StabilityPolicy::ElapsedMs` fires on held time instead; the counter is
//! still kept per frame for hints.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::trace;

/// When a held alignment fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StabilityPolicy {
    /// Fire on the Nth consecutive aligned frame
    Frames(u32),
    /// Fire on the first aligned frame at least this long after the run began
    ElapsedMs(u64),
}

impl StabilityPolicy {
    pub fn is_valid(&self) -> bool {
        match self {
            StabilityPolicy::Frames(n) => *n > 0,
            StabilityPolicy::ElapsedMs(_) => true,
        }
    }
}

/// Result of feeding one frame to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilityEvent {
    /// Frame was not aligned; the counter is back to zero
    Reset,
    /// Aligned frame; counter after incrementing
    Holding(u32),
    /// Threshold reached; the counter has already been reset
    Fire,
}

/// Single-counter automaton
#[derive(Debug, Clone)]
pub struct StabilityTracker {
    policy: StabilityPolicy,
    counter: u32,
    run_started: Option<Instant>,
}

impl StabilityTracker {
    pub fn new(policy: StabilityPolicy) -> Self {
        Self {
            policy,
            counter: 0,
            run_started: None,
        }
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn policy(&self) -> StabilityPolicy {
        self.policy
    }

    /// Feed one frame's verdict
    pub fn observe(&mut self, aligned: bool, now: Instant) -> StabilityEvent {
        if !aligned {
            self.reset();
            return StabilityEvent::Reset;
        }

        self.counter += 1;
        let run_started = *self.run_started.get_or_insert(now);

        let fire = match self.policy {
            StabilityPolicy::Frames(threshold) => self.counter >= threshold,
            StabilityPolicy::ElapsedMs(ms) => {
                now.saturating_duration_since(run_started) >= Duration::from_millis(ms)
            }
        };

        if fire {
            trace!(frames = self.counter, "Stability threshold reached");
            self.reset();
            StabilityEvent::Fire
        } else {
            StabilityEvent::Holding(self.counter)
        }
    }

    pub fn reset(&mut self) {
        self.counter = 0;
        self.run_started = None;
    }
}
