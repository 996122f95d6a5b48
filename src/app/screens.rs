// SPDX-License-Identifier: GPL-3.0-only

//! Kiosk screen flow
//!
//! ```text
//! Start → Consent → Scan → Analyze → Result
//!   ↑                         │         │
//!   └──────── restart ────────┴─────────┘
//! ```

use crate::constants::{session, ui};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Kiosk screens in visiting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Start,
    Consent,
    Scan,
    Analyze,
    Result,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Start,
        Screen::Consent,
        Screen::Scan,
        Screen::Analyze,
        Screen::Result,
    ];

    /// Screens a restart can be issued from
    pub fn can_restart(&self) -> bool {
        matches!(self, Screen::Analyze | Screen::Result)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::Start => "start",
            Screen::Consent => "consent",
            Screen::Scan => "scan",
            Screen::Analyze => "analyze",
            Screen::Result => "result",
        };
        f.write_str(name)
    }
}

/// Step icon opacities
///
/// Each icon has its own dimmed weight; the result icon's artwork is darker
/// and needs a lighter dim to stay legible.
#[derive(Debug, Clone, PartialEq)]
pub struct StepIcons {
    active: f32,
    dimmed: [(Screen, f32); 4],
}

impl Default for StepIcons {
    fn default() -> Self {
        Self {
            active: ui::ICON_ACTIVE,
            dimmed: [
                (Screen::Consent, ui::ICON_DIM),
                (Screen::Scan, ui::ICON_DIM),
                (Screen::Analyze, ui::ICON_DIM),
                (Screen::Result, ui::ICON_DIM_DARK),
            ],
        }
    }
}

impl StepIcons {
    /// Opacity of `icon` while `current` is shown; `None` if the screen has no icon
    pub fn opacity(&self, current: Screen, icon: Screen) -> Option<f32> {
        let dimmed = self
            .dimmed
            .iter()
            .find(|(screen, _)| *screen == icon)
            .map(|(_, weight)| *weight)?;
        Some(if icon == current { self.active } else { dimmed })
    }

    /// All icons and their opacity for the current screen
    pub fn weights(&self, current: Screen) -> Vec<(Screen, f32)> {
        self.dimmed
            .iter()
            .map(|(screen, dim)| (*screen, if *screen == current { self.active } else { *dim }))
            .collect()
    }
}

/// Consent checkboxes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentForm {
    checked: Vec<bool>,
}

impl Default for ConsentForm {
    fn default() -> Self {
        Self::new(session::CONSENT_ITEMS)
    }
}

impl ConsentForm {
    pub fn new(items: usize) -> Self {
        Self {
            checked: vec![false; items],
        }
    }

    /// Tick or untick one item; out of range indices are ignored
    pub fn set(&mut self, index: usize, checked: bool) {
        if let Some(item) = self.checked.get_mut(index) {
            *item = checked;
        }
    }

    pub fn all_checked(&self) -> bool {
        self.checked.iter().all(|&c| c)
    }

    pub fn len(&self) -> usize {
        self.checked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checked.is_empty()
    }

    pub fn reset(&mut self) {
        self.checked.iter_mut().for_each(|c| *c = false);
    }
}

/// Analyze screen timer
///
/// A single fixed duration; the result screen follows once it has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzeStage {
    started: Instant,
    duration: Duration,
}

impl AnalyzeStage {
    pub fn new(started: Instant, duration: Duration) -> Self {
        Self { started, duration }
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }

    /// Progress in 0.0..=1.0 for the analyze animation
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }
}
