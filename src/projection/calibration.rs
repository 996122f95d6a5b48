// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard calibration bindings
//!
//! | Key | Effect |
//! |---|---|
//! | arrows | move 1 px (Shift: 10 px) |
//! | `+` `=` / `-` `_` | scale up / down |
//! | `]` / `[` | stretch / squash vertically |
//! | `W` / `S` | tilt away / upright |
//! | `D` / `A` | turn right / left |
//! | `E` / `Q` | roll right / left |
//! | `G` | toggle guide overlay |
//! | `R` | reset (asks first) |
//! | `Enter` | log the current record |
//!
//! Rotation keys step 0.2 degrees, or 2 with Shift held (an uppercase
//! letter counts as Shift).

use super::transform::ProjectionTransform;
use crate::constants::calibration::{
    MOVE_STEP, MOVE_STEP_FAST, ROTATE_STEP, ROTATE_STEP_FAST, SCALE_STEP,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Field of the transform record a key adjusts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformField {
    X,
    Y,
    Scale,
    ScaleY,
    RotateX,
    RotateY,
    RotateZ,
}

/// Signed step applied to one field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    pub field: TransformField,
    pub delta: f32,
}

impl Adjustment {
    pub fn apply(&self, transform: &mut ProjectionTransform) {
        let value = match self.field {
            TransformField::X => &mut transform.x,
            TransformField::Y => &mut transform.y,
            TransformField::Scale => &mut transform.scale,
            TransformField::ScaleY => &mut transform.scale_y,
            TransformField::RotateX => &mut transform.rotate_x,
            TransformField::RotateY => &mut transform.rotate_y,
            TransformField::RotateZ => &mut transform.rotate_z,
        };
        *value += self.delta;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationCommand {
    Adjust(Adjustment),
    ToggleGuide,
    Reset,
    LogCurrent,
}

/// Translate a key press into a calibration command
pub fn command_for_key(key: &KeyEvent) -> Option<CalibrationCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let shift = key.modifiers.contains(KeyModifiers::SHIFT)
        || matches!(key.code, KeyCode::Char(c) if c.is_ascii_uppercase());
    let step = if shift { MOVE_STEP_FAST } else { MOVE_STEP };
    let turn = if shift { ROTATE_STEP_FAST } else { ROTATE_STEP };

    let adjust = |field, delta| Some(CalibrationCommand::Adjust(Adjustment { field, delta }));

    match key.code {
        KeyCode::Up => adjust(TransformField::Y, -step),
        KeyCode::Down => adjust(TransformField::Y, step),
        KeyCode::Left => adjust(TransformField::X, -step),
        KeyCode::Right => adjust(TransformField::X, step),
        KeyCode::Enter => Some(CalibrationCommand::LogCurrent),
        KeyCode::Char(c) => match c {
            '+' | '=' => adjust(TransformField::Scale, SCALE_STEP),
            '-' | '_' => adjust(TransformField::Scale, -SCALE_STEP),
            '[' => adjust(TransformField::ScaleY, -SCALE_STEP),
            ']' => adjust(TransformField::ScaleY, SCALE_STEP),
            'w' | 'W' => adjust(TransformField::RotateX, turn),
            's' | 'S' => adjust(TransformField::RotateX, -turn),
            'a' | 'A' => adjust(TransformField::RotateY, -turn),
            'd' | 'D' => adjust(TransformField::RotateY, turn),
            'q' | 'Q' => adjust(TransformField::RotateZ, -turn),
            'e' | 'E' => adjust(TransformField::RotateZ, turn),
            'g' | 'G' => Some(CalibrationCommand::ToggleGuide),
            'r' | 'R' => Some(CalibrationCommand::Reset),
            _ => None,
        },
        _ => None,
    }
}
