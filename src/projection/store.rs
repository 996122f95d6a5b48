// SPDX-License-Identifier: GPL-3.0-only

//! Persistent projection calibration
//!
//! One named entry holds the whole transform record. It is read once at
//! startup and rewritten after every change. A failed write is logged and
//! otherwise ignored; the on-screen transform never waits for storage.

use super::transform::ProjectionTransform;
use crate::errors::CalibrationError;
use crate::storage::KeyValueStore;
use tracing::{debug, info, warn};

pub struct TransformStore {
    storage: Box<dyn KeyValueStore>,
    key: String,
    current: ProjectionTransform,
    css: String,
}

impl std::fmt::Debug for TransformStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformStore")
            .field("key", &self.key)
            .field("current", &self.current)
            .finish()
    }
}

impl TransformStore {
    /// Load the record under `key`, falling back to defaults
    pub fn load(storage: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let current = match read_record(storage.as_ref(), &key) {
            Ok(Some(transform)) => {
                info!(key = %key, "Loaded projection calibration");
                transform
            }
            Ok(None) => {
                debug!(key = %key, "No saved calibration, using defaults");
                ProjectionTransform::default()
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Unusable calibration, using defaults");
                ProjectionTransform::default()
            }
        };

        Self {
            storage,
            css: current.css(),
            key,
            current,
        }
    }

    pub fn current(&self) -> &ProjectionTransform {
        &self.current
    }

    /// CSS form of the current transform, refreshed on every change
    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Change the transform and persist it
    pub fn update(&mut self, change: impl FnOnce(&mut ProjectionTransform)) -> &ProjectionTransform {
        change(&mut self.current);
        self.css = self.current.css();
        self.persist_best_effort();
        &self.current
    }

    /// Restore and persist the defaults; does nothing unless `confirmed`
    pub fn reset(&mut self, confirmed: bool) -> bool {
        if !confirmed {
            debug!("Calibration reset cancelled");
            return false;
        }
        info!("Calibration reset to defaults");
        self.update(|t| *t = ProjectionTransform::default());
        true
    }

    /// Write the current record
    pub fn persist(&mut self) -> Result<(), CalibrationError> {
        let json = serde_json::to_string(&self.current)
            .map_err(|e| CalibrationError::Malformed(e.to_string()))?;
        self.storage
            .set(&self.key, &json)
            .map_err(|e| CalibrationError::Storage(e.to_string()))
    }

    fn persist_best_effort(&mut self) {
        if let Err(e) = self.persist() {
            warn!(key = %self.key, error = %e, "Failed to save calibration");
        }
    }
}

fn read_record(
    storage: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<ProjectionTransform>, CalibrationError> {
    let Some(raw) = storage
        .get(key)
        .map_err(|e| CalibrationError::Storage(e.to_string()))?
    else {
        return Ok(None);
    };

    let transform: ProjectionTransform =
        serde_json::from_str(&raw).map_err(|e| CalibrationError::Malformed(e.to_string()))?;
    if !transform.is_valid() {
        return Err(CalibrationError::Malformed(format!(
            "out of range values: {:?}",
            transform
        )));
    }
    Ok(Some(transform))
}
