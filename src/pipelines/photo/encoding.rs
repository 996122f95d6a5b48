// SPDX-License-Identifier: GPL-3.0-only

//! Still encoding and saving
//!
//! Stills are kept as PNG so the image handed to downstream collaborators
//! decodes back to the exact captured pixels. Saving runs on the blocking
//! pool to keep the frame loop responsive.

use super::capture::CapturedStill;
use crate::errors::CaptureError;
use image::{ImageFormat, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Encode an RGBA image as PNG
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CaptureError> {
    let mut buffer = Vec::new();
    image.write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)?;
    debug!(size = buffer.len(), "PNG encoding complete");
    Ok(buffer)
}

/// Decode an encoded still back to RGBA
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, CaptureError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Paths written by [`save_still`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedStill {
    pub image_path: PathBuf,
    pub landmarks_path: PathBuf,
}

/// Save a still as `IMG_<timestamp>.png` plus its landmarks as JSON
pub async fn save_still(still: &CapturedStill, output_dir: &Path) -> Result<SavedStill, CaptureError> {
    let stem = format!("IMG_{}", still.captured_at.format("%Y%m%d_%H%M%S"));
    let image_path = output_dir.join(format!("{}.png", stem));
    let landmarks_path = output_dir.join(format!("{}.json", stem));

    info!(path = %image_path.display(), "Saving captured still");

    let image = still.image.clone();
    let landmarks = serde_json::to_vec(&still.landmarks)
        .map_err(|e| CaptureError::EncodingFailed(e.to_string()))?;
    let dir = output_dir.to_path_buf();
    let paths = SavedStill {
        image_path,
        landmarks_path,
    };
    let write_paths = paths.clone();

    tokio::task::spawn_blocking(move || {
        std::fs::create_dir_all(&dir)?;
        let png = encode_png(&image)?;
        std::fs::write(&write_paths.image_path, png)?;
        std::fs::write(&write_paths.landmarks_path, landmarks)?;
        Ok::<_, CaptureError>(())
    })
    .await
    .map_err(|e| CaptureError::SaveFailed(format!("Save task error: {}", e)))??;

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::frame_processor::types::{Landmark, LandmarkSet};
    use crate::pipelines::photo::capture::CaptureTrigger;
    use std::sync::Arc;

    #[test]
    fn test_png_round_trip_is_lossless() {
        let mut image = RgbaImage::new(4, 3);
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            *pixel = image::Rgba([x as u8 * 60, y as u8 * 80, 7, 255]);
        }

        let bytes = encode_png(&image).unwrap();
        assert_eq!(decode_image(&bytes).unwrap(), image);
    }

    #[tokio::test]
    async fn test_save_still_writes_image_and_landmarks() {
        let dir = std::env::temp_dir().join(format!("facemask-save-{}", uuid::Uuid::new_v4()));
        let still = CapturedStill {
            image: Arc::new(RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255]))),
            landmarks: LandmarkSet::new(vec![Landmark::new(0.5, 0.5)]),
            captured_at: chrono::Local::now(),
            trigger: CaptureTrigger::Manual,
        };

        let saved = save_still(&still, &dir).await.unwrap();
        assert!(saved.image_path.exists());

        let json = std::fs::read_to_string(&saved.landmarks_path).unwrap();
        let landmarks: LandmarkSet = serde_json::from_str(&json).unwrap();
        assert_eq!(landmarks, still.landmarks);

        let _ = std::fs::remove_dir_all(dir);
    }
}
