// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Replaying recorded frames and detector output through the kiosk
//! - Calibrating the projection in the terminal
//! - Inspecting and resetting the stored calibration

use facemask::app::frame_processor::{LandmarkDetector, ScriptedDetector};
use facemask::backends::camera::SequenceCamera;
use facemask::config::Config;
use facemask::pipelines::photo::{LoggingAnalysisSink, save_still};
use facemask::projection::{TransformStore, open_surface};
use facemask::storage::{JsonFileStore, default_capture_dir};
use facemask::sync::{SyncMessage, projection_link};
use facemask::{KioskApp, Message, Screen};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Arguments for [`replay`]
pub struct ReplayOptions {
    pub camera: PathBuf,
    pub landmarks: PathBuf,
    pub fps: u32,
    pub save_dir: Option<PathBuf>,
    pub projection_camera: Option<PathBuf>,
    pub projection_out: Option<PathBuf>,
    pub once: bool,
}

/// Drive the kiosk from recorded frames until a still is captured
pub fn replay(config: &Config, options: ReplayOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut camera = SequenceCamera::from_path(&options.camera)?;
    if options.once {
        camera = camera.once();
    }
    println!("Camera: {} frame(s) from {}", camera.len(), options.camera.display());

    let projection_source = options.projection_camera.as_ref().unwrap_or(&options.camera);
    let projection_feed = SequenceCamera::from_path(projection_source)?;

    let mut detector =
        ScriptedDetector::from_path(&options.landmarks)?.with_options(config.scan.detector);
    println!("Detector script: {} frame(s)", detector.remaining());

    // Set up Ctrl+C handler
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();
    ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::SeqCst);
    })?;

    let frame_interval = Duration::from_secs_f64(1.0 / options.fps.max(1) as f64);
    let save_dir = options.save_dir.clone().unwrap_or_else(default_capture_dir);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let (link, messages) = projection_link();
        let surface = open_surface(&config.projection, Some(Box::new(projection_feed)));
        let projection = tokio::spawn(surface.run(messages));

        let mut app = KioskApp::new(config.clone(), Box::new(LoggingAnalysisSink::default()));
        app.attach_camera(Box::new(camera));
        app.attach_projection(link);

        app.update(Message::Navigate(Screen::Consent));
        for index in 0..app.consent().len() {
            app.update(Message::SetConsent {
                index,
                checked: true,
            });
        }
        app.update(Message::Navigate(Screen::Scan));

        let mut interval = tokio::time::interval(frame_interval);
        let mut last_hint = None;

        while !stop.load(Ordering::SeqCst) {
            interval.tick().await;

            match app.screen() {
                Screen::Scan => {
                    if detector.remaining() == 0 {
                        println!("Detector script exhausted without a capture");
                        break;
                    }
                    if app.hint().is_some_and(|h| h.is_camera_error()) {
                        println!("{}", app.hint().map(|h| h.message()).unwrap_or_default());
                        break;
                    }
                    match app.next_frame() {
                        Some((ticket, frame)) => {
                            let detection = detector.detect(&frame)?;
                            app.on_face_results(ticket, detection, Instant::now());
                        }
                        None if options.once => {
                            println!("Camera frames exhausted without a capture");
                            break;
                        }
                        None => {}
                    }
                }
                Screen::Analyze => {
                    if let Some(progress) = app.analyze_progress(Instant::now()) {
                        print!("\rAnalyzing... {:>3.0}%", progress * 100.0);
                        let _ = std::io::stdout().flush();
                    }
                    app.update(Message::Tick(Instant::now()));
                }
                Screen::Result => {
                    println!();
                    break;
                }
                Screen::Start | Screen::Consent => break,
            }

            if app.hint() != last_hint {
                last_hint = app.hint();
                if let Some(hint) = last_hint {
                    println!("{}", hint);
                }
            }
        }

        if let Some(still) = app.captured_still() {
            let saved = save_still(still, &save_dir).await?;
            println!("Still saved: {}", saved.image_path.display());
            println!("Landmarks saved: {}", saved.landmarks_path.display());
        } else {
            println!("No still captured");
        }

        // Dropping the kiosk closes the link and lets the projection finish
        drop(app);
        let surface = projection.await?;

        if let Some(path) = options.projection_out.as_ref() {
            surface.frame().save(path)?;
            println!("Projection output saved: {}", path.display());
        }

        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

/// Interactive calibration in the terminal
pub fn calibrate(
    config: &Config,
    image: Option<&Path>,
    snapshot: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut surface = open_surface(&config.projection, None);

    if let Some(path) = image {
        let image = image::open(path)?.to_rgba8();
        surface.handle(SyncMessage::ShowResultFrame {
            image: Arc::new(image),
            landmarks: None,
        });
    }

    let surface = facemask::terminal::run_calibration(surface)?;

    if let Some(path) = snapshot {
        surface.frame().save(path)?;
        println!("Projection output saved: {}", path.display());
    }
    println!("{}", surface.store().css());
    Ok(())
}

/// Print the stored calibration as JSON and as a CSS transform
pub fn show_transform(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config);
    println!("{}", serde_json::to_string_pretty(store.current())?);
    println!("{}", store.css());
    Ok(())
}

/// Reset the stored calibration, asking first unless `yes`
pub fn reset_transform(config: &Config, yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(config);

    let confirmed = if yes {
        true
    } else {
        print!("Reset projection calibration to defaults? [y/N] ");
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        matches!(answer.trim(), "y" | "Y" | "yes")
    };

    if store.reset(confirmed) {
        store.persist()?;
        println!("Calibration reset: {}", store.css());
    } else {
        println!("Calibration unchanged");
    }
    Ok(())
}

fn open_store(config: &Config) -> TransformStore {
    TransformStore::load(
        Box::new(JsonFileStore::new(config.projection.data_dir())),
        config.projection.storage_key.clone(),
    )
}
