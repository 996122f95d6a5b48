// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use facemask::Config;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "facemask")]
#[command(about = "Face-alignment kiosk with a calibrated projection mask")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Config file (default: ~/.config/facemask/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the kiosk against recorded frames and detector output
    Replay {
        /// Image file or directory of images to use as the camera
        #[arg(long)]
        camera: PathBuf,

        /// Detector output, one JSON line per frame (`null` for no face)
        #[arg(long)]
        landmarks: PathBuf,

        /// Frames per second
        #[arg(long, default_value = "25")]
        fps: u32,

        /// Directory for the captured still (default: ~/Pictures/facemask)
        #[arg(short, long)]
        save_dir: Option<PathBuf>,

        /// Image file or directory used as the projection's own camera
        /// (default: same as --camera)
        #[arg(long)]
        projection_camera: Option<PathBuf>,

        /// Write the final projection output to this PNG
        #[arg(long)]
        projection_out: Option<PathBuf>,

        /// Play the camera frames once instead of looping
        #[arg(long)]
        once: bool,
    },

    /// Calibrate the projection interactively in the terminal
    Calibrate {
        /// Image to project while calibrating
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Write the projection output to this PNG on exit
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
    },

    /// Print the stored projection calibration
    ShowTransform,

    /// Reset the stored projection calibration to defaults
    ResetTransform {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=facemask=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref());

    match cli.command {
        Commands::Replay {
            camera,
            landmarks,
            fps,
            save_dir,
            projection_camera,
            projection_out,
            once,
        } => cli::replay(
            &config,
            cli::ReplayOptions {
                camera,
                landmarks,
                fps,
                save_dir,
                projection_camera,
                projection_out,
                once,
            },
        ),
        Commands::Calibrate { image, snapshot } => {
            cli::calibrate(&config, image.as_deref(), snapshot.as_deref())
        }
        Commands::ShowTransform => cli::show_transform(&config),
        Commands::ResetTransform { yes } => cli::reset_transform(&config, yes),
    }
}
