mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use eframe::egui;

use app::CinemetricsApp;
use cinemetrics::config::Settings;

/// Interactive movie analytics dashboard.
#[derive(Parser, Debug)]
#[command(name = "cinemetrics")]
struct CliArgs {
    /// Dataset to open at start-up; defaults to the configured data path.
    path: Option<PathBuf>,

    /// Settings file (JSON).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let settings = Settings::load(args.config.as_deref())?;
    let initial = args.path.unwrap_or_else(|| settings.data_path.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CineMetrics – Movie Analytics",
        options,
        Box::new(move |_cc| Ok(Box::new(CinemetricsApp::new(settings, &initial)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("running the dashboard")
}
