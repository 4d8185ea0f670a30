mod app;
mod color;
mod data;
mod hexbin;
mod interaction;
mod state;
mod ui;

use app::PickupExplorerApp;
use clap::Parser;
use data::loader::{DATA_URL, DEFAULT_MAX_ROWS, DataSource};
use eframe::egui;
use state::AppState;

/// Interactive explorer for NYC ride pickups.
#[derive(Debug, Parser)]
#[command(name = "pickup-explorer", version, about)]
struct Args {
    /// CSV, CSV.gz, JSON or Parquet file, or an http(s) URL to one.
    #[arg(long, env = "PICKUPS_SOURCE", default_value = DATA_URL)]
    source: String,

    /// Number of rows to read from the source.
    #[arg(long, env = "PICKUPS_ROWS", default_value_t = DEFAULT_MAX_ROWS)]
    rows: usize,
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();

    let source = DataSource::parse(&args.source);
    let mut state = AppState::new(source.clone(), args.rows);
    state.load(source);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Uber pickups in NYC",
        options,
        Box::new(move |_cc| Ok(Box::new(PickupExplorerApp::new(state)))),
    )
}
