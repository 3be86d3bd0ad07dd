//! Application entry point for the forest viewer.
//!
//! This binary parses the command line, loads the forest configuration,
//! sets up eframe/egui and delegates all interactive logic and rendering
//! to [`Viewer`] from the `viewer` module.

mod viewer;

use std::path::{Path, PathBuf};

use clap::Parser;
use grove_core::{config::Config, forest::parse_tree_count};
use tracing::{info, warn};
use viewer::Viewer;

#[derive(Parser)]
#[command(name = "grove")]
#[command(about = "Swaying trees with falling, decomposing leaves")]
struct Args {
    /// Configuration file (JSON); missing fields use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of trees to plant (falls back to the default if unusable)
    #[arg(short, long)]
    trees: Option<String>,

    /// Seed for a reproducible forest
    #[arg(short, long)]
    seed: Option<u64>,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Reads the config at `path`, falling back to defaults on any problem.
fn load_config(path: &Path) -> Config {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %path.display(), %err, "cannot read config, using defaults");
            return Config::default();
        }
    };
    match Config::from_json_str(&text) {
        Ok(cfg) => {
            info!(path = %path.display(), "loaded config");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "invalid config, using defaults");
            Config::default()
        }
    }
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut cfg = args.config.as_deref().map(load_config).unwrap_or_default();
    if let Some(trees) = &args.trees {
        cfg.tree_count = parse_tree_count(trees);
    }

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Grove",
        options,
        Box::new(move |_cc| Ok(Box::new(Viewer::new(cfg, args.seed)))),
    )
}
