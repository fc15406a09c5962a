//! The `strata` binary: exports editor previews or runs a headless
//! streaming session against a scripted viewer.

mod export;
mod session;

use clap::Parser;
use strata_config::{CliArgs, Config, default_config_dir};
use tracing::{error, info};

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let outcome = match args.preview {
        Some(arg) => export::export_preview(&config, export::preview_mode(arg), &args.out)
            .map(|files| info!(files = files.len(), out = %args.out.display(), "preview exported")),
        None => session::run(&config, args.ticks)
            .map(|summary| info!(?summary, "session finished"))
            .map_err(export::ExportError::from),
    };

    if let Err(e) = outcome {
        error!("{e}");
        std::process::exit(1);
    }
}
