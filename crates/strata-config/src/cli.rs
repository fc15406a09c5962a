//! Command-line argument parsing for Strata.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::Config;

/// Preview exports selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PreviewArg {
    /// Grayscale height image.
    NoiseMap,
    /// Region color image.
    ColorMap,
    /// One chunk mesh with its color texture.
    HeightMapSolo,
    /// Four chunk meshes at two LODs.
    HeightMap,
    /// Falloff mask image with four chunk meshes.
    FalloffMap,
}

/// Strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "strata", about = "Streamed LOD terrain from layered noise")]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// World edge length in world units.
    #[arg(long)]
    pub world_size: Option<u32>,

    /// World scale.
    #[arg(long)]
    pub scale: Option<f32>,

    /// Meshing worker threads (0 = auto).
    #[arg(long)]
    pub mesh_workers: Option<usize>,

    /// Re-evaluate LOD every tick.
    #[arg(long)]
    pub update_every_tick: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Export a preview instead of running the streaming session.
    #[arg(long, value_enum)]
    pub preview: Option<PreviewArg>,

    /// Output directory for preview exports.
    #[arg(long, default_value = "preview")]
    pub out: PathBuf,

    /// Number of streaming ticks to simulate.
    #[arg(long, default_value_t = 240)]
    pub ticks: u32,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(size) = args.world_size {
            self.world.world_size = size;
        }
        if let Some(scale) = args.scale {
            self.world.scale = scale;
        }
        if let Some(workers) = args.mesh_workers {
            self.streaming.mesh_workers = workers;
        }
        if let Some(every) = args.update_every_tick {
            self.lod.update_every_tick = every;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
