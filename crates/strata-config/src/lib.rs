//! Configuration system for Strata terrain streaming.
//!
//! Plain configuration values persisted to disk as RON files. Supports CLI
//! overrides via clap, hot-reload detection, and ordering validation for the
//! lists whose consumers assume ascending input (regions, LOD presets).

mod cli;
mod config;
mod error;

pub use cli::{CliArgs, PreviewArg};
pub use config::{
    Config, CurveKey, DebugConfig, FalloffConfig, LodConfig, LodPresetConfig, NoiseConfig,
    NoiseKind, NoiseLayerConfig, RegionConfig, StreamingConfig, WorldConfig, default_config_dir,
};
pub use error::ConfigError;
