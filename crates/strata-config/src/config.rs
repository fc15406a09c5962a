//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level terrain configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// World extent, seed and chunk sizing.
    pub world: WorldConfig,
    /// Noise layers and height shaping.
    pub noise: NoiseConfig,
    /// Color regions, ascending by threshold.
    pub regions: Vec<RegionConfig>,
    /// LOD presets and re-evaluation policy.
    pub lod: LodConfig,
    /// Background meshing settings.
    pub streaming: StreamingConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// World layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Random seed for noise offsets and permutation tables.
    pub seed: u64,
    /// World edge length in world units (before dividing by `scale`).
    pub world_size: u32,
    /// Uniform world scale applied to chunk meshes and viewer positions.
    pub scale: f32,
    /// Chunk edge length in height-field cells. Must be divisible by every LOD stride.
    pub chunk_size: u32,
}

/// Kind of noise a layer contributes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum NoiseKind {
    /// Plain fractal Perlin noise.
    #[default]
    Smooth,
    /// Ridged noise (`1 - |perlin|` per octave).
    Ridged,
}

/// One additive noise layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseLayerConfig {
    /// Noise kind.
    pub kind: NoiseKind,
    /// Octave count. Negative values are treated as zero.
    pub octaves: i32,
    /// Amplitude decay per octave (0.0 - 1.0).
    pub persistence: f32,
    /// Frequency growth per octave (>= 1.0).
    pub lacunarity: f32,
    /// Base scale of the first octave (> 0.0).
    pub scale: f32,
    /// Weight of this layer in the shared accumulator.
    pub strength: f32,
    /// Disabled layers contribute nothing.
    pub enabled: bool,
    /// Coordinate offset added to every octave sample.
    pub offset: [f32; 2],
}

/// Radial/square falloff mask subtracted after normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FalloffConfig {
    /// Apply the mask.
    pub enabled: bool,
    /// Transition sharpness (`a` in `v^a / (v^a + (b - bv)^a)`).
    pub transition: f32,
    /// Transition bias (`b`).
    pub bias: f32,
}

/// A single key of the height curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CurveKey {
    /// Input height (0.0 - 1.0).
    pub time: f32,
    /// Output value.
    pub value: f32,
}

/// Noise synthesis and height shaping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseConfig {
    /// Layers summed into one accumulator before normalization.
    pub layers: Vec<NoiseLayerConfig>,
    /// Falloff mask.
    pub falloff: FalloffConfig,
    /// Vertical scale applied to curved heights when meshing.
    pub height_multiplier: f32,
    /// Height curve keys. Empty means identity.
    pub height_curve: Vec<CurveKey>,
    /// Number of row batches noise synthesis is split into.
    pub worker_batches: usize,
}

/// A height-threshold color region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegionConfig {
    /// Display name.
    pub name: String,
    /// Upper height bound (inclusive) of this region.
    pub threshold: f32,
    /// RGBA color.
    pub color: [u8; 4],
}

/// One LOD preset: the LOD used up to `max_view_distance`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodPresetConfig {
    /// LOD level (0 = full detail).
    pub lod: u8,
    /// Maximum viewer distance for this preset.
    pub max_view_distance: f32,
    /// Whether chunks at this preset carry a collider mesh.
    pub collider: bool,
}

/// LOD policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// Presets, ascending by `max_view_distance`.
    pub presets: Vec<LodPresetConfig>,
    /// Extra coarseness added to the render LOD for collider meshes.
    pub collider_lod_offset: u8,
    /// Re-evaluate and re-apply every tick regardless of movement.
    pub update_every_tick: bool,
    /// Viewer movement (in scaled world units) required before re-evaluation.
    pub move_threshold: f32,
}

/// Background meshing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// Meshing worker threads. 0 picks a count from the CPU core count.
    pub mesh_workers: usize,
    /// Maximum concurrently queued chunk generations.
    pub max_in_flight: usize,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write JSON log files in debug builds.
    pub file_logging: bool,
}

// --- Default implementations ---

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            world_size: 960,
            scale: 1.0,
            chunk_size: 240,
        }
    }
}

impl Default for NoiseLayerConfig {
    fn default() -> Self {
        Self {
            kind: NoiseKind::Smooth,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            scale: 50.0,
            strength: 1.0,
            enabled: true,
            offset: [0.0, 0.0],
        }
    }
}

impl Default for FalloffConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            transition: 3.0,
            bias: 2.2,
        }
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            layers: vec![NoiseLayerConfig::default()],
            falloff: FalloffConfig::default(),
            height_multiplier: 30.0,
            height_curve: Vec::new(),
            worker_batches: 32,
        }
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            threshold: 1.0,
            color: [255, 255, 255, 255],
        }
    }
}

impl Default for LodPresetConfig {
    fn default() -> Self {
        Self {
            lod: 0,
            max_view_distance: 200.0,
            collider: false,
        }
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            presets: vec![
                LodPresetConfig {
                    lod: 0,
                    max_view_distance: 200.0,
                    collider: true,
                },
                LodPresetConfig {
                    lod: 2,
                    max_view_distance: 400.0,
                    collider: false,
                },
                LodPresetConfig {
                    lod: 4,
                    max_view_distance: 800.0,
                    collider: false,
                },
            ],
            collider_lod_offset: 1,
            update_every_tick: false,
            move_threshold: 25.0,
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            mesh_workers: 0,
            max_in_flight: 256,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            noise: NoiseConfig::default(),
            regions: Self::default_regions(),
            lod: LodConfig::default(),
            streaming: StreamingConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            file_logging: true,
        }
    }
}

impl Config {
    /// Default region table: water, grass, rock.
    pub fn default_regions() -> Vec<RegionConfig> {
        vec![
            RegionConfig {
                name: "water".to_string(),
                threshold: 0.3,
                color: [52, 97, 199, 255],
            },
            RegionConfig {
                name: "grass".to_string(),
                threshold: 0.6,
                color: [86, 152, 23, 255],
            },
            RegionConfig {
                name: "rock".to_string(),
                threshold: 1.0,
                color: [128, 128, 128, 255],
            },
        ]
    }

    /// Check ordering preconditions that consumers rely on.
    ///
    /// Numeric noise parameters are not checked here: they are repaired where
    /// they are consumed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, pair) in self.regions.windows(2).enumerate() {
            if pair[1].threshold < pair[0].threshold {
                return Err(ConfigError::UnsortedRegions {
                    index: index + 1,
                    threshold: pair[1].threshold,
                });
            }
        }
        for (index, pair) in self.lod.presets.windows(2).enumerate() {
            if pair[1].max_view_distance < pair[0].max_view_distance {
                return Err(ConfigError::UnsortedLodPresets {
                    index: index + 1,
                    distance: pair[1].max_view_distance,
                });
            }
        }
        Ok(())
    }
}

/// Platform config directory for Strata (e.g. `~/.config/strata`).
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("strata")
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
