//! Validated, domain-typed session settings built from configuration.

use strata_config::Config;
use strata_lod::{LodSelector, MAX_LOD, lod_stride};
use strata_mesh::MeshBuilder;
use strata_terrain::{FalloffMask, NoiseField, RegionTable};

use crate::error::WorldError;

/// Everything a terrain session or preview needs, checked once up front.
#[derive(Clone, Debug)]
pub struct WorldSettings {
    pub seed: u64,
    pub world_size: u32,
    pub scale: f32,
    pub chunk_size: usize,
    pub noise: NoiseField,
    /// Falloff shape used by previews even when the mask is disabled.
    pub falloff_shape: FalloffMask,
    pub regions: RegionTable,
    pub mesh_builder: MeshBuilder,
    pub lod: LodSelector,
    pub collider_lod_offset: u8,
    pub update_every_tick: bool,
    pub move_threshold: f32,
    /// Meshing threads; 0 picks a count from the CPU core count.
    pub mesh_workers: usize,
    pub max_in_flight: usize,
}

impl WorldSettings {
    /// Convert and validate configuration.
    pub fn from_config(config: &Config) -> Result<Self, WorldError> {
        config.validate()?;
        let settings = Self {
            seed: config.world.seed,
            world_size: config.world.world_size,
            scale: config.world.scale,
            chunk_size: config.world.chunk_size as usize,
            noise: NoiseField::from_config(&config.noise),
            falloff_shape: FalloffMask {
                transition: config.noise.falloff.transition,
                bias: config.noise.falloff.bias,
            },
            regions: RegionTable::from_config(&config.regions)?,
            mesh_builder: MeshBuilder::from_config(config),
            lod: LodSelector::from_config(&config.lod)?,
            collider_lod_offset: config.lod.collider_lod_offset,
            update_every_tick: config.lod.update_every_tick,
            move_threshold: config.lod.move_threshold,
            mesh_workers: config.streaming.mesh_workers,
            max_in_flight: config.streaming.max_in_flight.max(1),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check the geometric preconditions the mesh builder relies on.
    pub fn validate(&self) -> Result<(), WorldError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(WorldError::InvalidScale(self.scale));
        }
        if self.chunk_size == 0 {
            return Err(WorldError::ZeroChunkSize);
        }
        for lod in 0..=MAX_LOD {
            let stride = lod_stride(lod);
            if self.chunk_size % stride != 0 {
                return Err(WorldError::ChunkSizeNotDivisible {
                    chunk_size: self.chunk_size,
                    lod,
                    stride,
                });
            }
        }
        Ok(())
    }

    /// Chunks along each world axis, at least 1.
    pub fn chunk_count(&self) -> usize {
        let cells = (self.world_size as f32 / self.scale).floor() as usize;
        (cells / self.chunk_size).max(1)
    }

    /// Interior height-field vertices along each axis.
    pub fn field_vertices(&self) -> usize {
        self.chunk_count() * self.chunk_size + 1
    }

    /// Worker thread count with the automatic default resolved.
    pub fn resolved_mesh_workers(&self) -> usize {
        match self.mesh_workers {
            0 => crate::pool::default_worker_count(),
            n => n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let settings = WorldSettings::from_config(&Config::default()).unwrap();
        assert_eq!(settings.chunk_count(), 4);
        assert_eq!(settings.field_vertices(), 961);
    }

    #[test]
    fn test_chunk_count_uses_scale() {
        let mut config = Config::default();
        config.world.world_size = 1000;
        config.world.scale = 2.0;
        let settings = WorldSettings::from_config(&config).unwrap();
        assert_eq!(settings.chunk_count(), 2);
    }

    #[test]
    fn test_small_world_still_has_one_chunk() {
        let mut config = Config::default();
        config.world.world_size = 10;
        let settings = WorldSettings::from_config(&config).unwrap();
        assert_eq!(settings.chunk_count(), 1);
        assert_eq!(settings.field_vertices(), 241);
    }

    #[test]
    fn test_indivisible_chunk_size_rejected() {
        let mut config = Config::default();
        config.world.chunk_size = 100;
        let err = WorldSettings::from_config(&config).unwrap_err();
        assert!(matches!(
            err,
            WorldError::ChunkSizeNotDivisible {
                chunk_size: 100,
                lod: 3,
                stride: 6
            }
        ));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut config = Config::default();
        config.world.chunk_size = 0;
        assert!(matches!(
            WorldSettings::from_config(&config),
            Err(WorldError::ZeroChunkSize)
        ));
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let mut config = Config::default();
        config.world.scale = 0.0;
        assert!(matches!(
            WorldSettings::from_config(&config),
            Err(WorldError::InvalidScale(_))
        ));
    }

    #[test]
    fn test_unsorted_regions_rejected() {
        let mut config = Config::default();
        config.regions.swap(0, 2);
        assert!(matches!(
            WorldSettings::from_config(&config),
            Err(WorldError::Config(_))
        ));
    }

    #[test]
    fn test_worker_count_resolved() {
        let mut settings = WorldSettings::from_config(&Config::default()).unwrap();
        assert!(settings.resolved_mesh_workers() >= 1);
        settings.mesh_workers = 3;
        assert_eq!(settings.resolved_mesh_workers(), 3);
    }
}
