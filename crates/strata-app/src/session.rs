//! Headless streaming session: a scripted viewer walks across the world
//! while a logging renderer records what the terrain hands it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec2;
use strata_config::Config;
use strata_mesh::MeshPayload;
use strata_terrain::ColorRegion;
use strata_world::{ChunkCoord, TerrainRenderer, ViewerPosition, WorldError, WorldTerrain};

/// Target duration of one control tick (60 Hz).
const TICK: Duration = Duration::from_micros(16_667);

/// A viewer moving in a straight line at constant speed.
#[derive(Clone, Copy, Debug)]
pub struct ScriptedViewer {
    start: Vec2,
    end: Vec2,
    ticks: u32,
    tick: u32,
}

impl ScriptedViewer {
    /// Walk the world's diagonal from the origin corner in `ticks` steps.
    pub fn diagonal(world_size: f32, ticks: u32) -> Self {
        Self {
            start: Vec2::ZERO,
            end: Vec2::new(world_size, -world_size),
            ticks: ticks.max(1),
            tick: 0,
        }
    }

    pub fn advance(&mut self) {
        self.tick = (self.tick + 1).min(self.ticks);
    }
}

impl ViewerPosition for ScriptedViewer {
    fn ground_position(&self) -> Vec2 {
        self.start.lerp(self.end, self.tick as f32 / self.ticks as f32)
    }
}

/// Renderer stand-in that keeps per-chunk state and upload totals.
#[derive(Debug, Default)]
pub struct LoggingRenderer {
    shown: HashMap<ChunkCoord, u8>,
    colliders: HashMap<ChunkCoord, u8>,
    textures: usize,
    uploaded_bytes: usize,
}

impl TerrainRenderer for LoggingRenderer {
    fn apply_mesh(&mut self, coord: ChunkCoord, lod: u8, mesh: &Arc<MeshPayload>) {
        let vertices = mesh.interleaved();
        self.uploaded_bytes += bytemuck::cast_slice::<_, u8>(vertices.as_slice()).len()
            + bytemuck::cast_slice::<_, u8>(mesh.indices.as_slice()).len();
        if self.shown.insert(coord, lod) != Some(lod) {
            tracing::debug!(%coord, lod, triangles = mesh.triangle_count(), "chunk mesh shown");
        }
    }

    fn apply_collider(&mut self, coord: ChunkCoord, mesh: Option<&Arc<MeshPayload>>) {
        match mesh {
            Some(mesh) => {
                self.colliders.insert(coord, mesh.lod);
            }
            None => {
                self.colliders.remove(&coord);
            }
        }
    }

    fn apply_texture(&mut self, coord: ChunkCoord, texture: &ColorRegion) {
        tracing::trace!(%coord, width = texture.width, height = texture.height, "chunk textured");
        self.textures += 1;
    }
}

/// Totals of a finished session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub ticks: u32,
    pub evaluations: u32,
    pub requested: u32,
    pub suppressed: u32,
    pub completed: u32,
    pub failed: u32,
    pub chunks_shown: usize,
    pub colliders: usize,
    pub textures: usize,
    pub uploaded_bytes: usize,
}

/// Stream terrain for `ticks` control ticks, then wait for in-flight meshes.
pub fn run(config: &Config, ticks: u32) -> Result<SessionSummary, WorldError> {
    let mut world = WorldTerrain::new(config)?;
    Ok(run_with(&mut world, config, ticks, TICK))
}

fn run_with(
    world: &mut WorldTerrain,
    config: &Config,
    ticks: u32,
    tick_length: Duration,
) -> SessionSummary {
    let mut viewer = ScriptedViewer::diagonal(config.world.world_size as f32, ticks);
    let mut renderer = LoggingRenderer::default();
    let mut summary = SessionSummary {
        ticks,
        ..Default::default()
    };

    for _ in 0..ticks {
        let started = Instant::now();
        let report = world.tick(&viewer, &mut renderer);
        summary.evaluations += u32::from(report.evaluated);
        summary.requested += report.requested;
        summary.suppressed += report.suppressed;
        summary.completed += report.completed;
        summary.failed += report.failed;

        viewer.advance();
        if let Some(rest) = tick_length.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    if !world.block_until_idle(&mut renderer, Duration::from_secs(30)) {
        tracing::warn!(in_flight = world.in_flight_count(), "meshing still busy at shutdown");
    }

    summary.chunks_shown = renderer.shown.len();
    summary.colliders = renderer.colliders.len();
    summary.textures = renderer.textures;
    summary.uploaded_bytes = renderer.uploaded_bytes;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.world.chunk_size = 120;
        config.world.world_size = 240;
        config.noise.worker_batches = 4;
        config.streaming.mesh_workers = 2;
        config
    }

    #[test]
    fn test_viewer_walks_diagonal() {
        let mut viewer = ScriptedViewer::diagonal(100.0, 4);
        assert_eq!(viewer.ground_position(), Vec2::ZERO);
        viewer.advance();
        viewer.advance();
        assert_eq!(viewer.ground_position(), Vec2::new(50.0, -50.0));
        for _ in 0..10 {
            viewer.advance();
        }
        assert_eq!(viewer.ground_position(), Vec2::new(100.0, -100.0));
    }

    #[test]
    fn test_session_shows_every_chunk() {
        let config = small_config();
        let mut world = WorldTerrain::new(&config).unwrap();
        let summary = run_with(&mut world, &config, 20, Duration::from_millis(1));
        assert_eq!(summary.ticks, 20);
        assert!(summary.evaluations >= 1);
        assert_eq!(summary.textures, 4);
        assert!(summary.requested >= 4);
        assert!(summary.uploaded_bytes > 0);
        assert_eq!(summary.failed, 0);
        assert!(world.chunks().iter().all(|c| !c.is_generating()));
    }

    #[test]
    fn test_invalid_config_fails() {
        let mut config = small_config();
        config.world.chunk_size = 7;
        assert!(run(&config, 1).is_err());
    }
}
