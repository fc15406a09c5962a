//! The terrain session: owns the height field, the chunks and the meshing
//! pool, and decides each tick which LOD every chunk should display.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::{Vec2, Vec3};
use strata_config::Config;
use strata_lod::LodChoice;
use strata_mesh::MeshBuilder;
use strata_terrain::HeightField;

use crate::chunk::{Chunk, ChunkCoord};
use crate::error::WorldError;
use crate::interface::{TerrainRenderer, ViewerPosition};
use crate::pool::{MeshRequest, MeshingPool, SubmitOutcome};
use crate::settings::WorldSettings;

/// Result of a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// LODs were re-evaluated this tick.
    pub evaluated: bool,
    /// Generation requests queued.
    pub requested: u32,
    /// Requests skipped because the chunk was already generating.
    pub suppressed: u32,
    /// Requests skipped because the pool was at its budget.
    pub deferred: u32,
    /// Chunks switched to an already cached mesh.
    pub from_cache: u32,
    /// Generations adopted from the pool.
    pub completed: u32,
    /// Generations whose build failed; those chunks are requested again.
    pub failed: u32,
    /// Meshes handed to the renderer.
    pub applied: u32,
    /// Textures handed to the renderer.
    pub textures: u32,
}

/// Streams LOD meshes for a fixed grid of chunks around a viewer.
pub struct WorldTerrain {
    settings: WorldSettings,
    field: Arc<HeightField>,
    pool: MeshingPool,
    chunks: Vec<Chunk>,
    chunk_count: usize,
    last_viewer: Option<Vec2>,
    /// A chunk still waits for a mesh that was not requested last evaluation.
    waiting: bool,
}

impl WorldTerrain {
    /// Build a session from configuration.
    pub fn new(config: &Config) -> Result<Self, WorldError> {
        Self::from_settings(WorldSettings::from_config(config)?)
    }

    /// Build a session: generate the height field, lay out chunks and start
    /// the meshing pool.
    pub fn from_settings(settings: WorldSettings) -> Result<Self, WorldError> {
        settings.validate()?;
        let chunk_count = settings.chunk_count();
        let vertices = settings.field_vertices();

        let start = Instant::now();
        let field = Arc::new(HeightField::build(
            settings.seed,
            &settings.noise,
            &settings.regions,
            vertices,
            vertices,
        ));
        let builder: Arc<MeshBuilder> = Arc::new(settings.mesh_builder.clone());
        let pool = MeshingPool::new(
            settings.resolved_mesh_workers(),
            settings.max_in_flight,
            Arc::clone(&field),
            builder,
        );

        let height_multiplier = settings.mesh_builder.height_multiplier();
        let chunks = (0..chunk_count as u32)
            .flat_map(|y| (0..chunk_count as u32).map(move |x| ChunkCoord::new(x, y)))
            .map(|coord| Chunk::new(coord, settings.chunk_size, height_multiplier))
            .collect();

        tracing::info!(
            chunks = chunk_count * chunk_count,
            vertices,
            seed = settings.seed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "terrain session ready"
        );

        Ok(Self {
            settings,
            field,
            pool,
            chunks,
            chunk_count,
            last_viewer: None,
            waiting: false,
        })
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    /// The shared height field.
    pub fn field(&self) -> &Arc<HeightField> {
        &self.field
    }

    /// Chunks along each axis.
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// All chunks in row-major order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunk_index(coord).map(|i| &self.chunks[i])
    }

    /// Generations queued or running.
    pub fn in_flight_count(&self) -> usize {
        self.pool.in_flight_count()
    }

    /// Returns `true` if some chunk still needs a request on a later tick.
    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    fn chunk_index(&self, coord: ChunkCoord) -> Option<usize> {
        let (x, y) = (coord.x as usize, coord.y as usize);
        (x < self.chunk_count && y < self.chunk_count).then_some(y * self.chunk_count + x)
    }

    /// Advance one control-loop step. Never blocks on meshing.
    ///
    /// Completed generations are adopted first. LODs are then re-evaluated on
    /// the first tick, after the viewer moved past the movement threshold,
    /// on every tick when `update_every_tick` is set, or while a chunk is
    /// still waiting for a request.
    pub fn tick(
        &mut self,
        viewer: &impl ViewerPosition,
        renderer: &mut impl TerrainRenderer,
    ) -> TickReport {
        let mut report = TickReport::default();
        self.adopt_completed(renderer, &mut report);

        let position = viewer.ground_position() / self.settings.scale;
        let threshold = self.settings.move_threshold;
        let moved = self
            .last_viewer
            .is_none_or(|last| last.distance_squared(position) > threshold * threshold);
        if moved {
            self.last_viewer = Some(position);
        }

        if moved || self.settings.update_every_tick || self.waiting {
            self.evaluate(position, renderer, &mut report);
            tracing::debug!(
                x = position.x,
                y = position.y,
                requested = report.requested,
                suppressed = report.suppressed,
                deferred = report.deferred,
                from_cache = report.from_cache,
                in_flight = self.pool.in_flight_count(),
                "LODs evaluated"
            );
        }
        report
    }

    /// Pick a LOD for every chunk and either show a cached mesh or request one.
    fn evaluate(
        &mut self,
        position: Vec2,
        renderer: &mut impl TerrainRenderer,
        report: &mut TickReport,
    ) {
        let Self {
            settings,
            field,
            pool,
            chunks,
            waiting,
            ..
        } = self;
        report.evaluated = true;
        *waiting = false;

        let viewer = Vec3::new(position.x, 0.0, position.y);
        let offset = settings.collider_lod_offset;
        let size = settings.chunk_size;

        for chunk in chunks.iter_mut() {
            let distance = chunk.bounds().distance_to_point(viewer);
            let choice = settings.lod.select(distance);
            chunk.set_target(choice, distance);

            if !chunk.is_textured() {
                let (ox, oy) = chunk.offset();
                match field.color_region(ox, oy, size, size) {
                    Some(texture) => {
                        renderer.apply_texture(chunk.coord(), &texture);
                        chunk.mark_textured();
                        report.textures += 1;
                    }
                    None => tracing::warn!(coord = %chunk.coord(), "chunk texture outside height field"),
                }
            }

            if chunk.applied() == Some(choice) && !settings.update_every_tick {
                continue;
            }

            let missing = chunk.missing_lods(choice, offset);
            if missing.is_empty() {
                if apply(chunk, choice, offset, renderer) {
                    report.from_cache += 1;
                    report.applied += 1;
                }
                continue;
            }

            if chunk.is_generating() {
                report.suppressed += 1;
                *waiting = true;
                continue;
            }

            let request = MeshRequest {
                coord: chunk.coord(),
                offset: chunk.offset(),
                lod: choice.lod,
                lods: missing,
            };
            match pool.submit(request) {
                SubmitOutcome::Queued => {
                    chunk.mark_generating(choice.lod);
                    report.requested += 1;
                }
                SubmitOutcome::Duplicate(_) => {
                    report.suppressed += 1;
                    *waiting = true;
                }
                SubmitOutcome::Busy => {
                    report.deferred += 1;
                    *waiting = true;
                }
            }
        }
    }

    /// Move finished meshes into their chunks and show them if still wanted.
    fn adopt_completed(&mut self, renderer: &mut impl TerrainRenderer, report: &mut TickReport) {
        let offset = self.settings.collider_lod_offset;
        for result in self.pool.drain_results() {
            let coord = result.coord;
            let Some(index) = self.chunk_index(coord) else {
                tracing::warn!(%coord, "mesh result for unknown chunk");
                continue;
            };
            let chunk = &mut self.chunks[index];
            let meshes = match result.meshes {
                Ok(meshes) => meshes,
                Err(failure) => {
                    tracing::warn!(%coord, lod = result.lod, %failure, "chunk meshing failed, will retry");
                    chunk.abandon();
                    self.waiting = true;
                    report.failed += 1;
                    continue;
                }
            };
            tracing::trace!(%coord, lod = result.lod, elapsed_us = result.elapsed_us, "mesh adopted");

            chunk.adopt(result.lod, meshes);
            report.completed += 1;

            if let Some(target) = chunk.target()
                && chunk.applied() != Some(target)
                && chunk.missing_lods(target, offset).is_empty()
                && apply(chunk, target, offset, renderer)
            {
                report.applied += 1;
            }
        }
    }

    /// Adopt results until no chunk is generating, or `timeout` passes.
    ///
    /// Returns `true` when idle. Intended for warm-up, previews and tests.
    pub fn block_until_idle(
        &mut self,
        renderer: &mut impl TerrainRenderer,
        timeout: Duration,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        let mut report = TickReport::default();
        loop {
            self.adopt_completed(renderer, &mut report);
            if self.pool.in_flight_count() == 0 && !self.chunks.iter().any(Chunk::is_generating) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// Tick and wait until every chunk shows the LOD the viewer calls for.
    pub fn warm_up(
        &mut self,
        viewer: &impl ViewerPosition,
        renderer: &mut impl TerrainRenderer,
        timeout: Duration,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.tick(viewer, renderer);
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !self.block_until_idle(renderer, remaining) {
                return false;
            }
            if !self.waiting {
                return true;
            }
        }
    }
}

/// Hand a chunk's cached meshes for `choice` to the renderer.
fn apply(
    chunk: &mut Chunk,
    choice: LodChoice,
    collider_offset: u8,
    renderer: &mut impl TerrainRenderer,
) -> bool {
    let Some(mesh) = chunk.mesh(choice.lod).cloned() else {
        return false;
    };
    renderer.apply_mesh(chunk.coord(), choice.lod, &mesh);
    let collider = Chunk::collider_lod_for(choice, collider_offset).and_then(|lod| chunk.mesh(lod));
    renderer.apply_collider(chunk.coord(), collider);
    chunk.mark_applied(choice);
    true
}
