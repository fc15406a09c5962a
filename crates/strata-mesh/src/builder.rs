//! Height field to chunk mesh conversion.
//!
//! Every chunk is triangulated together with a one-vertex border ring sampled
//! from the neighboring cells of the padded height field. Border triangles
//! only contribute to the normals of interior vertices and are then dropped,
//! so two chunks meeting at an edge compute the same normals there and the
//! seam shades continuously.

use glam::{Vec2, Vec3};
use strata_config::Config;
use strata_lod::{MAX_LOD, lod_stride};
use strata_terrain::{BORDER_MARGIN, HeightCurve, HeightField};

use crate::diagnostics::{ExecutionMode, MeshDiagnostics};
use crate::payload::MeshPayload;

// The border ring samples one coarsest stride beyond the chunk edge.
static_assertions::const_assert!(BORDER_MARGIN >= lod_stride(MAX_LOD));

/// Where a bordered grid vertex lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexSlot {
    /// Index into the payload's vertex arrays.
    Interior(u32),
    /// Index into the builder's private border ring.
    Border(u32),
}

impl VertexSlot {
    /// Payload vertex index, or `None` for a border vertex.
    pub fn interior(self) -> Option<u32> {
        match self {
            Self::Interior(i) => Some(i),
            Self::Border(_) => None,
        }
    }
}

/// Output of [`MeshBuilder::build_with_mode`].
#[derive(Clone, Debug, PartialEq)]
pub struct MeshBuild {
    pub payload: MeshPayload,
    /// Present only for [`ExecutionMode::Preview`] builds.
    pub diagnostics: Option<MeshDiagnostics>,
}

/// Builds chunk meshes from a shared height field.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshBuilder {
    chunk_size: usize,
    height_multiplier: f32,
    curve: HeightCurve,
}

impl MeshBuilder {
    /// Builder for `chunk_size`-cell chunks; heights are `curve(h) * height_multiplier`.
    pub fn new(chunk_size: usize, height_multiplier: f32, curve: HeightCurve) -> Self {
        Self {
            chunk_size,
            height_multiplier,
            curve,
        }
    }

    /// Builder from the world chunk size and the noise height shaping.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.world.chunk_size as usize,
            config.noise.height_multiplier,
            HeightCurve::new(config.noise.height_curve.clone()),
        )
    }

    /// Chunk edge length in height-field cells.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// World-space height of a normalized height of 1 after the curve.
    pub fn height_multiplier(&self) -> f32 {
        self.height_multiplier
    }

    /// Interior vertices along one chunk edge at `lod`.
    pub fn vertices_per_side(&self, lod: u8) -> usize {
        self.chunk_size / lod_stride(lod) + 1
    }

    /// Mesh the chunk whose interior origin is `(offset_x, offset_y)`.
    pub fn build(&self, field: &HeightField, offset_x: usize, offset_y: usize, lod: u8) -> MeshPayload {
        self.build_with_mode(field, offset_x, offset_y, lod, ExecutionMode::Runtime)
            .payload
    }

    /// Mesh a chunk, collecting debug geometry in [`ExecutionMode::Preview`].
    pub fn build_with_mode(
        &self,
        field: &HeightField,
        offset_x: usize,
        offset_y: usize,
        lod: u8,
        mode: ExecutionMode,
    ) -> MeshBuild {
        let stride = lod_stride(lod);
        debug_assert!(
            self.chunk_size % stride == 0,
            "chunk size {} not divisible by stride {stride}",
            self.chunk_size
        );
        debug_assert!(stride <= BORDER_MARGIN);
        debug_assert!(
            offset_x + self.chunk_size + stride < field.vertices_x() + BORDER_MARGIN
                && offset_y + self.chunk_size + stride < field.vertices_y() + BORDER_MARGIN,
            "chunk at ({offset_x}, {offset_y}) samples past the padded field"
        );

        let side = self.chunk_size / stride + 1;
        let bordered = side + 2;
        let slots = assign_slots(bordered);
        let interior_count = side * side;
        let border_count = slots.len() - interior_count;

        let mut positions = vec![Vec3::ZERO; interior_count];
        let mut uvs = vec![Vec2::ZERO; interior_count];
        let mut border_positions = vec![Vec3::ZERO; border_count];
        let mut indices = Vec::with_capacity((side - 1) * (side - 1) * 6);
        let mut border_triangles = Vec::with_capacity((bordered - 1) * 8);

        let step = stride as isize;
        let uv_span = (side - 1) as f32;
        for by in 0..bordered {
            for bx in 0..bordered {
                let slot = slots[by * bordered + bx];
                let wx = offset_x as isize + (bx as isize - 1) * step;
                let wy = offset_y as isize + (by as isize - 1) * step;
                let height = self.curve.evaluate(field.height_at(wx, wy)) * self.height_multiplier;
                let position = Vec3::new(wx as f32, height, -(wy as f32));

                match slot {
                    VertexSlot::Interior(i) => {
                        positions[i as usize] = position;
                        uvs[i as usize] =
                            Vec2::new((bx - 1) as f32 / uv_span, (by - 1) as f32 / uv_span);
                    }
                    VertexSlot::Border(j) => border_positions[j as usize] = position,
                }

                if bx + 1 < bordered && by + 1 < bordered {
                    let a = slot;
                    let b = slots[by * bordered + bx + 1];
                    let c = slots[(by + 1) * bordered + bx + 1];
                    let d = slots[(by + 1) * bordered + bx];
                    for tri in [[a, b, c], [a, c, d]] {
                        match tri.map(VertexSlot::interior) {
                            [Some(i0), Some(i1), Some(i2)] => indices.extend([i0, i1, i2]),
                            _ => border_triangles.push(tri),
                        }
                    }
                }
            }
        }

        let position_of = |slot: VertexSlot| match slot {
            VertexSlot::Interior(i) => positions[i as usize],
            VertexSlot::Border(j) => border_positions[j as usize],
        };

        let mut normals = vec![Vec3::ZERO; interior_count];
        let interior_triangles = indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]].map(VertexSlot::Interior));
        for tri in interior_triangles.chain(border_triangles.iter().copied()) {
            let [pa, pb, pc] = tri.map(position_of);
            let face = (pb - pa).cross(pc - pa);
            for i in tri.iter().filter_map(|s| s.interior()) {
                normals[i as usize] += face;
            }
        }
        for n in &mut normals {
            *n = n.try_normalize().unwrap_or(Vec3::Y);
        }

        let diagnostics = mode.collects_diagnostics().then(|| MeshDiagnostics {
            border_edges: border_triangles
                .iter()
                .flat_map(|tri| {
                    let [pa, pb, pc] = tri.map(position_of);
                    [(pa, pb), (pb, pc), (pc, pa)]
                })
                .collect(),
            normal_rays: positions
                .iter()
                .zip(&normals)
                .map(|(p, n)| (*p, *p + *n))
                .collect(),
        });

        tracing::debug!(
            offset_x,
            offset_y,
            lod,
            vertices = interior_count,
            triangles = indices.len() / 3,
            "chunk mesh built"
        );

        MeshBuild {
            payload: MeshPayload {
                lod,
                positions,
                uvs,
                normals,
                indices,
            },
            diagnostics,
        }
    }
}

/// Row-major slots for a `bordered` x `bordered` grid; the outer ring is border.
fn assign_slots(bordered: usize) -> Vec<VertexSlot> {
    let mut slots = Vec::with_capacity(bordered * bordered);
    let (mut interior, mut border) = (0u32, 0u32);
    for by in 0..bordered {
        for bx in 0..bordered {
            if bx == 0 || by == 0 || bx == bordered - 1 || by == bordered - 1 {
                slots.push(VertexSlot::Border(border));
                border += 1;
            } else {
                slots.push(VertexSlot::Interior(interior));
                interior += 1;
            }
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_config::CurveKey;
    use strata_lod::MAX_LOD;
    use strata_terrain::{HeightGrid, NoiseField, NoiseLayer, RegionTable};

    const CHUNK: usize = 120;

    fn padded(vertices: usize, f: impl Fn(usize, usize) -> f32) -> HeightField {
        let side = vertices + 2 * BORDER_MARGIN;
        let mut values = Vec::with_capacity(side * side);
        for y in 0..side {
            for x in 0..side {
                values.push(f(x, y));
            }
        }
        HeightField::from_grid(
            HeightGrid::from_values(side, side, values),
            &RegionTable::default(),
        )
    }

    /// Two by two chunks of smooth, non-planar terrain.
    fn wavy_field() -> HeightField {
        padded(2 * CHUNK + 1, |x, y| {
            let (x, y) = (x as f32, y as f32);
            ((x * 0.13).sin() * (y * 0.07).cos() + 1.0) * 0.5
        })
    }

    fn builder() -> MeshBuilder {
        MeshBuilder::new(CHUNK, 20.0, HeightCurve::identity())
    }

    #[test]
    fn test_slots_ring_is_border() {
        let slots = assign_slots(4);
        assert_eq!(slots[0], VertexSlot::Border(0));
        assert_eq!(slots[5], VertexSlot::Interior(0));
        assert_eq!(slots[6], VertexSlot::Interior(1));
        assert_eq!(slots[7], VertexSlot::Border(5));
        assert_eq!(slots[10], VertexSlot::Interior(3));
        assert_eq!(slots.iter().filter(|s| s.interior().is_some()).count(), 4);
    }

    #[test]
    fn test_border_vertices_excluded_from_payload() {
        let field = wavy_field();
        for lod in 0..=MAX_LOD {
            let mesh = builder().build(&field, CHUNK, 0, lod);
            let side = builder().vertices_per_side(lod);
            assert_eq!(mesh.vertex_count(), side * side);
            assert_eq!(mesh.triangle_count(), 2 * (side - 1) * (side - 1));
            assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
            assert!(
                mesh.positions
                    .iter()
                    .all(|p| p.x >= CHUNK as f32 && p.x <= (2 * CHUNK) as f32)
            );
        }
    }

    #[test]
    fn test_lod_vertex_counts_strictly_decrease() {
        let field = wavy_field();
        let counts: Vec<usize> = (0..=MAX_LOD)
            .map(|lod| builder().build(&field, 0, 0, lod).vertex_count())
            .collect();
        assert_eq!(
            counts,
            vec![121 * 121, 61 * 61, 31 * 31, 21 * 21, 16 * 16, 13 * 13, 11 * 11]
        );
        assert!(counts.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_default_chunk_size_side_counts() {
        let b = MeshBuilder::new(240, 1.0, HeightCurve::identity());
        let sides: Vec<usize> = (0..=MAX_LOD).map(|l| b.vertices_per_side(l)).collect();
        assert_eq!(sides, vec![241, 121, 61, 41, 31, 25, 21]);
    }

    #[test]
    fn test_lod0_reproduces_full_grid() {
        let field = wavy_field();
        let (ox, oy) = (CHUNK, CHUNK);
        let mesh = builder().build(&field, ox, oy, 0);
        let side = CHUNK + 1;
        for y in 0..side {
            for x in 0..side {
                let h = field.height_at((ox + x) as isize, (oy + y) as isize);
                let expected = Vec3::new((ox + x) as f32, h * 20.0, -((oy + y) as f32));
                assert_eq!(mesh.positions[y * side + x], expected);
            }
        }
        assert_eq!(mesh.uvs[0], Vec2::ZERO);
        assert_eq!(mesh.uvs[side * side - 1], Vec2::ONE);
    }

    #[test]
    fn test_seams_match_between_neighbors() {
        let field = wavy_field();
        for lod in [0, 2, MAX_LOD] {
            let side = builder().vertices_per_side(lod);
            let origin = builder().build(&field, 0, 0, lod);
            let east = builder().build(&field, CHUNK, 0, lod);
            let south = builder().build(&field, 0, CHUNK, lod);

            for i in 0..side {
                let (a, b) = (i * side + side - 1, i * side);
                assert_eq!(origin.positions[a], east.positions[b]);
                assert!(origin.normals[a].abs_diff_eq(east.normals[b], 1e-5));

                let (a, b) = ((side - 1) * side + i, i);
                assert_eq!(origin.positions[a], south.positions[b]);
                assert!(origin.normals[a].abs_diff_eq(south.normals[b], 1e-5));
            }
        }
    }

    #[test]
    fn test_rebuild_is_identical() {
        let field = wavy_field();
        let first = builder().build(&field, CHUNK, CHUNK, 3);
        let second = builder().build(&field, CHUNK, CHUNK, 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_flat_field_normals_point_up() {
        let field = padded(CHUNK + 1, |_, _| 0.5);
        let mesh = builder().build(&field, 0, 0, 1);
        assert!(mesh.normals.iter().all(|n| n.abs_diff_eq(Vec3::Y, 1e-6)));
    }

    #[test]
    fn test_ramp_edge_normals_match_interior() {
        let vertices = CHUNK + 1;
        let width = (vertices + 2 * BORDER_MARGIN) as f32;
        let field = padded(vertices, |x, _| x as f32 / width);
        let mesh = builder().build(&field, 0, 0, 2);

        let slope = 20.0 / width;
        let expected = Vec3::new(-slope, 1.0, 0.0).normalize();
        for n in &mesh.normals {
            assert!(n.abs_diff_eq(expected, 1e-5), "{n} != {expected}");
        }
    }

    #[test]
    fn test_height_curve_applied_before_multiplier() {
        let field = padded(CHUNK + 1, |_, _| 0.25);
        let curve = HeightCurve::new(vec![
            CurveKey {
                time: 0.0,
                value: 0.0,
            },
            CurveKey {
                time: 0.5,
                value: 1.0,
            },
        ]);
        let mesh = MeshBuilder::new(CHUNK, 10.0, curve).build(&field, 0, 0, 4);
        assert!(mesh.positions.iter().all(|p| (p.y - 5.0).abs() < 1e-5));
    }

    #[test]
    fn test_preview_mode_returns_diagnostics() {
        let field = wavy_field();
        let runtime = builder().build_with_mode(&field, 0, 0, 6, ExecutionMode::Runtime);
        assert!(runtime.diagnostics.is_none());

        let preview = builder().build_with_mode(&field, 0, 0, 6, ExecutionMode::Preview);
        assert_eq!(preview.payload, runtime.payload);
        let diagnostics = preview.diagnostics.unwrap();

        let side = 11;
        let bordered = side + 2;
        let border_triangles = 2 * (bordered - 1) * (bordered - 1) - 2 * (side - 1) * (side - 1);
        assert_eq!(diagnostics.border_edges.len(), 3 * border_triangles);
        assert_eq!(diagnostics.normal_rays.len(), side * side);
        let (origin, tip) = diagnostics.normal_rays[0];
        assert!(((tip - origin).length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_noise_field_chunks_mesh() {
        let noise = NoiseField::new(vec![NoiseLayer::default()]);
        let field = HeightField::build(42, &noise, &RegionTable::default(), CHUNK + 1, CHUNK + 1);
        let mesh = builder().build(&field, 0, 0, 0);
        assert!(mesh.positions.iter().all(|p| (0.0..=20.0).contains(&p.y)));
        assert!(mesh.normals.iter().all(|n| (n.length() - 1.0).abs() < 1e-4));
    }
}
