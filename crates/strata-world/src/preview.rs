//! Synchronous editor previews over a two by two chunk height field.
//!
//! Previews never touch the meshing pool or any session state; every call
//! builds its own field and returns images, meshes and diagnostics.

use std::fmt;

use strata_lod::MAX_LOD;
use strata_mesh::{ExecutionMode, MeshDiagnostics, MeshPayload};
use strata_terrain::{BORDER_MARGIN, HeightField, TextureImage};

use crate::chunk::ChunkCoord;
use crate::error::WorldError;
use crate::settings::WorldSettings;

/// What a preview shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PreviewMode {
    /// Grayscale heights of the whole field.
    NoiseMap,
    /// Region colors of the first chunk.
    #[default]
    ColorMap,
    /// First chunk meshed at the near LOD.
    HeightMapSolo,
    /// All four chunks meshed, near LOD on the top row and far LOD below.
    HeightMap,
    /// All four chunks meshed and textured with the falloff mask.
    FalloffMap,
}

impl fmt::Display for PreviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoiseMap => "noise-map",
            Self::ColorMap => "color-map",
            Self::HeightMapSolo => "height-map-solo",
            Self::HeightMap => "height-map",
            Self::FalloffMap => "falloff-map",
        };
        f.write_str(name)
    }
}

/// Preview parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreviewRequest {
    pub mode: PreviewMode,
    /// LOD for the top chunk row.
    pub lod_near: u8,
    /// LOD for the bottom chunk row.
    pub lod_far: u8,
}

/// One displayed preview surface.
#[derive(Clone, Debug)]
pub struct PreviewTile {
    pub coord: ChunkCoord,
    pub texture: TextureImage,
    pub mesh: Option<MeshPayload>,
    pub diagnostics: Option<MeshDiagnostics>,
}

/// Everything a preview produced.
#[derive(Clone, Debug)]
pub struct Preview {
    pub mode: PreviewMode,
    pub tiles: Vec<PreviewTile>,
    /// Interior cells of the preview field no region covers.
    pub unclassified: usize,
}

/// Build a preview synchronously.
pub fn render_preview(
    settings: &WorldSettings,
    request: &PreviewRequest,
) -> Result<Preview, WorldError> {
    settings.validate()?;
    let size = settings.chunk_size;
    let vertices = 2 * size + 1;
    let field = HeightField::build(
        settings.seed,
        &settings.noise,
        &settings.regions,
        vertices,
        vertices,
    );
    let lod_near = request.lod_near.min(MAX_LOD);
    let lod_far = request.lod_far.min(MAX_LOD);

    let color_texture = |coord: ChunkCoord| {
        let (ox, oy) = chunk_offset(coord, size);
        field
            .color_region(ox, oy, size, size)
            .map(|region| region.to_image())
            .unwrap_or_else(|| TextureImage::new(size as u32, size as u32))
    };
    let falloff = {
        let padded = (vertices + 2 * BORDER_MARGIN) as u32;
        TextureImage::from_falloff(&settings.falloff_shape, padded, padded)
    };
    let falloff_texture = |coord: ChunkCoord| {
        let (ox, oy) = chunk_offset(coord, size);
        falloff
            .crop(
                (ox + BORDER_MARGIN) as u32,
                (oy + BORDER_MARGIN) as u32,
                size as u32,
                size as u32,
            )
            .unwrap_or_else(|| TextureImage::new(size as u32, size as u32))
    };
    let meshed = |coord: ChunkCoord, texture: TextureImage| {
        let lod = if coord.y == 0 { lod_near } else { lod_far };
        let (ox, oy) = chunk_offset(coord, size);
        let build = settings
            .mesh_builder
            .build_with_mode(&field, ox, oy, lod, ExecutionMode::Preview);
        PreviewTile {
            coord,
            texture,
            mesh: Some(build.payload),
            diagnostics: build.diagnostics,
        }
    };
    let quad = [
        ChunkCoord::new(0, 0),
        ChunkCoord::new(1, 0),
        ChunkCoord::new(0, 1),
        ChunkCoord::new(1, 1),
    ];
    let origin = ChunkCoord::new(0, 0);

    let tiles = match request.mode {
        PreviewMode::NoiseMap => vec![PreviewTile {
            coord: origin,
            texture: field.height_image(),
            mesh: None,
            diagnostics: None,
        }],
        PreviewMode::ColorMap => vec![PreviewTile {
            coord: origin,
            texture: color_texture(origin),
            mesh: None,
            diagnostics: None,
        }],
        PreviewMode::HeightMapSolo => vec![meshed(origin, color_texture(origin))],
        PreviewMode::HeightMap => quad
            .iter()
            .map(|&coord| meshed(coord, color_texture(coord)))
            .collect(),
        PreviewMode::FalloffMap => quad
            .iter()
            .map(|&coord| meshed(coord, falloff_texture(coord)))
            .collect(),
    };

    tracing::info!(
        mode = %request.mode,
        tiles = tiles.len(),
        unclassified = field.unclassified_count(),
        "preview rendered"
    );

    Ok(Preview {
        mode: request.mode,
        tiles,
        unclassified: field.unclassified_count(),
    })
}

fn chunk_offset(coord: ChunkCoord, chunk_size: usize) -> (usize, usize) {
    (coord.x as usize * chunk_size, coord.y as usize * chunk_size)
}
