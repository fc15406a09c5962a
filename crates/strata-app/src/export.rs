//! Preview export: PNG textures and Wavefront OBJ meshes on disk.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use strata_config::{Config, PreviewArg};
use strata_mesh::MeshPayload;
use strata_terrain::TextureImage;
use strata_world::{PreviewMode, PreviewRequest, WorldError, WorldSettings, render_preview};

/// Errors raised while exporting.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{0}")]
    World(#[from] WorldError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("PNG encoding error: {0}")]
    Png(#[from] png::EncodingError),
}

pub fn preview_mode(arg: PreviewArg) -> PreviewMode {
    match arg {
        PreviewArg::NoiseMap => PreviewMode::NoiseMap,
        PreviewArg::ColorMap => PreviewMode::ColorMap,
        PreviewArg::HeightMapSolo => PreviewMode::HeightMapSolo,
        PreviewArg::HeightMap => PreviewMode::HeightMap,
        PreviewArg::FalloffMap => PreviewMode::FalloffMap,
    }
}

/// Near and far preview LODs: the first and last configured presets.
fn preview_lods(config: &Config) -> (u8, u8) {
    let presets = &config.lod.presets;
    let near = presets.first().map_or(0, |p| p.lod);
    let far = presets.last().map_or(near, |p| p.lod);
    (near, far)
}

/// Render a preview and write every tile into `out`. Returns the written files.
pub fn export_preview(
    config: &Config,
    mode: PreviewMode,
    out: &Path,
) -> Result<Vec<PathBuf>, ExportError> {
    let settings = WorldSettings::from_config(config)?;
    let (lod_near, lod_far) = preview_lods(config);
    let preview = render_preview(
        &settings,
        &PreviewRequest {
            mode,
            lod_near,
            lod_far,
        },
    )?;

    std::fs::create_dir_all(out)?;
    let mut written = Vec::new();
    for tile in &preview.tiles {
        let stem = format!("{mode}_{}_{}", tile.coord.x, tile.coord.y);

        let png_path = out.join(format!("{stem}.png"));
        write_png(&png_path, &tile.texture)?;
        written.push(png_path);

        if let Some(mesh) = &tile.mesh {
            let obj_path = out.join(format!("{stem}.obj"));
            write_obj(&obj_path, mesh)?;
            tracing::debug!(
                coord = %tile.coord,
                lod = mesh.lod,
                bytes = mesh.memory_usage(),
                "preview mesh written"
            );
            written.push(obj_path);
        }
        if let Some(diagnostics) = &tile.diagnostics {
            tracing::debug!(
                coord = %tile.coord,
                border_edges = diagnostics.border_edges.len(),
                segments = diagnostics.segment_count(),
                "preview diagnostics"
            );
        }
    }
    if preview.unclassified > 0 {
        tracing::warn!(cells = preview.unclassified, "preview has unclassified cells");
    }
    Ok(written)
}

/// Encode an RGBA image as an 8-bit PNG.
pub fn write_png(path: &Path, image: &TextureImage) -> Result<(), ExportError> {
    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = png::Encoder::new(writer, image.width, image.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&image.pixels)?;
    Ok(())
}

/// Write a mesh as Wavefront OBJ with positions, uvs and normals.
pub fn write_obj(path: &Path, mesh: &MeshPayload) -> Result<(), ExportError> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "# lod {}", mesh.lod)?;
    for p in &mesh.positions {
        writeln!(w, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for uv in &mesh.uvs {
        writeln!(w, "vt {} {}", uv.x, uv.y)?;
    }
    for n in &mesh.normals {
        writeln!(w, "vn {} {} {}", n.x, n.y, n.z)?;
    }
    // OBJ indices are 1-based.
    for tri in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] + 1, tri[1] + 1, tri[2] + 1];
        writeln!(w, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
    }
    w.flush()?;
    Ok(())
}
