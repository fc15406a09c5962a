//! Procedural height fields: layered multi-octave noise, falloff masking,
//! height-threshold color classification, and padded height fields that mesh
//! builders can sample beyond chunk edges.

mod curve;
mod error;
mod falloff;
mod height_field;
mod image;
mod noise_field;
mod noise_layer;
mod region;
mod seed;

pub use curve::HeightCurve;
pub use error::TerrainError;
pub use falloff::FalloffMask;
pub use height_field::{BORDER_MARGIN, ColorRegion, HeightField};
pub use image::TextureImage;
pub use noise_field::{DEFAULT_NOISE_BATCHES, HeightGrid, NoiseField};
pub use noise_layer::{MIN_SCALE, NoiseLayer};
pub use region::{Color, Region, RegionTable};
pub use seed::{OFFSET_RANGE, octave_offsets};
pub use strata_config::NoiseKind;
