//! kvs-rs: volume-to-geometry mapping for scientific visualization.
//!
//! A volume holds a scalar or vector field on a structured lattice or an
//! unstructured cell mesh. Mappers turn it into geometry a renderer can draw:
//! isosurfaces, colored point clouds, glyphs and streamlines. Colors and
//! opacities come from a [`TransferFunction`].
//!
//! # Quick Start
//!
//! ```no_run
//! use kvs::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     // distance from the center of a 16^3 lattice
//!     let n = 16;
//!     let center = Vec3::splat(7.5);
//!     let mut values = Vec::new();
//!     for k in 0..n {
//!         for j in 0..n {
//!             for i in 0..n {
//!                 values.push((Vec3::new(i as f32, j as f32, k as f32) - center).length());
//!             }
//!         }
//!     }
//!     let volume: Volume = StructuredVolume::uniform_in_index_space(UVec3::splat(n), 1, values)?.into();
//!
//!     let surface = isosurface(&volume, 5.0, TransferFunction::default())?;
//!     println!("{} triangles", surface.npolygons());
//!     Ok(())
//! }
//! ```
//!
//! # Mappers
//!
//! - [`Isosurface`] - polygon surface where a scalar field equals a level
//! - [`ExtractVertices`] - one point per node, colored by value
//! - [`SphereGlyph`], [`DiamondGlyph`] - one glyph per node or per point
//! - [`Streamline`] - polylines integrated through a vector field
//! - [`FrequencyTable`] - value histogram of a volume or image

pub use kvs_core::{
    CellType, ColorMap, ColorMode, ColorType, DirectionMode, Field, GlyphOptions, Grid, GridType, ImageObject,
    IntegrationDirection, IntegrationMethod, IsosurfaceOptions, KvsError, LineObject, LineType, Mat3,
    NormalType, OpacityMap, OpacityMode, Options, PixelType, PointObject, PolygonObject, Result, RgbColor,
    Scalar, ScalarKind, SizeMode, StreamlineOptions, StructuredVolume, TransferFunction, UVec3,
    UnstructuredVolume, Values, Vec3, Volume,
};
pub use kvs_mapper::{
    cell, CellEvaluator, CellShape, DiamondGlyph, ExtractVertices, FrequencyTable, Glyph, GlyphBase,
    GlyphInstance, Isosurface, SphereGlyph, Streamline, StreamlineBase, TracedLine,
};

/// Installs an `env_logger` backend for the `log` macros used by the mappers.
///
/// Does nothing if a logger is already installed. Verbosity follows `RUST_LOG`.
pub fn init_logging() {
    let _ = env_logger::try_init();
}

/// Extracts the `isolevel` surface of a scalar volume with default options.
pub fn isosurface(volume: &Volume, isolevel: f64, tfunc: TransferFunction) -> Result<PolygonObject> {
    Isosurface::with_isolevel(isolevel, tfunc).exec(volume)
}

/// Turns every node of `volume` into a colored point.
pub fn extract_vertices(volume: &Volume, tfunc: TransferFunction) -> Result<PointObject> {
    ExtractVertices::new(tfunc).exec(volume)
}

/// Traces one streamline per seed through a vector volume.
pub fn streamlines(
    volume: &Volume,
    seeds: Vec<Vec3>,
    options: StreamlineOptions,
    tfunc: TransferFunction,
) -> Result<LineObject> {
    let mut mapper = Streamline::new(options, tfunc);
    mapper.set_seed_points(seeds);
    mapper.exec(volume)
}

/// Places a sphere glyph on every node of `volume`.
pub fn sphere_glyphs(volume: &Volume, options: GlyphOptions, tfunc: TransferFunction) -> Result<PolygonObject> {
    SphereGlyph::new(options, tfunc).exec(volume)
}

/// Places a diamond glyph on every node of `volume`.
pub fn diamond_glyphs(volume: &Volume, options: GlyphOptions, tfunc: TransferFunction) -> Result<PolygonObject> {
    DiamondGlyph::new(options, tfunc).exec(volume)
}

/// Histogram of a scalar volume.
pub fn frequency_table(volume: &Volume) -> Result<FrequencyTable> {
    let mut table = FrequencyTable::new();
    table.create(volume)?;
    Ok(table)
}

/// Geometry produced by [`map_with_options`].
#[derive(Debug, Clone)]
pub enum Mapped {
    Polygon(PolygonObject),
    Line(LineObject),
}

/// Which mapper [`map_with_options`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperKind {
    Isosurface,
    SphereGlyph,
    DiamondGlyph,
    Streamline,
}

/// Runs one mapper configured from an [`Options`] document.
///
/// Streamlines need seed points; the other mappers ignore `seeds`.
pub fn map_with_options(
    kind: MapperKind,
    volume: &Volume,
    options: &Options,
    tfunc: TransferFunction,
    seeds: Vec<Vec3>,
) -> Result<Mapped> {
    log::debug!("mapping with {kind:?}");
    Ok(match kind {
        MapperKind::Isosurface => Mapped::Polygon(Isosurface::new(options.isosurface, tfunc).exec(volume)?),
        MapperKind::SphereGlyph => Mapped::Polygon(sphere_glyphs(volume, options.glyph, tfunc)?),
        MapperKind::DiamondGlyph => Mapped::Polygon(diamond_glyphs(volume, options.glyph, tfunc)?),
        MapperKind::Streamline => Mapped::Line(streamlines(volume, seeds, options.streamline, tfunc)?),
    })
}
