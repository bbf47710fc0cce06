//! Mapping algorithms for kvs-rs.
//!
//! Every mapper reads a [`kvs_core::Volume`] and a
//! [`kvs_core::TransferFunction`] and returns a geometric object:
//! - [`Isosurface`]: marching cubes or marching tetrahedra, a polygon object
//! - [`ExtractVertices`]: one colored point per node
//! - [`SphereGlyph`] and [`DiamondGlyph`]: one polygonal glyph per node or point
//! - [`Streamline`]: polylines integrated through a vector field
//!
//! The [`cell`] module evaluates interpolation bases of unstructured cells and
//! [`FrequencyTable`] builds value histograms.

// Numeric code converts between usize, u32 and f32 constantly
#![allow(clippy::cast_precision_loss)]
// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod cell;
pub mod extract_vertices;
pub mod frequency_table;
pub mod glyph;
pub mod isosurface;
pub mod streamline;

mod normalize;

pub use cell::{CellEvaluator, CellShape};
pub use extract_vertices::ExtractVertices;
pub use frequency_table::FrequencyTable;
pub use glyph::{DiamondGlyph, Glyph, GlyphBase, GlyphInstance, SphereGlyph};
pub use isosurface::Isosurface;
pub use streamline::{Streamline, StreamlineBase, TracedLine};
