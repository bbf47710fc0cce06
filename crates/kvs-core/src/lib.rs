//! Core data model for kvs-rs.
//!
//! This crate provides the types shared by every mapper:
//! - [`Volume`] with its structured and unstructured variants and a typed [`Values`] buffer
//! - [`PolygonObject`], [`LineObject`] and [`PointObject`] as mapping results
//! - [`ColorMap`], [`OpacityMap`] and [`TransferFunction`] for scalar-to-appearance mapping
//! - Configuration options and the error type

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Index-heavy numeric code converts between usize, u32 and f32 constantly
#![allow(clippy::cast_precision_loss)]

pub mod color;
pub mod color_map;
pub mod error;
pub mod geometry;
pub mod image;
pub mod opacity_map;
pub mod options;
pub mod transfer_function;
pub mod value;
pub mod volume;

pub use color::RgbColor;
pub use color_map::ColorMap;
pub use error::{KvsError, Result};
pub use geometry::{ColorType, LineObject, LineType, NormalType, PointObject, PolygonObject};
pub use image::{ImageObject, PixelType};
pub use opacity_map::OpacityMap;
pub use options::{
    ColorMode, DirectionMode, GlyphOptions, IntegrationDirection, IntegrationMethod,
    IsosurfaceOptions, OpacityMode, Options, SizeMode, StreamlineOptions,
};
pub use transfer_function::TransferFunction;
pub use value::{Scalar, ScalarKind, Values};
pub use volume::{CellType, Field, Grid, GridType, StructuredVolume, UnstructuredVolume, Volume};

// Re-export glam types for convenience
pub use glam::{Mat3, UVec3, Vec3};
