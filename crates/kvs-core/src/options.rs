//! Configuration options for the mappers.
//!
//! Every mapper is built from one of these option structs. They round-trip
//! through JSON so a pipeline can be described in a file.

use serde::{Deserialize, Serialize};

use crate::color::RgbColor;
use crate::error::Result;
pub use crate::geometry::NormalType;

/// Numerical integration scheme for streamlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum IntegrationMethod {
    Euler,
    RungeKutta2nd,
    #[default]
    RungeKutta4th,
}

/// Which way a streamline is traced from its seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum IntegrationDirection {
    #[default]
    Forward,
    Backward,
    Both,
}

impl IntegrationDirection {
    /// Sign applied to the step for a single-sided trace.
    #[must_use]
    pub fn sign(self) -> f32 {
        match self {
            Self::Backward => -1.0,
            Self::Forward | Self::Both => 1.0,
        }
    }
}

/// Glyph size source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SizeMode {
    #[default]
    SizeByDefault,
    SizeByMagnitude,
}

/// Glyph orientation source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DirectionMode {
    #[default]
    DirectionByDefault,
    DirectionByNormal,
}

/// Glyph color source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ColorMode {
    #[default]
    ColorByDefault,
    ColorByMagnitude,
}

/// Glyph opacity source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OpacityMode {
    #[default]
    OpacityByDefault,
    OpacityByMagnitude,
}

/// Isosurface extraction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsosurfaceOptions {
    /// Scalar threshold of the surface.
    pub isolevel: f64,
    /// Normals per vertex (shared vertices) or per triangle.
    pub normal_type: NormalType,
    /// Emit three private vertices per triangle. Ignored with vertex normals.
    pub duplication: bool,
}

impl Default for IsosurfaceOptions {
    fn default() -> Self {
        Self {
            isolevel: 0.0,
            normal_type: NormalType::PolygonNormal,
            duplication: true,
        }
    }
}

/// Streamline integration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct StreamlineOptions {
    pub integration_method: IntegrationMethod,
    pub integration_direction: IntegrationDirection,
    /// Step length in object coordinates; each stage moves this far along
    /// the unit field direction.
    pub integration_interval: f32,
    /// Tracing stops once the local vector is shorter than this.
    pub vector_length_threshold: f32,
    /// Tracing stops after this many steps.
    pub integration_times_threshold: usize,
    pub enable_boundary_condition: bool,
    pub enable_vector_length_condition: bool,
    pub enable_integration_times_condition: bool,
    /// Lines with fewer vertices are discarded after tracing.
    pub min_vertices: usize,
}

impl Default for StreamlineOptions {
    fn default() -> Self {
        Self {
            integration_method: IntegrationMethod::RungeKutta4th,
            integration_direction: IntegrationDirection::Forward,
            integration_interval: 0.35,
            vector_length_threshold: 1.0e-6,
            integration_times_threshold: 256,
            enable_boundary_condition: true,
            enable_vector_length_condition: true,
            enable_integration_times_condition: true,
            min_vertices: 2,
        }
    }
}

/// Glyph placement parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphOptions {
    pub size_mode: SizeMode,
    pub direction_mode: DirectionMode,
    pub color_mode: ColorMode,
    /// `OpacityByMagnitude` applies to volumes only; point sets always use
    /// `default_opacity`.
    pub opacity_mode: OpacityMode,
    /// Multiplier applied to every glyph size.
    pub scale: f32,
    pub default_size: f32,
    pub default_color: RgbColor,
    pub default_opacity: u8,
    /// Sphere tessellation around the axis.
    pub nslices: u32,
    /// Sphere tessellation along the axis.
    pub nstacks: u32,
}

impl Default for GlyphOptions {
    fn default() -> Self {
        Self {
            size_mode: SizeMode::default(),
            direction_mode: DirectionMode::default(),
            color_mode: ColorMode::default(),
            opacity_mode: OpacityMode::default(),
            scale: 1.0,
            default_size: 1.0,
            default_color: RgbColor::WHITE,
            default_opacity: 255,
            nslices: 10,
            nstacks: 10,
        }
    }
}

/// Options for every mapper in one document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub isosurface: IsosurfaceOptions,
    pub streamline: StreamlineOptions,
    pub glyph: GlyphOptions,
}

impl Options {
    /// Parses options from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the options to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
