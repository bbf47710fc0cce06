//! Geometric output objects produced by the mappers.
//!
//! Each object is a plain bundle of arrays. The mapper fills it once and hands
//! it to the caller; the flat byte views (`*_as_f32`, `colors_as_bytes`) are
//! what a renderer uploads.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::color::RgbColor;
use crate::volume::bounding_box;

/// Whether normals are stored per vertex or per polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NormalType {
    #[default]
    VertexNormal,
    PolygonNormal,
}

/// Whether colors are stored per vertex or per primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ColorType {
    #[default]
    VertexColor,
    PolygonColor,
}

/// How the connections of a [`LineObject`] are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LineType {
    /// One strip through every vertex; no connections.
    #[default]
    Strip,
    /// One strip through the vertices listed in the connections.
    Uniline,
    /// Several strips; connections hold a `[first, last]` vertex pair per strip.
    Polyline,
    /// Independent segments; connections hold two vertices per segment.
    Segment,
}

/// A triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonObject {
    coords: Vec<Vec3>,
    colors: Vec<RgbColor>,
    normals: Vec<Vec3>,
    connections: Vec<u32>,
    opacities: Vec<u8>,
    color_type: ColorType,
    normal_type: NormalType,
    bounds: Option<(Vec3, Vec3)>,
}

impl PolygonObject {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_coords(&mut self, coords: Vec<Vec3>) {
        self.coords = coords;
    }

    pub fn set_colors(&mut self, colors: Vec<RgbColor>) {
        self.colors = colors;
    }

    /// Sets one color shared by every vertex.
    pub fn set_color(&mut self, color: RgbColor) {
        self.colors = vec![color];
    }

    pub fn set_normals(&mut self, normals: Vec<Vec3>) {
        self.normals = normals;
    }

    pub fn set_connections(&mut self, connections: Vec<u32>) {
        self.connections = connections;
    }

    pub fn set_opacities(&mut self, opacities: Vec<u8>) {
        self.opacities = opacities;
    }

    /// Sets one opacity shared by every polygon.
    pub fn set_opacity(&mut self, opacity: u8) {
        self.opacities = vec![opacity];
    }

    pub fn set_color_type(&mut self, color_type: ColorType) {
        self.color_type = color_type;
    }

    pub fn set_normal_type(&mut self, normal_type: NormalType) {
        self.normal_type = normal_type;
    }

    /// Sets the bounding box explicitly instead of deriving it from the coordinates.
    pub fn set_min_max_coords(&mut self, min: Vec3, max: Vec3) {
        self.bounds = Some((min, max));
    }

    /// Recomputes the bounding box from the coordinates.
    pub fn update_min_max_coords(&mut self) {
        self.bounds = Some(bounding_box(&self.coords));
    }

    #[must_use]
    pub fn coords(&self) -> &[Vec3] {
        &self.coords
    }

    #[must_use]
    pub fn colors(&self) -> &[RgbColor] {
        &self.colors
    }

    #[must_use]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    #[must_use]
    pub fn connections(&self) -> &[u32] {
        &self.connections
    }

    #[must_use]
    pub fn opacities(&self) -> &[u8] {
        &self.opacities
    }

    #[must_use]
    pub fn color_type(&self) -> ColorType {
        self.color_type
    }

    #[must_use]
    pub fn normal_type(&self) -> NormalType {
        self.normal_type
    }

    #[must_use]
    pub fn nvertices(&self) -> usize {
        self.coords.len()
    }

    /// Number of triangles. Without connections every three vertices form one.
    #[must_use]
    pub fn npolygons(&self) -> usize {
        if self.connections.is_empty() {
            self.coords.len() / 3
        } else {
            self.connections.len() / 3
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Bounding box, or `None` if it was never set or computed.
    #[must_use]
    pub fn min_max_coords(&self) -> Option<(Vec3, Vec3)> {
        self.bounds
    }

    /// Coordinates as a flat `[x, y, z, x, y, z, ...]` slice.
    #[must_use]
    pub fn coords_as_f32(&self) -> &[f32] {
        bytemuck::cast_slice(&self.coords)
    }

    /// Normals as a flat float slice.
    #[must_use]
    pub fn normals_as_f32(&self) -> &[f32] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Colors as a flat `[r, g, b, ...]` byte slice.
    #[must_use]
    pub fn colors_as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }
}

/// A set of polylines or segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineObject {
    coords: Vec<Vec3>,
    colors: Vec<RgbColor>,
    connections: Vec<u32>,
    size: f32,
    line_type: LineType,
    color_type: ColorType,
    bounds: Option<(Vec3, Vec3)>,
}

impl LineObject {
    #[must_use]
    pub fn new() -> Self {
        Self {
            size: 1.0,
            ..Self::default()
        }
    }

    pub fn set_coords(&mut self, coords: Vec<Vec3>) {
        self.coords = coords;
    }

    pub fn set_colors(&mut self, colors: Vec<RgbColor>) {
        self.colors = colors;
    }

    pub fn set_connections(&mut self, connections: Vec<u32>) {
        self.connections = connections;
    }

    /// Line width.
    pub fn set_size(&mut self, size: f32) {
        self.size = size;
    }

    pub fn set_line_type(&mut self, line_type: LineType) {
        self.line_type = line_type;
    }

    pub fn set_color_type(&mut self, color_type: ColorType) {
        self.color_type = color_type;
    }

    pub fn update_min_max_coords(&mut self) {
        self.bounds = Some(bounding_box(&self.coords));
    }

    #[must_use]
    pub fn coords(&self) -> &[Vec3] {
        &self.coords
    }

    #[must_use]
    pub fn colors(&self) -> &[RgbColor] {
        &self.colors
    }

    #[must_use]
    pub fn connections(&self) -> &[u32] {
        &self.connections
    }

    #[must_use]
    pub fn size(&self) -> f32 {
        self.size
    }

    #[must_use]
    pub fn line_type(&self) -> LineType {
        self.line_type
    }

    #[must_use]
    pub fn color_type(&self) -> ColorType {
        self.color_type
    }

    #[must_use]
    pub fn nvertices(&self) -> usize {
        self.coords.len()
    }

    /// Number of connected strips (or segments for [`LineType::Segment`]).
    #[must_use]
    pub fn nlines(&self) -> usize {
        match self.line_type {
            LineType::Strip | LineType::Uniline => usize::from(!self.coords.is_empty()),
            LineType::Polyline | LineType::Segment => self.connections.len() / 2,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    #[must_use]
    pub fn min_max_coords(&self) -> Option<(Vec3, Vec3)> {
        self.bounds
    }

    #[must_use]
    pub fn coords_as_f32(&self) -> &[f32] {
        bytemuck::cast_slice(&self.coords)
    }

    #[must_use]
    pub fn colors_as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }
}

/// A set of points with optional normals and per-point sizes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointObject {
    coords: Vec<Vec3>,
    colors: Vec<RgbColor>,
    normals: Vec<Vec3>,
    sizes: Vec<f32>,
    bounds: Option<(Vec3, Vec3)>,
}

impl PointObject {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_coords(&mut self, coords: Vec<Vec3>) {
        self.coords = coords;
    }

    pub fn set_colors(&mut self, colors: Vec<RgbColor>) {
        self.colors = colors;
    }

    pub fn set_normals(&mut self, normals: Vec<Vec3>) {
        self.normals = normals;
    }

    pub fn set_sizes(&mut self, sizes: Vec<f32>) {
        self.sizes = sizes;
    }

    pub fn set_min_max_coords(&mut self, min: Vec3, max: Vec3) {
        self.bounds = Some((min, max));
    }

    pub fn update_min_max_coords(&mut self) {
        self.bounds = Some(bounding_box(&self.coords));
    }

    #[must_use]
    pub fn coords(&self) -> &[Vec3] {
        &self.coords
    }

    #[must_use]
    pub fn colors(&self) -> &[RgbColor] {
        &self.colors
    }

    #[must_use]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    #[must_use]
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    #[must_use]
    pub fn nvertices(&self) -> usize {
        self.coords.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    #[must_use]
    pub fn min_max_coords(&self) -> Option<(Vec3, Vec3)> {
        self.bounds
    }

    #[must_use]
    pub fn coords_as_f32(&self) -> &[f32] {
        bytemuck::cast_slice(&self.coords)
    }

    #[must_use]
    pub fn colors_as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_flat_views() {
        let mut polygon = PolygonObject::new();
        polygon.set_coords(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        polygon.set_colors(vec![RgbColor::new(1, 2, 3); 3]);
        assert_eq!(polygon.coords_as_f32(), &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(polygon.colors_as_bytes().len(), 9);
        assert_eq!(polygon.npolygons(), 1);

        polygon.set_normals(vec![Vec3::Z; 3]);
        assert_eq!(polygon.normals_as_f32(), &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);

        polygon.set_connections(vec![0, 1, 2, 2, 1, 0]);
        assert_eq!(polygon.npolygons(), 2);
    }

    #[test]
    fn test_polygon_bounds() {
        let mut polygon = PolygonObject::new();
        assert!(polygon.min_max_coords().is_none());
        polygon.set_coords(vec![Vec3::new(-1.0, 2.0, 0.0), Vec3::new(3.0, 0.0, 1.0)]);
        polygon.update_min_max_coords();
        assert_eq!(
            polygon.min_max_coords(),
            Some((Vec3::new(-1.0, 0.0, 0.0), Vec3::new(3.0, 2.0, 1.0)))
        );
    }

    #[test]
    fn test_line_counts() {
        let mut line = LineObject::new();
        assert_eq!(line.nlines(), 0);
        line.set_coords(vec![Vec3::ZERO; 5]);
        assert_eq!(line.nlines(), 1);
        line.set_line_type(LineType::Polyline);
        line.set_connections(vec![0, 2, 3, 4]);
        assert_eq!(line.nlines(), 2);
        assert!((line.size() - 1.0).abs() < f32::EPSILON);
    }
}
