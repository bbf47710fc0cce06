//! Volume objects: the field data consumed by every mapper.
//!
//! # Overview
//!
//! Two topologies are supported:
//! - [`StructuredVolume`]: a logically regular `rx × ry × rz` lattice of nodes whose
//!   positions come from a [`Grid`] (uniform box, rectilinear axes, or explicit
//!   curvilinear coordinates). Nodes are indexed with x varying fastest.
//! - [`UnstructuredVolume`]: explicit node coordinates plus a flat connection
//!   list of one [`CellType`].
//!
//! Both carry a [`Field`]: a typed value buffer with `veclen` components per node
//! and a lazily filled min/max cache. Replacing the values invalidates the cache.

use std::sync::OnceLock;

use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{KvsError, Result};
use crate::value::Values;

/// Node placement of a structured volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridType {
    Uniform,
    Rectilinear,
    Curvilinear,
}

/// Node positions of a structured volume.
#[derive(Debug, Clone, PartialEq)]
pub enum Grid {
    /// Nodes evenly spaced inside an axis-aligned box.
    Uniform { min: Vec3, max: Vec3 },
    /// Per-axis node positions; the node set is their tensor product.
    Rectilinear { axes: [Vec<f32>; 3] },
    /// One explicit position per node.
    Curvilinear { coords: Vec<Vec3> },
}

impl Grid {
    #[must_use]
    pub fn grid_type(&self) -> GridType {
        match self {
            Self::Uniform { .. } => GridType::Uniform,
            Self::Rectilinear { .. } => GridType::Rectilinear,
            Self::Curvilinear { .. } => GridType::Curvilinear,
        }
    }
}

/// Cell topology of an unstructured volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    Tetrahedra,
    Hexahedra,
    QuadraticTetrahedra,
    QuadraticHexahedra,
    Pyramid,
    Prism,
}

impl CellType {
    /// Number of nodes per cell.
    #[must_use]
    pub fn nnodes(self) -> usize {
        match self {
            Self::Tetrahedra => 4,
            Self::Hexahedra => 8,
            Self::QuadraticTetrahedra => 10,
            Self::QuadraticHexahedra => 20,
            Self::Pyramid => 5,
            Self::Prism => 6,
        }
    }
}

/// Node values of a volume with a min/max cache.
#[derive(Debug, Clone)]
pub struct Field {
    veclen: usize,
    values: Values,
    min_max: OnceLock<(f64, f64)>,
}

impl Field {
    /// Creates a field holding `nnodes` samples of `veclen` components.
    pub fn new(nnodes: usize, veclen: usize, values: Values) -> Result<Self> {
        if veclen == 0 {
            return Err(KvsError::InvalidResolution("veclen must be at least 1".into()));
        }
        if values.len() != nnodes * veclen {
            return Err(KvsError::SizeMismatch {
                expected: nnodes * veclen,
                actual: values.len(),
            });
        }
        Ok(Self {
            veclen,
            values,
            min_max: OnceLock::new(),
        })
    }

    #[must_use]
    pub fn veclen(&self) -> usize {
        self.veclen
    }

    #[must_use]
    pub fn values(&self) -> &Values {
        &self.values
    }

    /// Number of node samples.
    #[must_use]
    pub fn nsamples(&self) -> usize {
        self.values.len() / self.veclen
    }

    /// Scalar used for ranges and coloring: the value itself for scalar
    /// fields, the vector magnitude otherwise.
    #[must_use]
    #[inline]
    pub fn scalar(&self, node: usize) -> f64 {
        if self.veclen == 1 {
            self.values.get_f64(node)
        } else {
            self.values.magnitude(node, self.veclen)
        }
    }

    /// First three components of a node sample (missing components are zero).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn vector(&self, node: usize) -> Vec3 {
        let base = node * self.veclen;
        let mut v = Vec3::ZERO;
        for c in 0..self.veclen.min(3) {
            v[c] = self.values.get_f64(base + c) as f32;
        }
        v
    }

    /// Returns true once the min/max values are known.
    #[must_use]
    pub fn has_min_max_values(&self) -> bool {
        self.min_max.get().is_some()
    }

    /// Scans the values and fills the min/max cache if it is empty.
    pub fn update_min_max_values(&self) {
        let _ = self.min_max_values();
    }

    /// Overrides the min/max values, e.g. with a known physical range.
    pub fn set_min_max_values(&mut self, min: f64, max: f64) {
        self.min_max = OnceLock::from((min, max));
    }

    /// Returns the cached min/max values, computing them on first use.
    #[must_use]
    pub fn min_max_values(&self) -> (f64, f64) {
        *self.min_max.get_or_init(|| self.compute_min_max())
    }

    #[must_use]
    pub fn min_value(&self) -> f64 {
        self.min_max_values().0
    }

    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.min_max_values().1
    }

    /// Replaces the values and invalidates the min/max cache.
    pub fn set_values(&mut self, veclen: usize, values: Values) -> Result<()> {
        *self = Self::new(self.nsamples(), veclen, values)?;
        Ok(())
    }

    fn compute_min_max(&self) -> (f64, f64) {
        let n = self.nsamples();
        if n == 0 {
            log::warn!("min/max requested on an empty field");
            return (0.0, 0.0);
        }
        let (lo, hi) = (0..n)
            .map(|i| self.scalar(i))
            .filter(|s| s.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| (lo.min(s), hi.max(s)));
        if lo > hi {
            log::warn!("field has no finite samples");
            return (0.0, 0.0);
        }
        (lo, hi)
    }
}

/// A volume on a logically regular lattice.
#[derive(Debug, Clone)]
pub struct StructuredVolume {
    resolution: UVec3,
    grid: Grid,
    field: Field,
}

impl StructuredVolume {
    /// Creates a uniform volume spanning the box `[min, max]`.
    pub fn uniform(
        resolution: UVec3,
        min: Vec3,
        max: Vec3,
        veclen: usize,
        values: impl Into<Values>,
    ) -> Result<Self> {
        Self::new(resolution, Grid::Uniform { min, max }, veclen, values.into())
    }

    /// Creates a uniform volume whose box is the index space `[0, resolution - 1]`.
    pub fn uniform_in_index_space(
        resolution: UVec3,
        veclen: usize,
        values: impl Into<Values>,
    ) -> Result<Self> {
        let max = resolution.saturating_sub(UVec3::ONE).as_vec3();
        Self::uniform(resolution, Vec3::ZERO, max, veclen, values)
    }

    /// Creates a rectilinear volume from per-axis node positions.
    pub fn rectilinear(axes: [Vec<f32>; 3], veclen: usize, values: impl Into<Values>) -> Result<Self> {
        #[allow(clippy::cast_possible_truncation)]
        let resolution = UVec3::new(axes[0].len() as u32, axes[1].len() as u32, axes[2].len() as u32);
        Self::new(resolution, Grid::Rectilinear { axes }, veclen, values.into())
    }

    /// Creates a curvilinear volume with one explicit position per node.
    pub fn curvilinear(
        resolution: UVec3,
        coords: Vec<Vec3>,
        veclen: usize,
        values: impl Into<Values>,
    ) -> Result<Self> {
        let expected = resolution.x as usize * resolution.y as usize * resolution.z as usize;
        if coords.len() != expected {
            return Err(KvsError::SizeMismatch {
                expected,
                actual: coords.len(),
            });
        }
        Self::new(resolution, Grid::Curvilinear { coords }, veclen, values.into())
    }

    fn new(resolution: UVec3, grid: Grid, veclen: usize, values: Values) -> Result<Self> {
        if resolution.min_element() < 2 {
            return Err(KvsError::InvalidResolution(format!(
                "every axis needs at least 2 nodes, got {resolution}"
            )));
        }
        let nnodes = resolution.x as usize * resolution.y as usize * resolution.z as usize;
        let field = Field::new(nnodes, veclen, values)?;
        Ok(Self {
            resolution,
            grid,
            field,
        })
    }

    #[must_use]
    pub fn resolution(&self) -> UVec3 {
        self.resolution
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn grid_type(&self) -> GridType {
        self.grid.grid_type()
    }

    #[must_use]
    pub fn nnodes(&self) -> usize {
        self.resolution.x as usize * self.resolution.y as usize * self.resolution.z as usize
    }

    #[must_use]
    pub fn ncells(&self) -> usize {
        let c = self.resolution - UVec3::ONE;
        c.x as usize * c.y as usize * c.z as usize
    }

    #[must_use]
    pub fn field(&self) -> &Field {
        &self.field
    }

    #[must_use]
    pub fn field_mut(&mut self) -> &mut Field {
        &mut self.field
    }

    /// Linear node index with x varying fastest.
    #[must_use]
    #[inline]
    pub fn node_index(&self, i: u32, j: u32, k: u32) -> usize {
        let r = self.resolution;
        (k as usize * r.y as usize + j as usize) * r.x as usize + i as usize
    }

    /// Position of node `(i, j, k)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn node_coord(&self, i: u32, j: u32, k: u32) -> Vec3 {
        match &self.grid {
            Grid::Uniform { min, max } => {
                let spacing = (*max - *min) / (self.resolution - UVec3::ONE).as_vec3();
                *min + spacing * Vec3::new(i as f32, j as f32, k as f32)
            }
            Grid::Rectilinear { axes } => Vec3::new(
                axes[0][i as usize],
                axes[1][j as usize],
                axes[2][k as usize],
            ),
            Grid::Curvilinear { coords } => coords[self.node_index(i, j, k)],
        }
    }

    /// Bounding box of the node positions.
    #[must_use]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        match &self.grid {
            Grid::Uniform { min, max } => (min.min(*max), min.max(*max)),
            Grid::Rectilinear { axes } => {
                let range = |a: &[f32]| {
                    a.iter()
                        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &x| {
                            (lo.min(x), hi.max(x))
                        })
                };
                let (x0, x1) = range(&axes[0]);
                let (y0, y1) = range(&axes[1]);
                let (z0, z1) = range(&axes[2]);
                (Vec3::new(x0, y0, z0), Vec3::new(x1, y1, z1))
            }
            Grid::Curvilinear { coords } => bounding_box(coords),
        }
    }
}

/// A volume made of explicit cells.
#[derive(Debug, Clone)]
pub struct UnstructuredVolume {
    cell_type: CellType,
    coords: Vec<Vec3>,
    connections: Vec<u32>,
    field: Field,
}

impl UnstructuredVolume {
    /// Creates a volume from node positions and `cell_type.nnodes()` connections per cell.
    pub fn new(
        cell_type: CellType,
        coords: Vec<Vec3>,
        connections: Vec<u32>,
        veclen: usize,
        values: impl Into<Values>,
    ) -> Result<Self> {
        let per_cell = cell_type.nnodes();
        if connections.len() % per_cell != 0 {
            return Err(KvsError::SizeMismatch {
                expected: connections.len().next_multiple_of(per_cell),
                actual: connections.len(),
            });
        }
        if let Some(&bad) = connections.iter().find(|&&c| c as usize >= coords.len()) {
            return Err(KvsError::SizeMismatch {
                expected: coords.len(),
                actual: bad as usize + 1,
            });
        }
        let field = Field::new(coords.len(), veclen, values.into())?;
        Ok(Self {
            cell_type,
            coords,
            connections,
            field,
        })
    }

    #[must_use]
    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    #[must_use]
    pub fn nnodes(&self) -> usize {
        self.coords.len()
    }

    #[must_use]
    pub fn ncells(&self) -> usize {
        self.connections.len() / self.cell_type.nnodes()
    }

    #[must_use]
    pub fn coords(&self) -> &[Vec3] {
        &self.coords
    }

    #[must_use]
    pub fn connections(&self) -> &[u32] {
        &self.connections
    }

    /// Node indices of cell `index`.
    ///
    /// # Panics
    /// Panics if `index >= ncells()`.
    #[must_use]
    pub fn cell_connections(&self, index: usize) -> &[u32] {
        let n = self.cell_type.nnodes();
        &self.connections[n * index..n * (index + 1)]
    }

    #[must_use]
    pub fn field(&self) -> &Field {
        &self.field
    }

    #[must_use]
    pub fn field_mut(&mut self) -> &mut Field {
        &mut self.field
    }

    #[must_use]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        bounding_box(&self.coords)
    }
}

/// Either volume topology.
#[derive(Debug, Clone)]
pub enum Volume {
    Structured(StructuredVolume),
    Unstructured(UnstructuredVolume),
}

impl Volume {
    #[must_use]
    pub fn field(&self) -> &Field {
        match self {
            Self::Structured(v) => v.field(),
            Self::Unstructured(v) => v.field(),
        }
    }

    #[must_use]
    pub fn field_mut(&mut self) -> &mut Field {
        match self {
            Self::Structured(v) => v.field_mut(),
            Self::Unstructured(v) => v.field_mut(),
        }
    }

    #[must_use]
    pub fn veclen(&self) -> usize {
        self.field().veclen()
    }

    #[must_use]
    pub fn values(&self) -> &Values {
        self.field().values()
    }

    #[must_use]
    pub fn nnodes(&self) -> usize {
        match self {
            Self::Structured(v) => v.nnodes(),
            Self::Unstructured(v) => v.nnodes(),
        }
    }

    #[must_use]
    pub fn ncells(&self) -> usize {
        match self {
            Self::Structured(v) => v.ncells(),
            Self::Unstructured(v) => v.ncells(),
        }
    }

    #[must_use]
    pub fn has_min_max_values(&self) -> bool {
        self.field().has_min_max_values()
    }

    pub fn update_min_max_values(&self) {
        self.field().update_min_max_values();
    }

    pub fn set_min_max_values(&mut self, min: f64, max: f64) {
        self.field_mut().set_min_max_values(min, max);
    }

    #[must_use]
    pub fn min_value(&self) -> f64 {
        self.field().min_value()
    }

    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.field().max_value()
    }

    /// Bounding box of the node positions.
    #[must_use]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        match self {
            Self::Structured(v) => v.bounds(),
            Self::Unstructured(v) => v.bounds(),
        }
    }
}

impl From<StructuredVolume> for Volume {
    fn from(volume: StructuredVolume) -> Self {
        Self::Structured(volume)
    }
}

impl From<UnstructuredVolume> for Volume {
    fn from(volume: UnstructuredVolume) -> Self {
        Self::Unstructured(volume)
    }
}

/// Axis-aligned bounding box of a point set; `(ZERO, ZERO)` when empty.
#[must_use]
pub fn bounding_box(points: &[Vec3]) -> (Vec3, Vec3) {
    if points.is_empty() {
        return (Vec3::ZERO, Vec3::ZERO);
    }
    points.iter().fold(
        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
        |(lo, hi), p| (lo.min(*p), hi.max(*p)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::cast_precision_loss)]
    fn ramp(n: usize) -> Vec<f32> {
        (0..n).map(|i| i as f32).collect()
    }

    #[test]
    fn test_uniform_node_layout() {
        let vol = StructuredVolume::uniform(
            UVec3::new(3, 2, 2),
            Vec3::ZERO,
            Vec3::new(2.0, 1.0, 4.0),
            1,
            ramp(12),
        )
        .unwrap();
        assert_eq!(vol.nnodes(), 12);
        assert_eq!(vol.ncells(), 2);
        assert_eq!(vol.node_index(1, 0, 0), 1);
        assert_eq!(vol.node_index(0, 1, 0), 3);
        assert_eq!(vol.node_index(0, 0, 1), 6);
        assert_eq!(vol.node_coord(2, 1, 1), Vec3::new(2.0, 1.0, 4.0));
        assert_eq!(vol.node_coord(1, 0, 1), Vec3::new(1.0, 0.0, 4.0));
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let err = StructuredVolume::uniform_in_index_space(UVec3::splat(2), 1, ramp(7)).unwrap_err();
        assert!(matches!(err, KvsError::SizeMismatch { expected: 8, actual: 7 }));
    }

    #[test]
    fn test_min_max_cache_and_invalidation() {
        let mut vol = StructuredVolume::uniform_in_index_space(UVec3::splat(2), 1, ramp(8)).unwrap();
        assert!(!vol.field().has_min_max_values());
        vol.field().update_min_max_values();
        assert!(vol.field().has_min_max_values());
        assert_eq!(vol.field().min_max_values(), (0.0, 7.0));

        vol.field_mut().set_values(1, Values::from(vec![5_u8; 8])).unwrap();
        assert!(!vol.field().has_min_max_values());
        assert_eq!(vol.field().min_max_values(), (5.0, 5.0));
    }

    #[test]
    fn test_min_max_skips_non_finite_samples() {
        let values = vec![0.0_f32, 1.0, f32::NAN, 2.0, f32::INFINITY, 3.0, f32::NEG_INFINITY, 4.0];
        let vol = StructuredVolume::uniform_in_index_space(UVec3::splat(2), 1, values).unwrap();
        assert_eq!(vol.field().min_max_values(), (0.0, 4.0));

        let vol = StructuredVolume::uniform_in_index_space(UVec3::splat(2), 1, vec![f32::NAN; 8]).unwrap();
        assert_eq!(vol.field().min_max_values(), (0.0, 0.0));
    }

    #[test]
    fn test_set_min_max_override() {
        let mut vol: Volume =
            StructuredVolume::uniform_in_index_space(UVec3::splat(2), 1, ramp(8)).unwrap().into();
        vol.set_min_max_values(-1.0, 10.0);
        assert!(vol.has_min_max_values());
        assert_eq!(vol.min_value(), -1.0);
        assert_eq!(vol.max_value(), 10.0);
    }

    #[test]
    fn test_vector_field_min_max_uses_magnitude() {
        let values = vec![3.0_f32, 4.0, 0.0].repeat(8);
        let vol = StructuredVolume::uniform_in_index_space(UVec3::splat(2), 3, values).unwrap();
        assert_eq!(vol.field().min_max_values(), (5.0, 5.0));
        assert_eq!(vol.field().vector(3), Vec3::new(3.0, 4.0, 0.0));
    }

    #[test]
    fn test_rectilinear_coords_and_bounds() {
        let axes = [vec![0.0, 1.0, 3.0], vec![0.0, 2.0], vec![-1.0, 1.0]];
        let vol = StructuredVolume::rectilinear(axes, 1, ramp(12)).unwrap();
        assert_eq!(vol.resolution(), UVec3::new(3, 2, 2));
        assert_eq!(vol.node_coord(2, 1, 0), Vec3::new(3.0, 2.0, -1.0));
        assert_eq!(vol.bounds(), (Vec3::new(0.0, 0.0, -1.0), Vec3::new(3.0, 2.0, 1.0)));
    }

    #[test]
    fn test_unstructured_cells() {
        let coords = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z, Vec3::ONE];
        let vol = UnstructuredVolume::new(
            CellType::Tetrahedra,
            coords,
            vec![0, 1, 2, 3, 1, 2, 3, 4],
            1,
            ramp(5),
        )
        .unwrap();
        assert_eq!(vol.ncells(), 2);
        assert_eq!(vol.cell_connections(1), &[1, 2, 3, 4]);

        let bad = UnstructuredVolume::new(CellType::Tetrahedra, vec![Vec3::ZERO; 3], vec![0, 1, 2, 3], 1, ramp(3));
        assert!(bad.is_err());
    }
}
