//! Trilinear hexahedron.

use glam::Vec3;
use kvs_core::CellType;

use super::{CellShape, MIDPOINT_GRID};

/// Local corner positions: top face (z = 1) first, then the bottom face.
pub(crate) const CORNERS: [Vec3; 8] = [
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(1.0, 0.0, 1.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(0.0, 1.0, 1.0),
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(0.0, 1.0, 0.0),
];

/// Eight-node hexahedron.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hexahedral;

/// Linear factor of a corner along one axis: `x` at the far side, `1 - x` at the near side.
#[inline]
fn factor(corner: f32, x: f32) -> f32 {
    if corner > 0.5 {
        x
    } else {
        1.0 - x
    }
}

/// Derivative of [`factor`] along its axis.
#[inline]
fn slope(corner: f32) -> f32 {
    if corner > 0.5 {
        1.0
    } else {
        -1.0
    }
}

impl CellShape for Hexahedral {
    fn cell_type(&self) -> CellType {
        CellType::Hexahedra
    }

    fn interpolation_functions(&self, p: Vec3, n: &mut [f32]) {
        for (w, c) in n.iter_mut().zip(CORNERS) {
            *w = factor(c.x, p.x) * factor(c.y, p.y) * factor(c.z, p.z);
        }
    }

    fn differential_functions(&self, p: Vec3, dndx: &mut [f32], dndy: &mut [f32], dndz: &mut [f32]) {
        for (i, c) in CORNERS.iter().enumerate() {
            let (fx, fy, fz) = (factor(c.x, p.x), factor(c.y, p.y), factor(c.z, p.z));
            dndx[i] = slope(c.x) * fy * fz;
            dndy[i] = fx * slope(c.y) * fz;
            dndz[i] = fx * fy * slope(c.z);
        }
    }

    fn quadrature_points(&self) -> &'static [Vec3] {
        &MIDPOINT_GRID
    }
}
