//! Pyramid, treated as a hexahedron whose top face collapses onto the apex.

use glam::Vec3;
use kvs_core::CellType;

use super::{CellShape, MIDPOINT_GRID};

/// Local node positions: apex, then the base square.
pub(super) const NODES: [Vec3; 5] = [
    Vec3::new(0.5, 0.5, 1.0),
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(0.0, 1.0, 0.0),
];

/// Five-node pyramid over the unit cube parameter domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pyramidal;

impl CellShape for Pyramidal {
    fn cell_type(&self) -> CellType {
        CellType::Pyramid
    }

    fn interpolation_functions(&self, p: Vec3, n: &mut [f32]) {
        let (x, y, z) = (p.x, p.y, p.z);
        let b = 1.0 - z;
        n[0] = z;
        n[1] = (1.0 - x) * (1.0 - y) * b;
        n[2] = x * (1.0 - y) * b;
        n[3] = x * y * b;
        n[4] = (1.0 - x) * y * b;
    }

    fn differential_functions(&self, p: Vec3, dndx: &mut [f32], dndy: &mut [f32], dndz: &mut [f32]) {
        let (x, y, z) = (p.x, p.y, p.z);
        let b = 1.0 - z;
        dndx[..5].copy_from_slice(&[0.0, -(1.0 - y) * b, (1.0 - y) * b, y * b, -y * b]);
        dndy[..5].copy_from_slice(&[0.0, -(1.0 - x) * b, -x * b, x * b, (1.0 - x) * b]);
        dndz[..5].copy_from_slice(&[1.0, -(1.0 - x) * (1.0 - y), -x * (1.0 - y), -x * y, -(1.0 - x) * y]);
    }

    fn quadrature_points(&self) -> &'static [Vec3] {
        &MIDPOINT_GRID
    }
}
