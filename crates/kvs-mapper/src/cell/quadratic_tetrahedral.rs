//! Ten-node quadratic tetrahedron.

use glam::Vec3;
use kvs_core::CellType;

use super::tetrahedral::{fold_into_tetrahedron, in_unit_tetrahedron};
use super::CellShape;

pub(super) const NODES: [Vec3; 10] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(0.0, 1.0, 0.0),
    Vec3::new(0.5, 0.0, 0.0),
    Vec3::new(0.0, 0.0, 0.5),
    Vec3::new(0.0, 0.5, 0.0),
    Vec3::new(0.5, 0.0, 0.5),
    Vec3::new(0.0, 0.5, 0.5),
    Vec3::new(0.5, 0.5, 0.0),
];

static QUADRATURE: [Vec3; 8] = [
    Vec3::new(0.125, 0.125, 0.125),
    Vec3::new(0.625, 0.125, 0.125),
    Vec3::new(0.125, 0.625, 0.125),
    Vec3::new(0.125, 0.125, 0.625),
    Vec3::new(0.125, 0.25, 0.25),
    Vec3::new(0.25, 0.125, 0.375),
    Vec3::new(0.375, 0.25, 0.25),
    Vec3::new(0.25, 0.375, 0.125),
];

/// Quadratic tetrahedron: four corners plus six mid-edge nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadraticTetrahedral;

impl CellShape for QuadraticTetrahedral {
    fn cell_type(&self) -> CellType {
        CellType::QuadraticTetrahedra
    }

    fn interpolation_functions(&self, p: Vec3, n: &mut [f32]) {
        let (x, y, z) = (p.x, p.y, p.z);
        let w = 1.0 - x - y - z;
        n[0] = 2.0 * w * (w - 0.5);
        n[1] = 2.0 * x * (x - 0.5);
        n[2] = 2.0 * z * (z - 0.5);
        n[3] = 2.0 * y * (y - 0.5);
        n[4] = 4.0 * x * w;
        n[5] = 4.0 * z * w;
        n[6] = 4.0 * y * w;
        n[7] = 4.0 * z * x;
        n[8] = 4.0 * y * z;
        n[9] = 4.0 * x * y;
    }

    #[rustfmt::skip]
    fn differential_functions(&self, p: Vec3, dndx: &mut [f32], dndy: &mut [f32], dndz: &mut [f32]) {
        let (x, y, z) = (p.x, p.y, p.z);
        let c = 4.0 * (x + y + z) - 3.0;
        dndx[..10].copy_from_slice(&[
            c, 4.0 * x - 1.0, 0.0, 0.0, 4.0 * (1.0 - 2.0 * x - y - z),
            -4.0 * z, -4.0 * y, 4.0 * z, 0.0, 4.0 * y,
        ]);
        dndy[..10].copy_from_slice(&[
            c, 0.0, 0.0, 4.0 * y - 1.0, -4.0 * x,
            -4.0 * z, 4.0 * (1.0 - x - 2.0 * y - z), 0.0, 4.0 * z, 4.0 * x,
        ]);
        dndz[..10].copy_from_slice(&[
            c, 0.0, 4.0 * z - 1.0, 0.0, -4.0 * x,
            4.0 * (1.0 - x - y - 2.0 * z), -4.0 * y, 4.0 * x, 4.0 * y, 0.0,
        ]);
    }

    fn fold_random(&self, s: f32, t: f32, u: f32) -> Vec3 {
        fold_into_tetrahedron(s, t, u)
    }

    fn quadrature_points(&self) -> &'static [Vec3] {
        &QUADRATURE
    }

    fn reference_volume(&self) -> f32 {
        1.0 / 6.0
    }

    fn local_center(&self) -> Vec3 {
        Vec3::splat(0.25)
    }

    fn contains_local_point(&self, p: Vec3) -> bool {
        in_unit_tetrahedron(p)
    }
}
