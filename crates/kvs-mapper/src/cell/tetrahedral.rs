//! Linear tetrahedron.

use glam::Vec3;
use kvs_core::CellType;

use super::{CellShape, LOCAL_EPSILON};

static CENTROID: [Vec3; 1] = [Vec3::new(0.25, 0.25, 0.25)];

/// Four-node tetrahedron with barycentric weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tetrahedral;

impl CellShape for Tetrahedral {
    fn cell_type(&self) -> CellType {
        CellType::Tetrahedra
    }

    fn interpolation_functions(&self, p: Vec3, n: &mut [f32]) {
        n[0] = 1.0 - p.x - p.y - p.z;
        n[1] = p.x;
        n[2] = p.y;
        n[3] = p.z;
    }

    fn differential_functions(&self, _p: Vec3, dndx: &mut [f32], dndy: &mut [f32], dndz: &mut [f32]) {
        dndx[..4].copy_from_slice(&[-1.0, 1.0, 0.0, 0.0]);
        dndy[..4].copy_from_slice(&[-1.0, 0.0, 1.0, 0.0]);
        dndz[..4].copy_from_slice(&[-1.0, 0.0, 0.0, 1.0]);
    }

    fn fold_random(&self, s: f32, t: f32, u: f32) -> Vec3 {
        fold_into_tetrahedron(s, t, u)
    }

    fn quadrature_points(&self) -> &'static [Vec3] {
        &CENTROID
    }

    fn reference_volume(&self) -> f32 {
        1.0 / 6.0
    }

    fn local_center(&self) -> Vec3 {
        CENTROID[0]
    }

    fn contains_local_point(&self, p: Vec3) -> bool {
        in_unit_tetrahedron(p)
    }
}

/// Folds a point of the unit cube into the unit tetrahedron `x + y + z <= 1`.
///
/// The cube splits into the tetrahedron, three corner tetrahedra and a
/// central piece; each outer piece is mapped back by an affine reflection.
pub(super) fn fold_into_tetrahedron(s: f32, t: f32, u: f32) -> Vec3 {
    if s + t + u <= 1.0 {
        Vec3::new(s, t, u)
    } else if s - t + u >= 1.0 {
        Vec3::new(1.0 - u, 1.0 - s, t)
    } else if s + t - u >= 1.0 {
        Vec3::new(1.0 - s, 1.0 - t, u)
    } else if -s + t + u >= 1.0 {
        Vec3::new(1.0 - u, s, 1.0 - t)
    } else {
        Vec3::new(
            0.5 * (s - t - u + 1.0),
            0.5 * (-s + t - u + 1.0),
            0.5 * (-s - t + u + 1.0),
        )
    }
}

pub(super) fn in_unit_tetrahedron(p: Vec3) -> bool {
    p.cmpge(Vec3::splat(-LOCAL_EPSILON)).all() && p.x + p.y + p.z <= 1.0 + LOCAL_EPSILON
}
