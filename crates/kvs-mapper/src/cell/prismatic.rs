//! Triangular prism.

use glam::Vec3;
use kvs_core::CellType;

use super::{CellShape, LOCAL_EPSILON};

/// Local node positions: top triangle (z = 1), then bottom triangle (z = 0).
pub(super) const NODES: [Vec3; 6] = [
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(1.0, 0.0, 1.0),
    Vec3::new(0.0, 1.0, 1.0),
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(0.0, 1.0, 0.0),
];

const P: f32 = 0.3;
const Q: f32 = 0.6;

/// Three interior points of the triangle on each of three layers.
static QUADRATURE: [Vec3; 9] = [
    Vec3::new(P, P, 0.2),
    Vec3::new(Q, P, 0.2),
    Vec3::new(P, Q, 0.2),
    Vec3::new(P, P, 0.5),
    Vec3::new(Q, P, 0.5),
    Vec3::new(P, Q, 0.5),
    Vec3::new(P, P, 0.8),
    Vec3::new(Q, P, 0.8),
    Vec3::new(P, Q, 0.8),
];

/// Six-node prism: linear over the triangle, linear along z.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prismatic;

impl CellShape for Prismatic {
    fn cell_type(&self) -> CellType {
        CellType::Prism
    }

    fn interpolation_functions(&self, p: Vec3, n: &mut [f32]) {
        let (x, y, z) = (p.x, p.y, p.z);
        let w = 1.0 - x - y;
        n[0] = w * z;
        n[1] = x * z;
        n[2] = y * z;
        n[3] = w * (1.0 - z);
        n[4] = x * (1.0 - z);
        n[5] = y * (1.0 - z);
    }

    fn differential_functions(&self, p: Vec3, dndx: &mut [f32], dndy: &mut [f32], dndz: &mut [f32]) {
        let (x, y, z) = (p.x, p.y, p.z);
        let w = 1.0 - x - y;
        dndx[..6].copy_from_slice(&[-z, z, 0.0, -(1.0 - z), 1.0 - z, 0.0]);
        dndy[..6].copy_from_slice(&[-z, 0.0, z, -(1.0 - z), 0.0, 1.0 - z]);
        dndz[..6].copy_from_slice(&[w, x, y, -w, -x, -y]);
    }

    fn fold_random(&self, s: f32, t: f32, u: f32) -> Vec3 {
        if s + t > 1.0 {
            Vec3::new(1.0 - t, 1.0 - s, u)
        } else {
            Vec3::new(s, t, u)
        }
    }

    fn quadrature_points(&self) -> &'static [Vec3] {
        &QUADRATURE
    }

    fn reference_volume(&self) -> f32 {
        0.5
    }

    fn local_center(&self) -> Vec3 {
        Vec3::new(1.0 / 3.0, 1.0 / 3.0, 0.5)
    }

    fn contains_local_point(&self, p: Vec3) -> bool {
        p.cmpge(Vec3::splat(-LOCAL_EPSILON)).all()
            && p.x + p.y <= 1.0 + LOCAL_EPSILON
            && p.z <= 1.0 + LOCAL_EPSILON
    }
}
