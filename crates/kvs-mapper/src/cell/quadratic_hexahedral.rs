//! Twenty-node serendipity hexahedron.

use glam::Vec3;
use kvs_core::CellType;

use super::hexahedral::CORNERS;
use super::{CellShape, MIDPOINT_GRID};

pub(super) const NODES: [Vec3; 20] = [
    CORNERS[0],
    CORNERS[1],
    CORNERS[2],
    CORNERS[3],
    CORNERS[4],
    CORNERS[5],
    CORNERS[6],
    CORNERS[7],
    Vec3::new(0.5, 0.0, 1.0),
    Vec3::new(1.0, 0.5, 1.0),
    Vec3::new(0.5, 1.0, 1.0),
    Vec3::new(0.0, 0.5, 1.0),
    Vec3::new(0.5, 0.0, 0.0),
    Vec3::new(1.0, 0.5, 0.0),
    Vec3::new(0.5, 1.0, 0.0),
    Vec3::new(0.0, 0.5, 0.0),
    Vec3::new(0.0, 0.0, 0.5),
    Vec3::new(1.0, 0.0, 0.5),
    Vec3::new(1.0, 1.0, 0.5),
    Vec3::new(0.0, 1.0, 0.5),
];

/// Quadratic hexahedron: eight corners plus twelve mid-edge nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadraticHexahedral;

impl CellShape for QuadraticHexahedral {
    fn cell_type(&self) -> CellType {
        CellType::QuadraticHexahedra
    }

    fn interpolation_functions(&self, p: Vec3, n: &mut [f32]) {
        let (x, y, z) = (p.x, p.y, p.z);
        let (xi, yi, zi) = (1.0 - x, 1.0 - y, 1.0 - z);

        n[0] = xi * yi * z * (-1.0 - 2.0 * x - 2.0 * y + 2.0 * z);
        n[1] = x * yi * z * (-3.0 + 2.0 * x - 2.0 * y + 2.0 * z);
        n[2] = x * y * z * (-5.0 + 2.0 * x + 2.0 * y + 2.0 * z);
        n[3] = xi * y * z * (-3.0 - 2.0 * x + 2.0 * y + 2.0 * z);
        n[4] = xi * yi * zi * (1.0 - 2.0 * x - 2.0 * y - 2.0 * z);
        n[5] = x * yi * zi * (-1.0 + 2.0 * x - 2.0 * y - 2.0 * z);
        n[6] = x * y * zi * (-3.0 + 2.0 * x + 2.0 * y - 2.0 * z);
        n[7] = xi * y * zi * (-1.0 - 2.0 * x + 2.0 * y - 2.0 * z);

        n[8] = 4.0 * z * x * xi * yi;
        n[9] = 4.0 * x * y * z * yi;
        n[10] = 4.0 * x * y * z * xi;
        n[11] = 4.0 * xi * y * z * yi;
        n[12] = 4.0 * x * xi * yi * zi;
        n[13] = 4.0 * x * y * yi * zi;
        n[14] = 4.0 * x * y * xi * zi;
        n[15] = 4.0 * xi * y * yi * zi;
        n[16] = 4.0 * xi * yi * z * zi;
        n[17] = 4.0 * yi * z * x * zi;
        n[18] = 4.0 * x * y * z * zi;
        n[19] = 4.0 * xi * y * z * zi;
    }

    fn differential_functions(&self, p: Vec3, dndx: &mut [f32], dndy: &mut [f32], dndz: &mut [f32]) {
        let (x, y, z) = (p.x, p.y, p.z);
        let (xi, yi, zi) = (1.0 - x, 1.0 - y, 1.0 - z);

        // corner factors shared by the three partials
        let f0 = 2.0 * z - 2.0 * y - 2.0 * x - 1.0;
        let f1 = 2.0 * z - 2.0 * y + 2.0 * x - 3.0;
        let f2 = 2.0 * z + 2.0 * y + 2.0 * x - 5.0;
        let f3 = 2.0 * z + 2.0 * y - 2.0 * x - 3.0;
        let f4 = -2.0 * z - 2.0 * y - 2.0 * x + 1.0;
        let f5 = -2.0 * z - 2.0 * y + 2.0 * x - 1.0;
        let f6 = -2.0 * z + 2.0 * y + 2.0 * x - 3.0;
        let f7 = -2.0 * z + 2.0 * y - 2.0 * x - 1.0;

        dndx[0] = -yi * z * f0 - 2.0 * xi * yi * z;
        dndx[1] = yi * z * f1 + 2.0 * x * yi * z;
        dndx[2] = y * z * f2 + 2.0 * x * y * z;
        dndx[3] = -y * z * f3 - 2.0 * xi * y * z;
        dndx[4] = -yi * f4 * zi - 2.0 * xi * yi * zi;
        dndx[5] = yi * f5 * zi + 2.0 * x * yi * zi;
        dndx[6] = y * f6 * zi + 2.0 * x * y * zi;
        dndx[7] = -y * f7 * zi - 2.0 * xi * y * zi;
        dndx[8] = 4.0 * xi * yi * z - 4.0 * x * yi * z;
        dndx[9] = 4.0 * yi * y * z;
        dndx[10] = 4.0 * xi * y * z - 4.0 * x * y * z;
        dndx[11] = -4.0 * yi * y * z;
        dndx[12] = 4.0 * xi * yi * zi - 4.0 * x * yi * zi;
        dndx[13] = 4.0 * yi * y * zi;
        dndx[14] = 4.0 * xi * y * zi - 4.0 * x * y * zi;
        dndx[15] = -4.0 * yi * y * zi;
        dndx[16] = -4.0 * yi * zi * z;
        dndx[17] = 4.0 * yi * zi * z;
        dndx[18] = 4.0 * y * zi * z;
        dndx[19] = -4.0 * y * zi * z;

        dndy[0] = -xi * z * f0 - 2.0 * xi * yi * z;
        dndy[1] = -x * z * f1 - 2.0 * x * yi * z;
        dndy[2] = x * z * f2 + 2.0 * x * y * z;
        dndy[3] = xi * z * f3 + 2.0 * xi * y * z;
        dndy[4] = -xi * f4 * zi - 2.0 * xi * yi * zi;
        dndy[5] = -x * f5 * zi - 2.0 * x * yi * zi;
        dndy[6] = x * f6 * zi + 2.0 * x * y * zi;
        dndy[7] = xi * f7 * zi + 2.0 * xi * y * zi;
        dndy[8] = -4.0 * xi * x * z;
        dndy[9] = 4.0 * x * yi * z - 4.0 * x * y * z;
        dndy[10] = 4.0 * xi * x * z;
        dndy[11] = 4.0 * xi * yi * z - 4.0 * xi * y * z;
        dndy[12] = -4.0 * xi * x * zi;
        dndy[13] = 4.0 * x * yi * zi - 4.0 * x * y * zi;
        dndy[14] = 4.0 * xi * x * zi;
        dndy[15] = 4.0 * xi * yi * zi - 4.0 * xi * y * zi;
        dndy[16] = -4.0 * xi * zi * z;
        dndy[17] = -4.0 * x * zi * z;
        dndy[18] = 4.0 * x * zi * z;
        dndy[19] = 4.0 * xi * zi * z;

        dndz[0] = xi * yi * f0 + 2.0 * xi * yi * z;
        dndz[1] = x * yi * f1 + 2.0 * x * yi * z;
        dndz[2] = x * y * f2 + 2.0 * x * y * z;
        dndz[3] = xi * y * f3 + 2.0 * xi * y * z;
        dndz[4] = -2.0 * xi * yi * zi - xi * yi * f4;
        dndz[5] = -2.0 * x * yi * zi - x * yi * f5;
        dndz[6] = -2.0 * x * y * zi - x * y * f6;
        dndz[7] = -2.0 * xi * y * zi - xi * y * f7;
        dndz[8] = 4.0 * xi * x * yi;
        dndz[9] = 4.0 * x * yi * y;
        dndz[10] = 4.0 * xi * x * y;
        dndz[11] = 4.0 * xi * yi * y;
        dndz[12] = -4.0 * xi * x * yi;
        dndz[13] = -4.0 * x * yi * y;
        dndz[14] = -4.0 * xi * x * y;
        dndz[15] = -4.0 * xi * yi * y;
        dndz[16] = 4.0 * xi * yi * zi - 4.0 * xi * yi * z;
        dndz[17] = 4.0 * x * yi * zi - 4.0 * x * yi * z;
        dndz[18] = 4.0 * x * y * zi - 4.0 * x * y * z;
        dndz[19] = 4.0 * xi * y * zi - 4.0 * xi * y * z;
    }

    fn quadrature_points(&self) -> &'static [Vec3] {
        &MIDPOINT_GRID
    }
}
