//! Cell interpolation for unstructured volumes.
//!
//! # Overview
//!
//! Every cell topology maps a local (parametric) coordinate inside its
//! canonical domain to one weight per node. A [`CellShape`] provides those
//! weights, their partial derivatives, the random-sampling fold and the
//! volume quadrature for one topology. A [`CellEvaluator`] binds a shape to
//! the nodes of one cell of a volume and evaluates positions, scalars,
//! vectors, gradients and Jacobians at a local point.
//!
//! # Local node layouts
//!
//! - Tetrahedron: 0 (0,0,0), 1 (1,0,0), 2 (0,1,0), 3 (0,0,1).
//! - Hexahedron: 0..3 on the top face z = 1, 4..7 on the bottom face z = 0,
//!   each face ordered (0,0), (1,0), (1,1), (0,1) in x, y.
//! - Prism: 0..2 on the top triangle z = 1, 3..5 on the bottom triangle z = 0,
//!   each ordered (0,0), (1,0), (0,1).
//! - Pyramid: 0 is the apex at z = 1; 1..4 is the base square at z = 0.
//! - Quadratic tetrahedron: corners 0 (0,0,0), 1 (1,0,0), 2 (0,0,1), 3 (0,1,0)
//!   followed by the mid-edge nodes 4 (0-1), 5 (0-2), 6 (0-3), 7 (1-2), 8 (2-3), 9 (1-3).
//! - Quadratic hexahedron: the 8 hexahedron corners followed by 12 mid-edge nodes,
//!   8..11 on the top face, 12..15 on the bottom face, 16..19 on the vertical edges.

mod hexahedral;
mod prismatic;
mod pyramidal;
mod quadratic_hexahedral;
mod quadratic_tetrahedral;
mod tetrahedral;

pub use hexahedral::Hexahedral;
pub(crate) use hexahedral::CORNERS as HEXAHEDRON_CORNERS;
pub use prismatic::Prismatic;
pub use pyramidal::Pyramidal;
pub use quadratic_hexahedral::QuadraticHexahedral;
pub use quadratic_tetrahedral::QuadraticTetrahedral;
pub use tetrahedral::Tetrahedral;

use glam::{Mat3, Vec3};
use kvs_core::{CellType, UnstructuredVolume};
use rand::Rng;

/// Tolerance used when testing whether a local point lies inside a cell.
pub const LOCAL_EPSILON: f32 = 1.0e-5;

const MAX_NEWTON_ITERATIONS: usize = 100;
const NEWTON_TOLERANCE: f32 = 1.0e-6;

/// Interpolation basis of one cell topology.
pub trait CellShape: Send + Sync {
    /// The unstructured cell type this shape interpolates.
    fn cell_type(&self) -> CellType;

    /// Number of nodes (and of interpolation weights).
    fn nnodes(&self) -> usize {
        self.cell_type().nnodes()
    }

    /// Writes one interpolation weight per node. The weights sum to one.
    fn interpolation_functions(&self, local: Vec3, n: &mut [f32]);

    /// Writes the partial derivatives of every weight along x, y and z.
    fn differential_functions(&self, local: Vec3, dndx: &mut [f32], dndy: &mut [f32], dndz: &mut [f32]);

    /// Folds three uniform numbers in `[0, 1)` into the canonical domain.
    ///
    /// The result is uniform over the parametric domain, not over the
    /// physical (possibly warped) cell.
    fn fold_random(&self, s: f32, t: f32, u: f32) -> Vec3 {
        Vec3::new(s, t, u)
    }

    /// Quadrature points of the volume estimate.
    fn quadrature_points(&self) -> &'static [Vec3];

    /// Parametric volume of the canonical domain; the estimate is this
    /// times the mean `|det J|` over the quadrature points.
    fn reference_volume(&self) -> f32 {
        1.0
    }

    /// A point inside the domain, used to start the global-to-local search.
    fn local_center(&self) -> Vec3 {
        Vec3::splat(0.5)
    }

    /// Returns true if `local` lies in the canonical domain (with [`LOCAL_EPSILON`] slack).
    fn contains_local_point(&self, local: Vec3) -> bool {
        local.cmpge(Vec3::splat(-LOCAL_EPSILON)).all() && local.cmple(Vec3::splat(1.0 + LOCAL_EPSILON)).all()
    }
}

/// Returns the interpolation basis for `cell_type`.
#[must_use]
pub fn shape_for(cell_type: CellType) -> &'static dyn CellShape {
    match cell_type {
        CellType::Tetrahedra => &Tetrahedral,
        CellType::Hexahedra => &Hexahedral,
        CellType::QuadraticTetrahedra => &QuadraticTetrahedral,
        CellType::QuadraticHexahedra => &QuadraticHexahedral,
        CellType::Pyramid => &Pyramidal,
        CellType::Prism => &Prismatic,
    }
}

const A: f32 = 1.0 / 6.0;
const B: f32 = 0.5;
const C: f32 = 5.0 / 6.0;

/// Midpoints of a 3 × 3 × 3 subdivision of the unit cube.
#[rustfmt::skip]
pub(crate) static MIDPOINT_GRID: [Vec3; 27] = [
    Vec3::new(A, A, A), Vec3::new(B, A, A), Vec3::new(C, A, A),
    Vec3::new(A, B, A), Vec3::new(B, B, A), Vec3::new(C, B, A),
    Vec3::new(A, C, A), Vec3::new(B, C, A), Vec3::new(C, C, A),
    Vec3::new(A, A, B), Vec3::new(B, A, B), Vec3::new(C, A, B),
    Vec3::new(A, B, B), Vec3::new(B, B, B), Vec3::new(C, B, B),
    Vec3::new(A, C, B), Vec3::new(B, C, B), Vec3::new(C, C, B),
    Vec3::new(A, A, C), Vec3::new(B, A, C), Vec3::new(C, A, C),
    Vec3::new(A, B, C), Vec3::new(B, B, C), Vec3::new(C, B, C),
    Vec3::new(A, C, C), Vec3::new(B, C, C), Vec3::new(C, C, C),
];

/// Evaluates one cell of an unstructured volume.
///
/// The evaluator owns its coefficient buffers; create one per thread.
pub struct CellEvaluator<'a> {
    volume: &'a UnstructuredVolume,
    shape: &'static dyn CellShape,
    cell: usize,
    vertices: Vec<Vec3>,
    values: Vec<f32>,
    n: Vec<f32>,
    dndx: Vec<f32>,
    dndy: Vec<f32>,
    dndz: Vec<f32>,
    local_point: Vec3,
}

impl<'a> CellEvaluator<'a> {
    /// Creates an evaluator bound to cell 0 of `volume`.
    ///
    /// # Panics
    /// Panics if the volume has no cells.
    #[must_use]
    pub fn new(volume: &'a UnstructuredVolume) -> Self {
        let shape = shape_for(volume.cell_type());
        let nnodes = shape.nnodes();
        let veclen = volume.field().veclen();
        let mut evaluator = Self {
            volume,
            shape,
            cell: 0,
            vertices: vec![Vec3::ZERO; nnodes],
            values: vec![0.0; nnodes * veclen],
            n: vec![0.0; nnodes],
            dndx: vec![0.0; nnodes],
            dndy: vec![0.0; nnodes],
            dndz: vec![0.0; nnodes],
            local_point: Vec3::ZERO,
        };
        evaluator.bind_cell(0);
        evaluator.set_local_point(shape.local_center());
        evaluator
    }

    #[must_use]
    pub fn shape(&self) -> &'static dyn CellShape {
        self.shape
    }

    #[must_use]
    pub fn cell(&self) -> usize {
        self.cell
    }

    /// Loads the node positions and values of cell `index`.
    ///
    /// # Panics
    /// Panics if `index >= volume.ncells()`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn bind_cell(&mut self, index: usize) {
        let volume = self.volume;
        let field = volume.field();
        let veclen = field.veclen();
        let coords = volume.coords();
        for (i, &node) in volume.cell_connections(index).iter().enumerate() {
            let node = node as usize;
            self.vertices[i] = coords[node];
            for c in 0..veclen {
                self.values[i * veclen + c] = field.values().get_f64(node * veclen + c) as f32;
            }
        }
        self.cell = index;
    }

    /// Moves the evaluation point and refreshes all coefficients.
    pub fn set_local_point(&mut self, local: Vec3) {
        self.local_point = local;
        self.shape.interpolation_functions(local, &mut self.n);
        self.shape
            .differential_functions(local, &mut self.dndx, &mut self.dndy, &mut self.dndz);
    }

    /// Moves the evaluation point to the local coordinate of `global`.
    pub fn set_global_point(&mut self, global: Vec3) -> Vec3 {
        self.transform_global_to_local(global)
    }

    #[must_use]
    pub fn local_point(&self) -> Vec3 {
        self.local_point
    }

    /// Global position of the current local point.
    #[must_use]
    pub fn global_point(&self) -> Vec3 {
        self.n
            .iter()
            .zip(&self.vertices)
            .fold(Vec3::ZERO, |acc, (&w, &v)| acc + w * v)
    }

    /// Interpolation weights at `local`.
    pub fn interpolation_functions(&mut self, local: Vec3) -> &[f32] {
        self.set_local_point(local);
        &self.n
    }

    /// Weight derivatives `(dN/dx, dN/dy, dN/dz)` at `local`.
    pub fn differential_functions(&mut self, local: Vec3) -> (&[f32], &[f32], &[f32]) {
        self.set_local_point(local);
        (&self.dndx, &self.dndy, &self.dndz)
    }

    /// Global position of `local`.
    pub fn transform_local_to_global(&mut self, local: Vec3) -> Vec3 {
        self.set_local_point(local);
        self.global_point()
    }

    /// Inverts the local-to-global map with Newton iterations.
    ///
    /// Points outside the cell converge to a local coordinate outside the
    /// canonical domain; check it with [`contains_local_point`](Self::contains_local_point).
    pub fn transform_global_to_local(&mut self, global: Vec3) -> Vec3 {
        let mut local = self.shape.local_center();
        for _ in 0..MAX_NEWTON_ITERATIONS {
            self.set_local_point(local);
            let residual = self.global_point() - global;
            let jt = self.transposed_jacobi_matrix();
            if jt.determinant().abs() < f32::MIN_POSITIVE {
                log::debug!("singular Jacobian in cell {}", self.cell);
                break;
            }
            let delta = jt.inverse() * residual;
            local -= delta;
            if delta.length() < NEWTON_TOLERANCE {
                break;
            }
        }
        self.set_local_point(local);
        local
    }

    /// Returns true if the current local point lies inside the cell.
    #[must_use]
    pub fn contains_local_point(&self) -> bool {
        self.shape.contains_local_point(self.local_point)
    }

    /// Jacobian at the current local point; row `i` is the derivative of
    /// the global position along local axis `i`.
    #[must_use]
    pub fn jacobi_matrix(&self) -> Mat3 {
        self.transposed_jacobi_matrix().transpose()
    }

    fn transposed_jacobi_matrix(&self) -> Mat3 {
        let axis = |d: &[f32]| d.iter().zip(&self.vertices).fold(Vec3::ZERO, |acc, (&w, &v)| acc + w * v);
        Mat3::from_cols(axis(&self.dndx), axis(&self.dndy), axis(&self.dndz))
    }

    /// First-component value at the current local point.
    #[must_use]
    pub fn scalar(&self) -> f32 {
        let veclen = self.volume.field().veclen();
        self.n
            .iter()
            .enumerate()
            .map(|(i, &w)| w * self.values[i * veclen])
            .sum()
    }

    /// Vector value (first three components) at the current local point.
    #[must_use]
    pub fn vector(&self) -> Vec3 {
        let veclen = self.volume.field().veclen();
        let mut v = Vec3::ZERO;
        for (i, &w) in self.n.iter().enumerate() {
            for c in 0..veclen.min(3) {
                v[c] += w * self.values[i * veclen + c];
            }
        }
        v
    }

    /// Mean of the first-component node values.
    #[must_use]
    pub fn averaged_scalar(&self) -> f32 {
        let veclen = self.volume.field().veclen();
        let nnodes = self.vertices.len();
        (0..nnodes).map(|i| self.values[i * veclen]).sum::<f32>() / nnodes as f32
    }

    /// Scalar gradient in global coordinates at the current local point.
    ///
    /// Returns zero where the Jacobian is singular.
    #[must_use]
    pub fn gradient(&self) -> Vec3 {
        let veclen = self.volume.field().veclen();
        let local = |d: &[f32]| -> f32 {
            d.iter()
                .enumerate()
                .map(|(i, &w)| w * self.values[i * veclen])
                .sum()
        };
        let g = Vec3::new(local(&self.dndx), local(&self.dndy), local(&self.dndz));
        let j = self.jacobi_matrix();
        if j.determinant().abs() < f32::MIN_POSITIVE {
            return Vec3::ZERO;
        }
        j.inverse() * g
    }

    /// Moves to a random local point and returns its global position.
    pub fn random_sampling<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec3 {
        let (s, t, u) = (rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>());
        let local = self.shape.fold_random(s, t, u);
        self.transform_local_to_global(local)
    }

    /// Volume estimate of the bound cell from the shape's quadrature.
    ///
    /// Restores the current local point afterwards.
    pub fn volume(&mut self) -> f32 {
        let saved = self.local_point;
        let points = self.shape.quadrature_points();
        let mut sum = 0.0;
        for &p in points {
            self.set_local_point(p);
            sum += self.transposed_jacobi_matrix().determinant().abs();
        }
        self.set_local_point(saved);
        self.shape.reference_volume() * sum / points.len() as f32
    }
}
