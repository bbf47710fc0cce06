//! Vector field lookup at arbitrary positions.

use glam::Vec3;
use kvs_core::{Grid, KvsError, Result, StructuredVolume, UnstructuredVolume, Volume};

use crate::cell::{CellEvaluator, CellShape, Hexahedral, HEXAHEDRON_CORNERS};

/// Relative slack on the volume boundary.
const BOUNDARY_EPSILON: f32 = 1.0e-5;

/// Interpolates a 3-component field of one volume.
///
/// Structured grids are searched axis by axis and evaluated with the
/// trilinear hexahedron basis; unstructured volumes locate the containing
/// cell and evaluate its own basis.
pub(crate) enum VectorSampler<'a> {
    Structured {
        volume: &'a StructuredVolume,
        axes: [Vec<f32>; 3],
    },
    Unstructured {
        evaluator: Box<CellEvaluator<'a>>,
        boxes: Vec<(Vec3, Vec3)>,
    },
}

impl<'a> VectorSampler<'a> {
    pub(crate) fn new(volume: &'a Volume) -> Result<Self> {
        match volume {
            Volume::Structured(v) => Self::structured(v),
            Volume::Unstructured(v) => Self::unstructured(v),
        }
    }

    fn structured(volume: &'a StructuredVolume) -> Result<Self> {
        let res = volume.resolution();
        let axes = match volume.grid() {
            Grid::Uniform { .. } => [
                (0..res.x).map(|i| volume.node_coord(i, 0, 0).x).collect(),
                (0..res.y).map(|j| volume.node_coord(0, j, 0).y).collect(),
                (0..res.z).map(|k| volume.node_coord(0, 0, k).z).collect(),
            ],
            Grid::Rectilinear { axes } => axes.clone(),
            Grid::Curvilinear { .. } => {
                log::error!("streamlines are not traced through curvilinear grids");
                return Err(KvsError::UnsupportedGridType(volume.grid_type()));
            }
        };
        Ok(Self::Structured { volume, axes })
    }

    fn unstructured(volume: &'a UnstructuredVolume) -> Result<Self> {
        if volume.ncells() == 0 {
            return Err(KvsError::EmptyVolume);
        }
        let coords = volume.coords();
        let boxes = (0..volume.ncells())
            .map(|cell| {
                let (lo, hi) = volume.cell_connections(cell).iter().fold(
                    (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
                    |(lo, hi), &n| (lo.min(coords[n as usize]), hi.max(coords[n as usize])),
                );
                let slack = (hi - lo) * BOUNDARY_EPSILON;
                (lo - slack, hi + slack)
            })
            .collect();
        Ok(Self::Unstructured {
            evaluator: Box::new(CellEvaluator::new(volume)),
            boxes,
        })
    }

    /// Returns true if `point` lies inside the volume.
    pub(crate) fn contains(&mut self, point: Vec3) -> bool {
        match self {
            Self::Structured { axes, .. } => axes.iter().enumerate().all(|(a, axis)| locate(axis, point[a]).is_some()),
            Self::Unstructured { evaluator, boxes } => find_cell(evaluator, boxes, point),
        }
    }

    /// Field value at `point`, or `None` outside the volume.
    pub(crate) fn sample(&mut self, point: Vec3) -> Option<Vec3> {
        match self {
            Self::Structured { volume, axes } => {
                let (i, s) = locate(&axes[0], point.x)?;
                let (j, t) = locate(&axes[1], point.y)?;
                let (k, u) = locate(&axes[2], point.z)?;
                let mut n = [0.0_f32; 8];
                Hexahedral.interpolation_functions(Vec3::new(s, t, u), &mut n);
                let field = volume.field();
                let value = HEXAHEDRON_CORNERS.iter().zip(n).fold(Vec3::ZERO, |acc, (c, w)| {
                    let node = volume.node_index(
                        i + u32::from(c.x > 0.5),
                        j + u32::from(c.y > 0.5),
                        k + u32::from(c.z > 0.5),
                    );
                    acc + w * field.vector(node)
                });
                Some(value)
            }
            Self::Unstructured { evaluator, boxes } => {
                find_cell(evaluator, boxes, point).then(|| evaluator.vector())
            }
        }
    }
}

/// Cell index along one axis and the local coordinate inside that cell.
#[allow(clippy::cast_possible_truncation)]
fn locate(axis: &[f32], x: f32) -> Option<(u32, f32)> {
    let (lo, hi) = (axis[0], axis[axis.len() - 1]);
    let slack = (hi - lo).abs() * BOUNDARY_EPSILON;
    if x < lo - slack || x > hi + slack {
        return None;
    }
    let i = axis
        .partition_point(|&a| a <= x)
        .saturating_sub(1)
        .min(axis.len() - 2);
    let width = axis[i + 1] - axis[i];
    let local = if width > 0.0 { (x - axis[i]) / width } else { 0.0 };
    Some((i as u32, local.clamp(0.0, 1.0)))
}

/// Binds the cell containing `point`, trying the bound cell first.
fn find_cell(evaluator: &mut CellEvaluator<'_>, boxes: &[(Vec3, Vec3)], point: Vec3) -> bool {
    let inside_box = |cell: usize| {
        let (lo, hi) = boxes[cell];
        point.cmpge(lo).all() && point.cmple(hi).all()
    };

    let current = evaluator.cell();
    if inside_box(current) {
        evaluator.set_global_point(point);
        if evaluator.contains_local_point() {
            return true;
        }
    }
    for cell in (0..boxes.len()).filter(|&c| c != current && inside_box(c)) {
        evaluator.bind_cell(cell);
        evaluator.set_global_point(point);
        if evaluator.contains_local_point() {
            return true;
        }
    }
    false
}
