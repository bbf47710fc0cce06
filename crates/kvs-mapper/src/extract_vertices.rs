//! Volume nodes as a colored point cloud.

use glam::Vec3;
use kvs_core::{Grid, KvsError, PointObject, Result, RgbColor, TransferFunction, Volume};

use crate::normalize::Normalizer;

/// Turns every node of a volume into a point colored by its value.
///
/// Vector fields are colored by magnitude.
#[derive(Debug, Clone, Default)]
pub struct ExtractVertices {
    tfunc: TransferFunction,
}

impl ExtractVertices {
    #[must_use]
    pub fn new(tfunc: TransferFunction) -> Self {
        Self { tfunc }
    }

    #[must_use]
    pub fn transfer_function(&self) -> &TransferFunction {
        &self.tfunc
    }

    pub fn exec(&self, volume: &Volume) -> Result<PointObject> {
        if volume.nnodes() == 0 {
            log::error!("cannot extract vertices from an empty volume");
            return Err(KvsError::EmptyVolume);
        }
        let mut points = PointObject::new();
        points.set_coords(Self::calculate_coords(volume));
        points.set_colors(self.calculate_colors(volume));
        points.set_sizes(vec![1.0]);
        let (min, max) = volume.bounds();
        points.set_min_max_coords(min, max);
        log::debug!("extracted {} vertices", points.nvertices());
        Ok(points)
    }

    /// Node positions in node order.
    ///
    /// Uniform grids are synthesized from the box and rectilinear grids from
    /// their axes, with x varying fastest. Curvilinear and unstructured
    /// volumes already store their positions.
    #[must_use]
    pub fn calculate_coords(volume: &Volume) -> Vec<Vec3> {
        match volume {
            Volume::Structured(v) => match v.grid() {
                Grid::Curvilinear { coords } => coords.clone(),
                Grid::Uniform { .. } | Grid::Rectilinear { .. } => {
                    let res = v.resolution();
                    let mut coords = Vec::with_capacity(v.nnodes());
                    for k in 0..res.z {
                        for j in 0..res.y {
                            for i in 0..res.x {
                                coords.push(v.node_coord(i, j, k));
                            }
                        }
                    }
                    coords
                }
            },
            Volume::Unstructured(v) => v.coords().to_vec(),
        }
    }

    /// One color per node: the color map entry at the node's normalized
    /// value (or vector magnitude).
    #[must_use]
    pub fn calculate_colors(&self, volume: &Volume) -> Vec<RgbColor> {
        let field = volume.field();
        let normalizer = Normalizer::new(&self.tfunc, field);
        let cmap = self.tfunc.color_map();
        (0..field.nsamples())
            .map(|node| cmap.get(normalizer.level(field.scalar(node))))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec3;
    use kvs_core::{CellType, StructuredVolume, UnstructuredVolume};

    #[test]
    fn test_uniform_coords_follow_the_box() {
        let vol: Volume = StructuredVolume::uniform(
            UVec3::new(3, 2, 2),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 4.0),
            1,
            vec![0.0_f32; 12],
        )
        .unwrap()
        .into();
        let coords = ExtractVertices::calculate_coords(&vol);
        assert_eq!(coords.len(), 12);
        assert_eq!(coords[0], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(coords[1], Vec3::new(1.5, 0.0, 0.0));
        assert_eq!(coords[3], Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(coords[11], Vec3::new(2.0, 1.0, 4.0));
    }

    #[test]
    fn test_rectilinear_coords() {
        let vol: Volume = StructuredVolume::rectilinear(
            [vec![0.0, 1.0, 5.0], vec![0.0, 2.0], vec![-1.0, 1.0]],
            1,
            vec![0_u8; 12],
        )
        .unwrap()
        .into();
        let coords = ExtractVertices::calculate_coords(&vol);
        assert_eq!(coords[2], Vec3::new(5.0, 0.0, -1.0));
        assert_eq!(coords[5], Vec3::new(5.0, 2.0, -1.0));
        assert_eq!(coords[6], Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_scalar_colors_span_the_map() {
        let vol: Volume = StructuredVolume::uniform_in_index_space(
            UVec3::new(2, 2, 2),
            1,
            vec![0.0_f32, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
        )
        .unwrap()
        .into();
        let mapper = ExtractVertices::default();
        let points = mapper.exec(&vol).unwrap();
        let cmap = mapper.transfer_function().color_map();
        assert_eq!(points.nvertices(), 8);
        assert_eq!(points.colors()[0], cmap.get(0));
        assert_eq!(points.colors()[7], cmap.get(255));
        assert_eq!(points.min_max_coords(), Some((Vec3::ZERO, Vec3::ONE)));
    }

    #[test]
    fn test_unstructured_nodes_keep_their_positions() {
        let coords = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(0.2, 0.3, 1.0)];
        let vol: Volume = UnstructuredVolume::new(CellType::Tetrahedra, coords.clone(), vec![0, 1, 2, 3], 1, vec![1.0_f64; 4])
            .unwrap()
            .into();
        let points = ExtractVertices::default().exec(&vol).unwrap();
        assert_eq!(points.coords(), coords.as_slice());
        // constant field: every node takes the first entry
        let first = TransferFunction::default().color_map().get(0);
        assert!(points.colors().iter().all(|&c| c == first));
    }
}
