//! Isosurface extraction.
//!
//! Structured volumes go through marching cubes and unstructured volumes
//! through marching tetrahedra. Both produce an indexed [`SurfaceMesh`]
//! which [`Isosurface`] turns into a [`PolygonObject`] according to the
//! normal type and duplication options.

mod marching_cubes;
mod marching_tetrahedra;

use glam::Vec3;
use kvs_core::{
    ColorType, IsosurfaceOptions, KvsError, NormalType, PolygonObject, Result, RgbColor, TransferFunction,
    Volume,
};

use crate::normalize::Normalizer;

/// Indexed triangle mesh produced by the marching algorithms.
#[derive(Debug, Clone, Default)]
pub(crate) struct SurfaceMesh {
    pub vertices: Vec<Vec3>,
    /// Per-vertex normals, accumulated from the adjacent faces.
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    #[allow(clippy::cast_possible_truncation)]
    pub fn push_vertex(&mut self, position: Vec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.normals.push(Vec3::ZERO);
        index
    }

    /// Appends a triangle and adds its face normal to its three vertices.
    pub fn push_triangle(&mut self, tri: [u32; 3]) {
        let n = Self::face_normal(&self.vertices, tri);
        for i in tri {
            self.normals[i as usize] += n;
        }
        self.indices.extend(tri);
    }

    /// Unnormalized normal of `tri`, `(c - b) x (a - b)`.
    pub fn face_normal(vertices: &[Vec3], tri: [u32; 3]) -> Vec3 {
        let [a, b, c] = tri.map(|i| vertices[i as usize]);
        (c - b).cross(a - b)
    }

    pub fn normalize(&mut self) {
        for n in &mut self.normals {
            let len = n.length();
            if len > 1e-10 {
                *n /= len;
            }
        }
    }

    pub fn ntriangles(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    fn polygon_normals(&self) -> Vec<Vec3> {
        self.triangles()
            .map(|tri| Self::face_normal(&self.vertices, tri).normalize_or_zero())
            .collect()
    }
}

/// Edge parameter where the surface crosses between samples `va` and `vb`
/// (both relative to the isolevel).
///
/// A non-finite sample puts the vertex at the edge midpoint.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn crossing(va: f64, vb: f64) -> f32 {
    let t = va / (va - vb);
    if t.is_finite() {
        t.clamp(0.0, 1.0) as f32
    } else {
        0.5
    }
}

/// Extracts the surface where a scalar volume equals the isolevel.
///
/// The surface gets one color: the transfer function's color at the
/// isolevel.
#[derive(Debug, Clone)]
pub struct Isosurface {
    options: IsosurfaceOptions,
    tfunc: TransferFunction,
}

impl Default for Isosurface {
    fn default() -> Self {
        Self::new(IsosurfaceOptions::default(), TransferFunction::default())
    }
}

impl Isosurface {
    #[must_use]
    pub fn new(options: IsosurfaceOptions, tfunc: TransferFunction) -> Self {
        Self { options, tfunc }
    }

    /// Shorthand for an isosurface at `isolevel` with otherwise default options.
    #[must_use]
    pub fn with_isolevel(isolevel: f64, tfunc: TransferFunction) -> Self {
        let options = IsosurfaceOptions {
            isolevel,
            ..IsosurfaceOptions::default()
        };
        Self::new(options, tfunc)
    }

    #[must_use]
    pub fn options(&self) -> &IsosurfaceOptions {
        &self.options
    }

    pub fn set_isolevel(&mut self, isolevel: f64) {
        self.options.isolevel = isolevel;
    }

    #[must_use]
    pub fn transfer_function(&self) -> &TransferFunction {
        &self.tfunc
    }

    /// Runs the extraction.
    ///
    /// Returns [`KvsError::NotScalarField`] when the volume is not scalar.
    pub fn exec(&self, volume: &Volume) -> Result<PolygonObject> {
        let veclen = volume.veclen();
        if veclen != 1 {
            log::error!("isosurface needs a scalar volume, got veclen {veclen}");
            return Err(KvsError::NotScalarField(veclen));
        }

        let isolevel = self.options.isolevel;
        let mesh = match volume {
            Volume::Structured(v) => marching_cubes::extract(v, isolevel),
            Volume::Unstructured(v) => marching_tetrahedra::extract(v, isolevel),
        };
        log::debug!(
            "isosurface at {isolevel}: {} triangles, {} shared vertices",
            mesh.ntriangles(),
            mesh.vertices.len()
        );

        let mut polygon = self.build_polygon(&mesh);
        polygon.set_color(self.isolevel_color(volume));
        polygon.set_color_type(ColorType::PolygonColor);
        polygon.set_opacity(255);
        // the box of the input keeps multiple surfaces of one volume aligned
        let (min, max) = volume.bounds();
        polygon.set_min_max_coords(min, max);
        Ok(polygon)
    }

    fn isolevel_color(&self, volume: &Volume) -> RgbColor {
        let normalizer = Normalizer::new(&self.tfunc, volume.field());
        self.tfunc.color_map().at(normalizer.index(self.options.isolevel))
    }

    fn build_polygon(&self, mesh: &SurfaceMesh) -> PolygonObject {
        let mut polygon = PolygonObject::new();
        polygon.set_normal_type(self.options.normal_type);

        match self.options.normal_type {
            // shared vertices are required for smooth normals
            NormalType::VertexNormal => {
                polygon.set_coords(mesh.vertices.clone());
                polygon.set_normals(mesh.normals.clone());
                polygon.set_connections(mesh.indices.clone());
            }
            NormalType::PolygonNormal if self.options.duplication => {
                let coords = mesh.indices.iter().map(|&i| mesh.vertices[i as usize]).collect();
                polygon.set_coords(coords);
                polygon.set_normals(mesh.polygon_normals());
            }
            NormalType::PolygonNormal => {
                polygon.set_coords(mesh.vertices.clone());
                polygon.set_connections(mesh.indices.clone());
                polygon.set_normals(mesh.polygon_normals());
            }
        }
        polygon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec3;
    use kvs_core::{ColorMap, StructuredVolume, UnstructuredVolume};

    #[allow(clippy::cast_precision_loss)]
    fn sphere(n: u32) -> Volume {
        let c = (n - 1) as f32 / 2.0;
        let mut values = Vec::new();
        for k in 0..n {
            for j in 0..n {
                for i in 0..n {
                    values.push((Vec3::new(i as f32, j as f32, k as f32) - Vec3::splat(c)).length());
                }
            }
        }
        StructuredVolume::uniform_in_index_space(UVec3::splat(n), 1, values)
            .unwrap()
            .into()
    }

    #[test]
    fn test_vector_volume_is_rejected() {
        let vol: Volume = StructuredVolume::uniform_in_index_space(UVec3::splat(2), 3, vec![0.0_f32; 24])
            .unwrap()
            .into();
        let result = Isosurface::default().exec(&vol);
        assert!(matches!(result, Err(KvsError::NotScalarField(3))));
    }

    #[test]
    fn test_polygon_normal_with_duplication() {
        let mapper = Isosurface::with_isolevel(3.0, TransferFunction::default());
        let polygon = mapper.exec(&sphere(10)).unwrap();
        assert!(polygon.connections().is_empty());
        assert_eq!(polygon.nvertices() % 3, 0);
        assert_eq!(polygon.normals().len(), polygon.npolygons());
        assert_eq!(polygon.normal_type(), NormalType::PolygonNormal);
        assert_eq!(polygon.opacities(), &[255]);
        assert_eq!(polygon.colors().len(), 1);
    }

    #[test]
    fn test_vertex_normals_share_vertices() {
        let options = IsosurfaceOptions {
            isolevel: 3.0,
            normal_type: NormalType::VertexNormal,
            duplication: true,
        };
        let shared = Isosurface::new(options, TransferFunction::default())
            .exec(&sphere(10))
            .unwrap();
        let duplicated = Isosurface::with_isolevel(3.0, TransferFunction::default())
            .exec(&sphere(10))
            .unwrap();
        assert_eq!(shared.npolygons(), duplicated.npolygons());
        assert!(shared.nvertices() < duplicated.nvertices());
        assert_eq!(shared.normals().len(), shared.nvertices());
        assert_eq!(shared.connections().len(), shared.npolygons() * 3);
    }

    #[test]
    fn test_polygon_normal_without_duplication() {
        let options = IsosurfaceOptions {
            isolevel: 3.0,
            normal_type: NormalType::PolygonNormal,
            duplication: false,
        };
        let polygon = Isosurface::new(options, TransferFunction::default())
            .exec(&sphere(10))
            .unwrap();
        assert!(!polygon.connections().is_empty());
        assert_eq!(polygon.normals().len(), polygon.npolygons());
    }

    #[test]
    fn test_color_comes_from_the_transfer_function() {
        let mut cmap = ColorMap::new(256);
        cmap.add_point(0.0, RgbColor::new(0, 0, 0));
        cmap.add_point(255.0, RgbColor::new(0, 200, 0));
        cmap.create(256);
        let mut tfunc = TransferFunction::from_color_map(cmap);
        tfunc.set_range(0.0, 10.0);

        let mut iso = Isosurface::with_isolevel(10.0, tfunc);
        let polygon = iso.exec(&sphere(8)).unwrap();
        assert_eq!(polygon.colors()[0], RgbColor::new(0, 200, 0));

        iso.set_isolevel(0.0);
        let polygon = iso.exec(&sphere(8)).unwrap();
        assert_eq!(polygon.colors()[0], RgbColor::new(0, 0, 0));
    }

    #[test]
    fn test_bounds_follow_the_volume() {
        let polygon = Isosurface::with_isolevel(2.0, TransferFunction::default())
            .exec(&sphere(6))
            .unwrap();
        assert_eq!(polygon.min_max_coords(), Some((Vec3::ZERO, Vec3::splat(5.0))));
    }

    #[test]
    fn test_unstructured_volume() {
        let coords = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z, Vec3::ONE];
        let values = vec![0.0_f32, 1.0, 1.0, 1.0, 2.0];
        let vol: Volume = UnstructuredVolume::new(kvs_core::CellType::Tetrahedra, coords, vec![0, 1, 2, 3, 1, 2, 3, 4], 1, values)
            .unwrap()
            .into();
        let polygon = Isosurface::with_isolevel(0.5, TransferFunction::default())
            .exec(&vol)
            .unwrap();
        assert_eq!(polygon.npolygons(), 1);
        assert_eq!(polygon.nvertices(), 3);
    }

    #[test]
    fn test_single_tet_vertices_are_interpolated() {
        let coords = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
        let vol: Volume =
            UnstructuredVolume::new(kvs_core::CellType::Tetrahedra, coords, vec![0, 1, 2, 3], 1, vec![0.0_f32, 0.0, 0.0, 4.0])
                .unwrap()
                .into();
        let options = IsosurfaceOptions {
            isolevel: 1.0,
            normal_type: NormalType::VertexNormal,
            duplication: false,
        };
        let polygon = Isosurface::new(options, TransferFunction::default()).exec(&vol).unwrap();
        assert_eq!(polygon.npolygons(), 1);
        assert_eq!(polygon.nvertices(), 3);
        // a quarter of the way up from each low node toward the apex
        for expected in [
            Vec3::new(0.0, 0.0, 0.25),
            Vec3::new(0.75, 0.0, 0.25),
            Vec3::new(0.0, 0.75, 0.25),
        ] {
            assert!(
                polygon.coords().iter().any(|v| (*v - expected).length() < 1e-6),
                "missing {expected}"
            );
        }
        // oriented toward the higher value
        assert!(polygon.normals()[0].z > 0.0);
    }

    #[test]
    fn test_crossing_parameter() {
        assert!((crossing(-1.0, 3.0) - 0.25).abs() < 1e-6);
        assert_eq!(crossing(-1.0, f64::NAN), 0.5);
        assert_eq!(crossing(f64::NAN, 1.0), 0.5);
        assert_eq!(crossing(-1.0, f64::INFINITY), 0.0);
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_non_finite_samples_stay_off_the_surface() {
        let mut values: Vec<f32> = Vec::new();
        for k in 0..3 {
            for j in 0..3 {
                for i in 0..3 {
                    values.push((i + j + k) as f32);
                }
            }
        }
        values[13] = f32::NAN;
        values[26] = f32::INFINITY;
        values[1] = f32::NEG_INFINITY;
        let vol: Volume = StructuredVolume::uniform_in_index_space(UVec3::splat(3), 1, values)
            .unwrap()
            .into();
        assert_eq!(vol.field().min_max_values(), (0.0, 5.0));

        for normal_type in [NormalType::PolygonNormal, NormalType::VertexNormal] {
            let options = IsosurfaceOptions {
                isolevel: 2.5,
                normal_type,
                duplication: true,
            };
            let polygon = Isosurface::new(options, TransferFunction::default()).exec(&vol).unwrap();
            assert!(polygon.npolygons() > 0);
            assert!(polygon.coords().iter().all(|v| v.is_finite()));
        }

        let polygon = Isosurface::with_isolevel(f64::NAN, TransferFunction::default())
            .exec(&vol)
            .unwrap();
        assert_eq!(polygon.colors()[0], TransferFunction::default().color_map().get(0));
    }
}
