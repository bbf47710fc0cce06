use std::f32::consts::{PI, TAU};

use glam::Vec3;
use kvs_core::{GlyphOptions, NormalType, TransferFunction};

use super::{Glyph, GlyphBase, GlyphInstance, GlyphMesh};

/// A UV sphere per point, `size` being its radius.
///
/// The sphere has `nslices` segments around its axis and `nstacks` along it,
/// with single pole vertices; normals are per vertex.
#[derive(Debug, Clone, Default)]
pub struct SphereGlyph {
    base: GlyphBase,
}

impl SphereGlyph {
    #[must_use]
    pub fn new(options: GlyphOptions, tfunc: TransferFunction) -> Self {
        Self {
            base: GlyphBase::new(options, tfunc),
        }
    }

    fn tessellation(&self) -> (u32, u32) {
        let o = self.base.options();
        (o.nslices.max(3), o.nstacks.max(2))
    }

    /// Unit-sphere directions: north pole, rings from north to south, south pole.
    #[allow(clippy::cast_precision_loss)]
    fn unit_vertices(nslices: u32, nstacks: u32) -> Vec<Vec3> {
        let mut vertices = Vec::with_capacity((nslices * (nstacks - 1) + 2) as usize);
        vertices.push(Vec3::Z);
        for stack in 1..nstacks {
            let phi = PI * stack as f32 / nstacks as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            for slice in 0..nslices {
                let theta = TAU * slice as f32 / nslices as f32;
                let (sin_theta, cos_theta) = theta.sin_cos();
                vertices.push(Vec3::new(sin_phi * cos_theta, sin_phi * sin_theta, cos_phi));
            }
        }
        vertices.push(Vec3::NEG_Z);
        vertices
    }
}

impl Glyph for SphereGlyph {
    fn base(&self) -> &GlyphBase {
        &self.base
    }

    fn normal_type(&self) -> NormalType {
        NormalType::VertexNormal
    }

    #[allow(clippy::cast_possible_truncation)]
    fn append(&self, glyph: &GlyphInstance, mesh: &mut GlyphMesh) {
        let (nslices, nstacks) = self.tessellation();
        let rotation = glyph.rotation();

        let first = mesh.coords.len() as u32;
        for unit in Self::unit_vertices(nslices, nstacks) {
            let normal = rotation * unit;
            mesh.push_vertex(glyph.position + normal * glyph.size, glyph);
            mesh.normals.push(normal);
        }

        let ring = |stack: u32, slice: u32| first + 1 + (stack - 1) * nslices + slice % nslices;
        let south = first + 1 + (nstacks - 1) * nslices;
        for slice in 0..nslices {
            mesh.connections.extend([first, ring(1, slice), ring(1, slice + 1)]);
        }
        for stack in 1..nstacks - 1 {
            for slice in 0..nslices {
                let (a, b) = (ring(stack, slice), ring(stack, slice + 1));
                let (c, d) = (ring(stack + 1, slice), ring(stack + 1, slice + 1));
                mesh.connections.extend([a, c, d, a, d, b]);
            }
        }
        for slice in 0..nslices {
            mesh.connections
                .extend([south, ring(nstacks - 1, slice + 1), ring(nstacks - 1, slice)]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvs_core::{PointObject, RgbColor};

    fn face_normal(coords: &[Vec3], tri: &[u32]) -> Vec3 {
        let [a, b, c] = [0, 1, 2].map(|i| coords[tri[i] as usize]);
        (b - a).cross(c - a)
    }

    #[test]
    fn test_sphere_counts() {
        let options = GlyphOptions {
            nslices: 8,
            nstacks: 4,
            ..GlyphOptions::default()
        };
        let mut points = PointObject::new();
        points.set_coords(vec![Vec3::ZERO, Vec3::splat(5.0)]);
        let polygon = SphereGlyph::new(options, TransferFunction::default())
            .exec_points(&points)
            .unwrap();
        // 2 poles + 3 rings of 8, twice
        assert_eq!(polygon.nvertices(), 2 * 26);
        assert_eq!(polygon.npolygons(), 2 * 2 * 8 * 3);
        assert_eq!(polygon.normals().len(), polygon.nvertices());
        assert_eq!(polygon.colors().len(), polygon.nvertices());
        assert_eq!(polygon.normal_type(), NormalType::VertexNormal);
    }

    #[test]
    fn test_sphere_is_closed_and_outward() {
        let glyph = GlyphInstance {
            position: Vec3::new(1.0, 2.0, 3.0),
            size: 0.5,
            direction: Vec3::X,
            color: RgbColor::WHITE,
            opacity: 200,
        };
        let mut mesh = GlyphMesh::default();
        SphereGlyph::default().append(&glyph, &mut mesh);

        for p in &mesh.coords {
            assert!(((*p - glyph.position).length() - 0.5).abs() < 1e-5);
        }
        for tri in mesh.connections.chunks_exact(3) {
            let center = tri.iter().map(|&i| mesh.coords[i as usize]).sum::<Vec3>() / 3.0;
            assert!(face_normal(&mesh.coords, tri).dot(center - glyph.position) > 0.0);
        }
        assert!(mesh.opacities.iter().all(|&a| a == 200));
    }
}
