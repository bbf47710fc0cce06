use glam::Vec3;
use kvs_core::{GlyphOptions, NormalType, TransferFunction};

use super::{Glyph, GlyphBase, GlyphInstance, GlyphMesh};

/// Octahedron tips along the local axis, then the equator counter-clockwise.
const TIP: Vec3 = Vec3::Z;
const EQUATOR: [Vec3; 4] = [
    Vec3::new(0.5, 0.0, 0.0),
    Vec3::new(0.0, 0.5, 0.0),
    Vec3::new(-0.5, 0.0, 0.0),
    Vec3::new(0.0, -0.5, 0.0),
];

/// An elongated octahedron per point, pointing along the glyph direction.
///
/// The tips sit `size` away from the center and the equator half as far.
/// Faces are flat, so every triangle has its own vertices and normal.
#[derive(Debug, Clone, Default)]
pub struct DiamondGlyph {
    base: GlyphBase,
}

impl DiamondGlyph {
    #[must_use]
    pub fn new(options: GlyphOptions, tfunc: TransferFunction) -> Self {
        Self {
            base: GlyphBase::new(options, tfunc),
        }
    }

    /// The eight faces in local coordinates, wound outward.
    fn faces() -> [[Vec3; 3]; 8] {
        let mut faces = [[Vec3::ZERO; 3]; 8];
        for i in 0..4 {
            let (a, b) = (EQUATOR[i], EQUATOR[(i + 1) % 4]);
            faces[i] = [TIP, a, b];
            faces[i + 4] = [-TIP, b, a];
        }
        faces
    }
}

impl Glyph for DiamondGlyph {
    fn base(&self) -> &GlyphBase {
        &self.base
    }

    fn normal_type(&self) -> NormalType {
        NormalType::PolygonNormal
    }

    fn append(&self, glyph: &GlyphInstance, mesh: &mut GlyphMesh) {
        let rotation = glyph.rotation();
        for face in Self::faces() {
            let [a, b, c] = face.map(|p| glyph.position + rotation * (p * glyph.size));
            let tri = [a, b, c].map(|p| mesh.push_vertex(p, glyph));
            mesh.connections.extend(tri);
            mesh.normals.push((b - a).cross(c - a).normalize_or_zero());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec3;
    use kvs_core::{DirectionMode, RgbColor, StructuredVolume, Volume};

    #[test]
    fn test_faces_point_outward() {
        for [a, b, c] in DiamondGlyph::faces() {
            let normal = (b - a).cross(c - a);
            assert!(normal.dot(a + b + c) > 0.0);
        }
    }

    #[test]
    fn test_diamond_follows_direction() {
        let glyph = GlyphInstance {
            position: Vec3::ONE,
            size: 2.0,
            direction: Vec3::Y,
            color: RgbColor::new(1, 2, 3),
            opacity: 255,
        };
        let mut mesh = GlyphMesh::default();
        DiamondGlyph::default().append(&glyph, &mut mesh);
        assert_eq!(mesh.coords.len(), 24);
        assert_eq!(mesh.normals.len(), 8);
        // the first face starts at the forward tip
        assert!((mesh.coords[0] - Vec3::new(1.0, 3.0, 1.0)).length() < 1e-5);
        let farthest = mesh.coords.iter().map(|p| (*p - Vec3::ONE).length()).fold(0.0, f32::max);
        assert!((farthest - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_one_diamond_per_node() {
        let values: Vec<f32> = (0..8).flat_map(|_| [0.0, 0.0, 1.0]).collect();
        let vol: Volume = StructuredVolume::uniform_in_index_space(UVec3::splat(2), 3, values)
            .unwrap()
            .into();
        let options = GlyphOptions {
            direction_mode: DirectionMode::DirectionByNormal,
            ..GlyphOptions::default()
        };
        let polygon = DiamondGlyph::new(options, TransferFunction::default()).exec(&vol).unwrap();
        assert_eq!(polygon.npolygons(), 8 * 8);
        assert_eq!(polygon.normals().len(), polygon.npolygons());
        assert_eq!(polygon.min_max_coords(), Some((Vec3::ZERO, Vec3::ONE)));
    }
}
