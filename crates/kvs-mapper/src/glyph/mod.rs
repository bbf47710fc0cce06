//! Glyph placement.
//!
//! # Overview
//!
//! [`GlyphBase`] turns a volume or a point set into one [`GlyphInstance`] per
//! point: a position, a size, a direction, a color and an opacity, each taken
//! either from the [`GlyphOptions`] defaults or from the data, depending on
//! the four mode flags. A [`Glyph`] implementation then emits one polygonal
//! primitive per instance into a [`GlyphMesh`].
//!
//! For volumes "magnitude" is the node value (or vector length) normalized
//! through the transfer function range; directions come from 3-component
//! vector fields. For point sets sizes, colors and directions come from the
//! point sizes, colors and normals.

mod diamond;
mod sphere;

pub use diamond::DiamondGlyph;
pub use sphere::SphereGlyph;

use glam::{Quat, Vec3};
use kvs_core::{
    ColorMode, ColorType, DirectionMode, GlyphOptions, KvsError, NormalType, OpacityMode, PointObject,
    PolygonObject, Result, RgbColor, SizeMode, TransferFunction, Volume,
};

use crate::extract_vertices::ExtractVertices;
use crate::normalize::Normalizer;

/// One glyph to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphInstance {
    pub position: Vec3,
    pub size: f32,
    /// Unit direction the glyph's local +Z axis is turned to, or zero for none.
    pub direction: Vec3,
    pub color: RgbColor,
    pub opacity: u8,
}

impl GlyphInstance {
    /// Rotation taking local +Z to the instance direction.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        if self.direction.length_squared() < 1e-12 {
            Quat::IDENTITY
        } else {
            Quat::from_rotation_arc(Vec3::Z, self.direction)
        }
    }
}

/// Triangles of all glyphs, with per-vertex colors and opacities.
#[derive(Debug, Clone, Default)]
pub struct GlyphMesh {
    pub coords: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<RgbColor>,
    pub opacities: Vec<u8>,
    pub connections: Vec<u32>,
}

impl GlyphMesh {
    /// Appends a vertex carrying the instance color and opacity.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push_vertex(&mut self, position: Vec3, glyph: &GlyphInstance) -> u32 {
        let index = self.coords.len() as u32;
        self.coords.push(position);
        self.colors.push(glyph.color);
        self.opacities.push(glyph.opacity);
        index
    }

    fn into_polygon(self, normal_type: NormalType) -> PolygonObject {
        let mut polygon = PolygonObject::new();
        polygon.set_coords(self.coords);
        polygon.set_normals(self.normals);
        polygon.set_colors(self.colors);
        polygon.set_opacities(self.opacities);
        polygon.set_connections(self.connections);
        polygon.set_color_type(ColorType::VertexColor);
        polygon.set_normal_type(normal_type);
        polygon
    }
}

/// Per-point glyph attributes shared by every glyph shape.
#[derive(Debug, Clone, Default)]
pub struct GlyphBase {
    options: GlyphOptions,
    tfunc: TransferFunction,
}

impl GlyphBase {
    #[must_use]
    pub fn new(options: GlyphOptions, tfunc: TransferFunction) -> Self {
        Self { options, tfunc }
    }

    #[must_use]
    pub fn options(&self) -> &GlyphOptions {
        &self.options
    }

    #[must_use]
    pub fn transfer_function(&self) -> &TransferFunction {
        &self.tfunc
    }

    /// One instance per volume node.
    ///
    /// Orienting by direction needs a vector field with at least three
    /// components.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn instances_from_volume(&self, volume: &Volume) -> Result<Vec<GlyphInstance>> {
        let field = volume.field();
        let o = &self.options;
        if o.direction_mode == DirectionMode::DirectionByNormal && field.veclen() < 3 {
            log::error!("glyph directions need a vector field, got veclen {}", field.veclen());
            return Err(KvsError::NotVectorField(field.veclen()));
        }
        if volume.nnodes() == 0 {
            return Err(KvsError::EmptyVolume);
        }

        let normalizer = Normalizer::new(&self.tfunc, field);
        let last = (self.tfunc.resolution() - 1).max(1) as f32;
        let positions = ExtractVertices::calculate_coords(volume);

        let instances = positions
            .into_iter()
            .enumerate()
            .map(|(node, position)| {
                let index = normalizer.index(field.scalar(node));
                let (color, opacity) = self.tfunc.at(index);
                GlyphInstance {
                    position,
                    size: o.scale
                        * match o.size_mode {
                            SizeMode::SizeByDefault => o.default_size,
                            SizeMode::SizeByMagnitude => o.default_size * index / last,
                        },
                    direction: match o.direction_mode {
                        DirectionMode::DirectionByDefault => Vec3::ZERO,
                        DirectionMode::DirectionByNormal => field.vector(node).normalize_or_zero(),
                    },
                    color: match o.color_mode {
                        ColorMode::ColorByDefault => o.default_color,
                        ColorMode::ColorByMagnitude => color,
                    },
                    opacity: match o.opacity_mode {
                        OpacityMode::OpacityByDefault => o.default_opacity,
                        OpacityMode::OpacityByMagnitude => (opacity.clamp(0.0, 1.0) * 255.0).round() as u8,
                    },
                }
            })
            .collect();
        Ok(instances)
    }

    /// One instance per point.
    ///
    /// Sizes and colors come from the points when their modes ask for data;
    /// a single size or color applies to every point. Directions come from
    /// the point normals. Points carry no opacity, so every instance gets
    /// the default opacity.
    pub fn instances_from_points(&self, points: &PointObject) -> Result<Vec<GlyphInstance>> {
        let o = &self.options;
        let n = points.nvertices();
        if o.opacity_mode == OpacityMode::OpacityByMagnitude {
            log::debug!("point sets have no opacities; using the default opacity {}", o.default_opacity);
        }
        let per_point = |len: usize, what: &str| -> Result<()> {
            if len == 1 || len == n {
                Ok(())
            } else {
                log::error!("point set has {len} {what} for {n} points");
                Err(KvsError::SizeMismatch { expected: n, actual: len })
            }
        };
        if o.size_mode == SizeMode::SizeByMagnitude {
            per_point(points.sizes().len(), "sizes")?;
        }
        if o.color_mode == ColorMode::ColorByMagnitude {
            per_point(points.colors().len(), "colors")?;
        }
        if o.direction_mode == DirectionMode::DirectionByNormal && points.normals().len() != n {
            log::error!("point set has {} normals for {n} points", points.normals().len());
            return Err(KvsError::SizeMismatch {
                expected: n,
                actual: points.normals().len(),
            });
        }

        let pick = |values: &[f32], i: usize| values[if values.len() == 1 { 0 } else { i }];
        let instances = points
            .coords()
            .iter()
            .enumerate()
            .map(|(i, &position)| GlyphInstance {
                position,
                size: o.scale
                    * match o.size_mode {
                        SizeMode::SizeByDefault => o.default_size,
                        SizeMode::SizeByMagnitude => pick(points.sizes(), i),
                    },
                direction: match o.direction_mode {
                    DirectionMode::DirectionByDefault => Vec3::ZERO,
                    DirectionMode::DirectionByNormal => points.normals()[i].normalize_or_zero(),
                },
                color: match o.color_mode {
                    ColorMode::ColorByDefault => o.default_color,
                    ColorMode::ColorByMagnitude => {
                        let colors = points.colors();
                        colors[if colors.len() == 1 { 0 } else { i }]
                    }
                },
                opacity: o.default_opacity,
            })
            .collect();
        Ok(instances)
    }
}

/// A glyph shape.
///
/// Implementors emit one primitive per instance; placement is shared.
pub trait Glyph {
    fn base(&self) -> &GlyphBase;

    /// Normal layout of the emitted mesh.
    fn normal_type(&self) -> NormalType;

    /// Appends the primitive of one instance.
    fn append(&self, glyph: &GlyphInstance, mesh: &mut GlyphMesh);

    /// Places one glyph on every node of `volume`.
    fn exec(&self, volume: &Volume) -> Result<PolygonObject> {
        let instances = self.base().instances_from_volume(volume)?;
        let mut polygon = self.assemble(&instances);
        let (min, max) = volume.bounds();
        polygon.set_min_max_coords(min, max);
        Ok(polygon)
    }

    /// Places one glyph on every point of `points`.
    fn exec_points(&self, points: &PointObject) -> Result<PolygonObject> {
        let instances = self.base().instances_from_points(points)?;
        let mut polygon = self.assemble(&instances);
        polygon.update_min_max_coords();
        Ok(polygon)
    }

    /// Builds the mesh of `instances`.
    fn assemble(&self, instances: &[GlyphInstance]) -> PolygonObject {
        let mut mesh = GlyphMesh::default();
        for glyph in instances {
            self.append(glyph, &mut mesh);
        }
        log::debug!("{} glyphs, {} vertices", instances.len(), mesh.coords.len());
        mesh.into_polygon(self.normal_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec3;
    use kvs_core::StructuredVolume;

    fn vector_volume() -> Volume {
        // magnitudes 0, 1, 2, 3 along x, constant along y and z
        let mut values = Vec::new();
        for _ in 0..4 {
            for i in 0..4 {
                values.extend([i as f32, 0.0, 0.0]);
            }
        }
        StructuredVolume::uniform_in_index_space(UVec3::new(4, 2, 2), 3, values)
            .unwrap()
            .into()
    }

    #[test]
    fn test_defaults_ignore_the_data() {
        let base = GlyphBase::default();
        let instances = base.instances_from_volume(&vector_volume()).unwrap();
        assert_eq!(instances.len(), 16);
        for g in &instances {
            assert_eq!(g.size, 1.0);
            assert_eq!(g.color, RgbColor::WHITE);
            assert_eq!(g.opacity, 255);
            assert_eq!(g.direction, Vec3::ZERO);
        }
    }

    #[test]
    fn test_magnitude_modes() {
        let options = GlyphOptions {
            size_mode: SizeMode::SizeByMagnitude,
            direction_mode: DirectionMode::DirectionByNormal,
            color_mode: ColorMode::ColorByMagnitude,
            opacity_mode: OpacityMode::OpacityByMagnitude,
            scale: 2.0,
            ..GlyphOptions::default()
        };
        let base = GlyphBase::new(options, TransferFunction::default());
        let instances = base.instances_from_volume(&vector_volume()).unwrap();
        let cmap = base.transfer_function().color_map();

        assert_eq!(instances[0].size, 0.0);
        assert!((instances[3].size - 2.0).abs() < 1e-5);
        assert_eq!(instances[0].color, cmap.get(0));
        assert_eq!(instances[3].color, cmap.get(255));
        assert_eq!(instances[0].opacity, 0);
        assert_eq!(instances[3].opacity, 255);
        assert_eq!(instances[0].direction, Vec3::ZERO);
        assert_eq!(instances[2].direction, Vec3::X);
    }

    #[test]
    fn test_direction_needs_vectors() {
        let scalar: Volume = StructuredVolume::uniform_in_index_space(UVec3::splat(2), 1, vec![0.0_f32; 8])
            .unwrap()
            .into();
        let options = GlyphOptions {
            direction_mode: DirectionMode::DirectionByNormal,
            ..GlyphOptions::default()
        };
        let result = GlyphBase::new(options, TransferFunction::default()).instances_from_volume(&scalar);
        assert!(matches!(result, Err(KvsError::NotVectorField(1))));
    }

    #[test]
    fn test_points_supply_sizes_colors_and_normals() {
        let mut points = PointObject::new();
        points.set_coords(vec![Vec3::ZERO, Vec3::X]);
        points.set_sizes(vec![0.5, 3.0]);
        points.set_colors(vec![RgbColor::new(9, 8, 7)]);
        points.set_normals(vec![Vec3::Y * 2.0, Vec3::Z]);
        let options = GlyphOptions {
            size_mode: SizeMode::SizeByMagnitude,
            direction_mode: DirectionMode::DirectionByNormal,
            color_mode: ColorMode::ColorByMagnitude,
            ..GlyphOptions::default()
        };
        let instances = GlyphBase::new(options, TransferFunction::default())
            .instances_from_points(&points)
            .unwrap();
        assert_eq!(instances[1].size, 3.0);
        assert_eq!(instances[1].color, RgbColor::new(9, 8, 7));
        assert_eq!(instances[0].direction, Vec3::Y);
    }

    #[test]
    fn test_point_opacity_is_always_the_default() {
        let mut points = PointObject::new();
        points.set_coords(vec![Vec3::ZERO, Vec3::X]);
        let options = GlyphOptions {
            opacity_mode: OpacityMode::OpacityByMagnitude,
            default_opacity: 40,
            ..GlyphOptions::default()
        };
        let instances = GlyphBase::new(options, TransferFunction::default())
            .instances_from_points(&points)
            .unwrap();
        assert!(instances.iter().all(|g| g.opacity == 40));
    }

    #[test]
    fn test_non_finite_samples_do_not_break_mapping() {
        let values = vec![0.0_f32, 1.0, 2.0, f32::NAN, 3.0, f32::INFINITY, 5.0, f32::NEG_INFINITY];
        let volume: Volume = StructuredVolume::uniform_in_index_space(UVec3::splat(2), 1, values)
            .unwrap()
            .into();

        let instances = GlyphBase::new(GlyphOptions::default(), TransferFunction::default())
            .instances_from_volume(&volume)
            .unwrap();
        assert_eq!(instances.len(), 8);

        let options = GlyphOptions {
            size_mode: SizeMode::SizeByMagnitude,
            color_mode: ColorMode::ColorByMagnitude,
            opacity_mode: OpacityMode::OpacityByMagnitude,
            ..GlyphOptions::default()
        };
        let base = GlyphBase::new(options, TransferFunction::default());
        let instances = base.instances_from_volume(&volume).unwrap();
        let cmap = base.transfer_function().color_map();
        for node in [3, 5, 7] {
            assert_eq!(instances[node].size, 0.0);
            assert_eq!(instances[node].color, cmap.get(0));
            assert_eq!(instances[node].opacity, 0);
        }
        assert!((instances[6].size - 1.0).abs() < 1e-5);
        assert!(instances.iter().all(|g| g.size.is_finite()));
    }

    #[test]
    fn test_points_with_wrong_attribute_count() {
        let mut points = PointObject::new();
        points.set_coords(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        points.set_sizes(vec![1.0, 2.0]);
        let options = GlyphOptions {
            size_mode: SizeMode::SizeByMagnitude,
            ..GlyphOptions::default()
        };
        let result = GlyphBase::new(options, TransferFunction::default()).instances_from_points(&points);
        assert!(matches!(result, Err(KvsError::SizeMismatch { expected: 3, actual: 2 })));
    }

    #[test]
    fn test_rotation_turns_z_to_direction() {
        let glyph = GlyphInstance {
            position: Vec3::ZERO,
            size: 1.0,
            direction: Vec3::X,
            color: RgbColor::WHITE,
            opacity: 255,
        };
        assert!((glyph.rotation() * Vec3::Z - Vec3::X).length() < 1e-6);
    }
}
