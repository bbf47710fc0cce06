//! Glyph demonstration.
//!
//! Run with: cargo run --example glyph_demo
//!
//! Places spheres sized by magnitude and diamonds oriented along the field
//! of a small source flow.

use glam::{UVec3, Vec3};
use kvs::{
    ColorMode, DiamondGlyph, DirectionMode, Glyph, GlyphOptions, OpacityMode, SizeMode, SphereGlyph, StructuredVolume,
    TransferFunction, Volume,
};

fn source(n: u32) -> Volume {
    let mut values = Vec::new();
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                let p = Vec3::new(i as f32, j as f32, k as f32) / (n - 1) as f32 * 2.0 - Vec3::ONE;
                values.extend(p.to_array());
            }
        }
    }
    StructuredVolume::uniform(UVec3::splat(n), Vec3::NEG_ONE, Vec3::ONE, 3, values)
        .expect("valid lattice")
        .into()
}

fn main() {
    env_logger::init();

    let volume = source(6);
    let mut tfunc = TransferFunction::default();
    tfunc.adjust_range(&volume);

    let spheres = SphereGlyph::new(
        GlyphOptions {
            size_mode: SizeMode::SizeByMagnitude,
            color_mode: ColorMode::ColorByMagnitude,
            opacity_mode: OpacityMode::OpacityByMagnitude,
            scale: 0.15,
            nslices: 12,
            nstacks: 8,
            ..GlyphOptions::default()
        },
        tfunc.clone(),
    )
    .exec(&volume)
    .expect("glyphs on a volume");
    println!("spheres: {} triangles, {} vertices", spheres.npolygons(), spheres.nvertices());

    let diamonds = DiamondGlyph::new(
        GlyphOptions {
            direction_mode: DirectionMode::DirectionByNormal,
            color_mode: ColorMode::ColorByMagnitude,
            scale: 0.1,
            ..GlyphOptions::default()
        },
        tfunc,
    )
    .exec(&volume)
    .expect("glyphs on a vector volume");
    println!("diamonds: {} triangles", diamonds.npolygons());
}
