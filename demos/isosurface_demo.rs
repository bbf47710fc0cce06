//! Isosurface demonstration.
//!
//! Run with: cargo run --example isosurface_demo
//!
//! Extracts nested surfaces of a two-blob field and prints their sizes.
//! Set `RUST_LOG=debug` to see the mapper statistics.

use glam::{UVec3, Vec3};
use kvs::{ColorMap, Isosurface, IsosurfaceOptions, NormalType, RgbColor, StructuredVolume, TransferFunction, Volume};

fn blobs(n: u32) -> Volume {
    let a = Vec3::new(-0.4, 0.0, 0.0);
    let b = Vec3::new(0.4, 0.1, 0.0);
    let mut values = Vec::new();
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                let p = Vec3::new(i as f32, j as f32, k as f32) / (n - 1) as f32 * 2.0 - Vec3::ONE;
                values.push(1.0 / (0.05 + p.distance_squared(a)) + 1.0 / (0.05 + p.distance_squared(b)));
            }
        }
    }
    StructuredVolume::uniform(UVec3::splat(n), Vec3::NEG_ONE, Vec3::ONE, 1, values)
        .expect("valid lattice")
        .into()
}

fn main() {
    env_logger::init();

    let volume = blobs(48);
    let (min, max) = volume.field().min_max_values();
    println!("field range [{min:.3}, {max:.3}]");

    let mut cmap = ColorMap::new(256);
    cmap.add_point(0.0, RgbColor::new(40, 60, 200));
    cmap.add_point(255.0, RgbColor::new(230, 60, 40));
    cmap.create(256);
    let tfunc = TransferFunction::from_color_map(cmap);

    for isolevel in [2.0, 4.0, 8.0] {
        let options = IsosurfaceOptions {
            isolevel,
            normal_type: NormalType::VertexNormal,
            duplication: false,
        };
        let surface = Isosurface::new(options, tfunc.clone())
            .exec(&volume)
            .expect("scalar volume");
        println!(
            "isolevel {isolevel:>4}: {:>6} triangles, {:>6} vertices, color {:?}",
            surface.npolygons(),
            surface.nvertices(),
            surface.colors()[0]
        );
    }
}
