//! Streamline demonstration.
//!
//! Run with: cargo run --example streamline_demo
//!
//! Traces a swirling flow from random seeds with each integration method.

use glam::{UVec3, Vec3};
use kvs::{IntegrationDirection, IntegrationMethod, Streamline, StreamlineOptions, StructuredVolume, TransferFunction, Volume};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn swirl(n: u32) -> Volume {
    let mut values = Vec::new();
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                let p = Vec3::new(i as f32, j as f32, k as f32) / (n - 1) as f32 * 2.0 - Vec3::ONE;
                values.extend([-p.y, p.x, 0.2 * (1.0 - p.length())]);
            }
        }
    }
    StructuredVolume::uniform(UVec3::splat(n), Vec3::NEG_ONE, Vec3::ONE, 3, values)
        .expect("valid lattice")
        .into()
}

fn main() {
    env_logger::init();

    let volume = swirl(24);
    let mut rng = StdRng::seed_from_u64(42);
    let seeds = Streamline::random_seed_points(&volume, 32, &mut rng);

    for method in [
        IntegrationMethod::Euler,
        IntegrationMethod::RungeKutta2nd,
        IntegrationMethod::RungeKutta4th,
    ] {
        let options = StreamlineOptions {
            integration_method: method,
            integration_direction: IntegrationDirection::Both,
            integration_interval: 0.05,
            integration_times_threshold: 200,
            min_vertices: 8,
            ..StreamlineOptions::default()
        };
        let mut mapper = Streamline::new(options, TransferFunction::default());
        mapper.set_seed_points(seeds.clone());
        let lines = mapper.exec(&volume).expect("vector volume");
        println!(
            "{method:?}: {} lines, {} vertices",
            lines.nlines(),
            lines.nvertices()
        );
    }
}
