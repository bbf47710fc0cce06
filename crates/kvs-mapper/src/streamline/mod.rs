//! Streamline tracing.
//!
//! # Overview
//!
//! A streamline follows a 3-component vector field from a seed point. Each
//! step samples the field, advances by one Euler, second-order or
//! fourth-order Runge-Kutta step of `integration_interval` along the unit
//! field direction, then checks three termination conditions in order:
//!
//! 1. the new vertex left the volume,
//! 2. the current vector is no longer than `vector_length_threshold`,
//! 3. `integration_times_threshold` steps have been taken.
//!
//! Each condition can be switched off. Once a line is complete it goes
//! through [`StreamlineBase::check_for_acceptance`], which may discard it.
//!
//! [`StreamlineBase`] holds the integration scheme; implementors supply the
//! field lookup, the boundary test and the vertex color. [`Streamline`] is
//! the mapper over a [`Volume`].

mod sampler;

use glam::Vec3;
use kvs_core::{
    ColorType, IntegrationDirection, IntegrationMethod, KvsError, LineObject, LineType, Result, RgbColor,
    StreamlineOptions, TransferFunction, Volume,
};
use rand::Rng;

use crate::normalize::Normalizer;
use sampler::VectorSampler;

/// Vertices of one traced line with the field vector at each vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TracedLine {
    pub vertices: Vec<Vec3>,
    pub vectors: Vec<Vec3>,
}

impl TracedLine {
    fn push(&mut self, vertex: Vec3, vector: Vec3) {
        self.vertices.push(vertex);
        self.vectors.push(vector);
    }

    fn reverse(&mut self) {
        self.vertices.reverse();
        self.vectors.reverse();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Integration and termination shared by every streamline tracer.
pub trait StreamlineBase {
    fn options(&self) -> &StreamlineOptions;

    /// Field vector at `point`, or `None` where the field is undefined.
    fn interpolate_vector(&mut self, point: Vec3) -> Option<Vec3>;

    fn check_for_inside_volume(&mut self, point: Vec3) -> bool;

    /// Color of a vertex whose field vector is `vector`.
    fn calculate_color(&self, vector: Vec3) -> RgbColor;

    /// Whether a finished line is kept.
    fn check_for_acceptance(&self, vertices: &[Vec3]) -> bool {
        vertices.len() >= self.options().min_vertices
    }

    fn check_for_vector_length(&self, vector: Vec3) -> bool {
        vector.length() > self.options().vector_length_threshold
    }

    fn check_for_integration_times(&self, times: usize) -> bool {
        times < self.options().integration_times_threshold
    }

    /// Returns true if tracing stops before `next` is appended.
    fn check_for_termination(&mut self, vector: Vec3, times: usize, next: Vec3) -> bool {
        let o = *self.options();
        (o.enable_boundary_condition && !self.check_for_inside_volume(next))
            || (o.enable_vector_length_condition && !self.check_for_vector_length(vector))
            || (o.enable_integration_times_condition && !self.check_for_integration_times(times))
    }

    /// One step of signed length `step` from `current`, whose field vector is `vector`.
    fn calculate_next_vertex(&mut self, current: Vec3, vector: Vec3, step: f32) -> Option<Vec3> {
        match self.options().integration_method {
            IntegrationMethod::Euler => self.integrate_by_euler(current, vector, step),
            IntegrationMethod::RungeKutta2nd => self.integrate_by_runge_kutta_2nd(current, vector, step),
            IntegrationMethod::RungeKutta4th => self.integrate_by_runge_kutta_4th(current, vector, step),
        }
    }

    fn integrate_by_euler(&mut self, current: Vec3, vector: Vec3, step: f32) -> Option<Vec3> {
        Some(current + step * vector.normalize_or_zero())
    }

    fn integrate_by_runge_kutta_2nd(&mut self, current: Vec3, vector: Vec3, step: f32) -> Option<Vec3> {
        let k1 = step * vector.normalize_or_zero();
        let k2 = step * self.interpolate_vector(current + 0.5 * k1)?.normalize_or_zero();
        Some(current + k2)
    }

    fn integrate_by_runge_kutta_4th(&mut self, current: Vec3, vector: Vec3, step: f32) -> Option<Vec3> {
        let k1 = step * vector.normalize_or_zero();
        let k2 = step * self.interpolate_vector(current + 0.5 * k1)?.normalize_or_zero();
        let k3 = step * self.interpolate_vector(current + 0.5 * k2)?.normalize_or_zero();
        let k4 = step * self.interpolate_vector(current + k3)?.normalize_or_zero();
        Some(current + (k1 + 2.0 * k2 + 2.0 * k3 + k4) / 6.0)
    }

    /// Appends the vertices traced from `seed` with signed step `step`,
    /// excluding the seed itself.
    ///
    /// Tracing also ends when a step leaves the field or does not move.
    fn calculate_one_side(&mut self, seed: Vec3, seed_vector: Vec3, step: f32, line: &mut TracedLine) {
        let (mut current, mut vector) = (seed, seed_vector);
        let mut times = 0;
        loop {
            let Some(next) = self.calculate_next_vertex(current, vector, step) else {
                break;
            };
            if self.check_for_termination(vector, times, next) || next == current {
                break;
            }
            let Some(next_vector) = self.interpolate_vector(next) else {
                break;
            };
            line.push(next, next_vector);
            current = next;
            vector = next_vector;
            times += 1;
        }
    }

    /// Traces the whole line through `seed`, or `None` for a seed outside the volume.
    fn calculate_line(&mut self, seed: Vec3) -> Option<TracedLine> {
        if !self.check_for_inside_volume(seed) {
            return None;
        }
        let seed_vector = self.interpolate_vector(seed)?;
        let o = *self.options();
        let mut line = TracedLine::default();
        match o.integration_direction {
            IntegrationDirection::Forward | IntegrationDirection::Backward => {
                line.push(seed, seed_vector);
                let step = o.integration_direction.sign() * o.integration_interval;
                self.calculate_one_side(seed, seed_vector, step, &mut line);
            }
            IntegrationDirection::Both => {
                self.calculate_one_side(seed, seed_vector, -o.integration_interval, &mut line);
                line.reverse();
                line.push(seed, seed_vector);
                self.calculate_one_side(seed, seed_vector, o.integration_interval, &mut line);
            }
        }
        Some(line)
    }

    /// Traces every seed and collects the accepted lines into a polyline object.
    #[allow(clippy::cast_possible_truncation)]
    fn extract_lines(&mut self, seeds: &[Vec3]) -> LineObject {
        let mut coords = Vec::new();
        let mut colors = Vec::new();
        let mut connections = Vec::new();
        for &seed in seeds {
            let Some(line) = self.calculate_line(seed) else {
                log::debug!("seed {seed} is outside the volume");
                continue;
            };
            if !self.check_for_acceptance(&line.vertices) {
                continue;
            }
            let first = coords.len() as u32;
            connections.extend([first, first + line.len() as u32 - 1]);
            colors.extend(line.vectors.iter().map(|&v| self.calculate_color(v)));
            coords.extend(line.vertices);
        }
        log::debug!("{} of {} streamlines accepted", connections.len() / 2, seeds.len());

        let mut lines = LineObject::new();
        lines.set_coords(coords);
        lines.set_colors(colors);
        lines.set_connections(connections);
        lines.set_line_type(LineType::Polyline);
        lines.set_color_type(ColorType::VertexColor);
        lines.update_min_max_coords();
        lines
    }
}

/// Tracer over one volume, colored by vector magnitude.
struct VolumeTracer<'a> {
    options: &'a StreamlineOptions,
    tfunc: &'a TransferFunction,
    normalizer: Normalizer,
    sampler: VectorSampler<'a>,
}

impl StreamlineBase for VolumeTracer<'_> {
    fn options(&self) -> &StreamlineOptions {
        self.options
    }

    fn interpolate_vector(&mut self, point: Vec3) -> Option<Vec3> {
        self.sampler.sample(point)
    }

    fn check_for_inside_volume(&mut self, point: Vec3) -> bool {
        self.sampler.contains(point)
    }

    fn calculate_color(&self, vector: Vec3) -> RgbColor {
        let index = self.normalizer.index(f64::from(vector.length()));
        self.tfunc.color_map().at(index)
    }
}

/// Traces streamlines of a vector volume from a set of seed points.
///
/// Accepts uniform and rectilinear structured volumes and every unstructured
/// cell type.
#[derive(Debug, Clone, Default)]
pub struct Streamline {
    options: StreamlineOptions,
    tfunc: TransferFunction,
    seeds: Vec<Vec3>,
}

impl Streamline {
    #[must_use]
    pub fn new(options: StreamlineOptions, tfunc: TransferFunction) -> Self {
        Self {
            options,
            tfunc,
            seeds: Vec::new(),
        }
    }

    pub fn set_seed_points(&mut self, seeds: Vec<Vec3>) {
        self.seeds = seeds;
    }

    #[must_use]
    pub fn seed_points(&self) -> &[Vec3] {
        &self.seeds
    }

    #[must_use]
    pub fn options(&self) -> &StreamlineOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut StreamlineOptions {
        &mut self.options
    }

    #[must_use]
    pub fn transfer_function(&self) -> &TransferFunction {
        &self.tfunc
    }

    /// `count` seeds drawn uniformly from the bounding box of `volume`.
    pub fn random_seed_points<R: Rng + ?Sized>(volume: &Volume, count: usize, rng: &mut R) -> Vec<Vec3> {
        let (min, max) = volume.bounds();
        (0..count)
            .map(|_| min + (max - min) * Vec3::new(rng.gen(), rng.gen(), rng.gen()))
            .collect()
    }

    /// Traces every seed through `volume`.
    ///
    /// Returns [`KvsError::NotVectorField`] unless the volume has three
    /// components per node.
    pub fn exec(&self, volume: &Volume) -> Result<LineObject> {
        let veclen = volume.veclen();
        if veclen != 3 {
            log::error!("streamlines need a 3-component vector field, got veclen {veclen}");
            return Err(KvsError::NotVectorField(veclen));
        }
        let mut tracer = VolumeTracer {
            options: &self.options,
            tfunc: &self.tfunc,
            normalizer: Normalizer::new(&self.tfunc, volume.field()),
            sampler: VectorSampler::new(volume)?,
        };
        Ok(tracer.extract_lines(&self.seeds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec3;
    use kvs_core::{CellType, StructuredVolume, UnstructuredVolume};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// `res` nodes over `[min, max]` sampling `f`.
    #[allow(clippy::cast_precision_loss)]
    fn vector_volume(res: UVec3, min: Vec3, max: Vec3, f: impl Fn(Vec3) -> Vec3) -> Volume {
        let spacing = (max - min) / (res - UVec3::ONE).as_vec3();
        let mut values = Vec::new();
        for k in 0..res.z {
            for j in 0..res.y {
                for i in 0..res.x {
                    let v = f(min + spacing * Vec3::new(i as f32, j as f32, k as f32));
                    values.extend(v.to_array());
                }
            }
        }
        StructuredVolume::uniform(res, min, max, 3, values).unwrap().into()
    }

    fn constant_x() -> Volume {
        vector_volume(UVec3::splat(5), Vec3::ZERO, Vec3::splat(4.0), |_| Vec3::X)
    }

    fn streamline(options: StreamlineOptions, seeds: Vec<Vec3>) -> Streamline {
        let mut mapper = Streamline::new(options, TransferFunction::default());
        mapper.set_seed_points(seeds);
        mapper
    }

    #[test]
    fn test_euler_stops_at_the_boundary() {
        let options = StreamlineOptions {
            integration_method: IntegrationMethod::Euler,
            integration_interval: 0.5,
            ..StreamlineOptions::default()
        };
        let lines = streamline(options, vec![Vec3::new(0.5, 2.0, 2.0)]).exec(&constant_x()).unwrap();
        assert_eq!(lines.nlines(), 1);
        assert_eq!(lines.nvertices(), 8);
        assert_eq!(lines.coords()[7], Vec3::new(4.0, 2.0, 2.0));
        assert_eq!(lines.connections(), &[0, 7]);
        assert_eq!(lines.colors().len(), 8);
        assert_eq!(lines.line_type(), LineType::Polyline);
    }

    #[test]
    fn test_runge_kutta_matches_euler_on_a_constant_field() {
        let seeds = vec![Vec3::new(0.5, 2.0, 2.0)];
        let mut options = StreamlineOptions {
            integration_interval: 0.5,
            ..StreamlineOptions::default()
        };
        let rk4 = streamline(options, seeds.clone()).exec(&constant_x()).unwrap();
        options.integration_method = IntegrationMethod::RungeKutta2nd;
        let rk2 = streamline(options, seeds).exec(&constant_x()).unwrap();
        assert_eq!(rk4.nvertices(), 8);
        assert_eq!(rk2.coords(), rk4.coords());
    }

    #[test]
    fn test_backward_and_both_directions() {
        let mut options = StreamlineOptions {
            integration_method: IntegrationMethod::Euler,
            integration_direction: IntegrationDirection::Backward,
            integration_interval: 0.5,
            ..StreamlineOptions::default()
        };
        let seed = Vec3::new(2.0, 1.0, 1.0);
        let backward = streamline(options, vec![seed]).exec(&constant_x()).unwrap();
        assert_eq!(backward.nvertices(), 5);
        assert_eq!(backward.coords()[4], Vec3::new(0.0, 1.0, 1.0));

        options.integration_direction = IntegrationDirection::Both;
        let both = streamline(options, vec![seed]).exec(&constant_x()).unwrap();
        assert_eq!(both.nvertices(), 9);
        let xs: Vec<f32> = both.coords().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0]);
    }

    #[test]
    fn test_integration_times_threshold() {
        let options = StreamlineOptions {
            integration_method: IntegrationMethod::Euler,
            integration_interval: 0.25,
            integration_times_threshold: 3,
            ..StreamlineOptions::default()
        };
        let lines = streamline(options, vec![Vec3::splat(1.0)]).exec(&constant_x()).unwrap();
        assert_eq!(lines.nvertices(), 4);

        let unlimited = StreamlineOptions {
            enable_integration_times_condition: false,
            ..options
        };
        let lines = streamline(unlimited, vec![Vec3::splat(1.0)]).exec(&constant_x()).unwrap();
        assert_eq!(lines.nvertices(), 13);
    }

    #[test]
    fn test_stagnant_seed_is_discarded() {
        let zero = vector_volume(UVec3::splat(3), Vec3::ZERO, Vec3::ONE, |_| Vec3::ZERO);
        let mapper = streamline(StreamlineOptions::default(), vec![Vec3::splat(0.5)]);
        let lines = mapper.exec(&zero).unwrap();
        assert_eq!(lines.nlines(), 0);
        assert!(lines.is_empty());
    }

    #[test]
    fn test_short_lines_fail_acceptance() {
        let options = StreamlineOptions {
            integration_interval: 1.0,
            min_vertices: 10,
            ..StreamlineOptions::default()
        };
        let lines = streamline(options, vec![Vec3::new(0.5, 2.0, 2.0), Vec3::new(3.5, 2.0, 2.0)])
            .exec(&constant_x())
            .unwrap();
        assert_eq!(lines.nlines(), 0);
    }

    #[test]
    fn test_circular_flow_keeps_its_radius() {
        let volume = vector_volume(
            UVec3::new(5, 5, 2),
            Vec3::new(-2.0, -2.0, 0.0),
            Vec3::new(2.0, 2.0, 1.0),
            |p| Vec3::new(-p.y, p.x, 0.0),
        );
        let options = StreamlineOptions {
            integration_interval: 0.1,
            integration_times_threshold: 60,
            ..StreamlineOptions::default()
        };
        let lines = streamline(options, vec![Vec3::new(1.0, 0.0, 0.5)]).exec(&volume).unwrap();
        assert_eq!(lines.nvertices(), 61);
        for p in lines.coords() {
            assert!((p.truncate().length() - 1.0).abs() < 1e-3, "{p}");
            assert!((p.z - 0.5).abs() < 1e-6);
        }
        // counter-clockwise: the first step goes toward +y
        assert!(lines.coords()[1].y > 0.0);
    }

    #[test]
    fn test_rectilinear_and_unstructured_volumes() {
        let values: Vec<f32> = (0..18).flat_map(|_| [0.0, 0.0, 2.0]).collect();
        let rect: Volume = StructuredVolume::rectilinear([vec![0.0, 1.0], vec![0.0, 0.5, 1.0], vec![0.0, 0.2, 3.0]], 3, values.clone())
            .unwrap()
            .into();
        let options = StreamlineOptions {
            integration_method: IntegrationMethod::Euler,
            integration_interval: 0.5,
            ..StreamlineOptions::default()
        };
        let lines = streamline(options, vec![Vec3::new(0.5, 0.5, 0.0)]).exec(&rect).unwrap();
        assert_eq!(lines.nvertices(), 7);

        let coords = vec![
            Vec3::Z,
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::ONE,
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::Y,
        ];
        let hex: Volume = UnstructuredVolume::new(CellType::Hexahedra, coords, (0..8).collect(), 3, values[..24].to_vec())
            .unwrap()
            .into();
        let options = StreamlineOptions {
            integration_interval: 0.25,
            ..options
        };
        let lines = streamline(options, vec![Vec3::new(0.5, 0.5, 0.0)]).exec(&hex).unwrap();
        assert_eq!(lines.nvertices(), 5);
        assert!((lines.coords()[4].z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_colors_follow_magnitude() {
        // speed grows along x
        let volume = vector_volume(UVec3::new(5, 2, 2), Vec3::ZERO, Vec3::new(4.0, 1.0, 1.0), |p| {
            Vec3::new(1.0 + p.x, 0.0, 0.0)
        });
        let options = StreamlineOptions {
            integration_method: IntegrationMethod::Euler,
            integration_interval: 1.0,
            ..StreamlineOptions::default()
        };
        let mapper = streamline(options, vec![Vec3::new(0.0, 0.5, 0.5)]);
        let lines = mapper.exec(&volume).unwrap();
        let cmap = mapper.transfer_function().color_map();
        assert_eq!(lines.nvertices(), 5);
        assert_eq!(lines.colors()[0], cmap.get(0));
        assert_eq!(lines.colors()[4], cmap.get(255));
    }

    #[test]
    fn test_rejected_inputs() {
        let scalar: Volume = StructuredVolume::uniform_in_index_space(UVec3::splat(2), 1, vec![0.0_f32; 8])
            .unwrap()
            .into();
        assert!(matches!(
            Streamline::default().exec(&scalar),
            Err(KvsError::NotVectorField(1))
        ));

        let curvilinear: Volume = StructuredVolume::curvilinear(UVec3::splat(2), vec![Vec3::ZERO; 8], 3, vec![0.0_f32; 24])
            .unwrap()
            .into();
        assert!(matches!(
            Streamline::default().exec(&curvilinear),
            Err(KvsError::UnsupportedGridType(kvs_core::GridType::Curvilinear))
        ));
    }

    #[test]
    fn test_seeds_outside_are_skipped() {
        let lines = streamline(StreamlineOptions::default(), vec![Vec3::splat(-1.0), Vec3::splat(2.0)])
            .exec(&constant_x())
            .unwrap();
        assert_eq!(lines.nlines(), 1);
    }

    #[test]
    fn test_random_seeds_stay_in_bounds() {
        let volume = constant_x();
        let mut rng = StdRng::seed_from_u64(7);
        let seeds = Streamline::random_seed_points(&volume, 50, &mut rng);
        assert_eq!(seeds.len(), 50);
        for s in &seeds {
            assert!(s.cmpge(Vec3::ZERO).all() && s.cmple(Vec3::splat(4.0)).all());
        }
    }
}
