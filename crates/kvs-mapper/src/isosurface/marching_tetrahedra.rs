//! Marching tetrahedra over unstructured volumes.
//!
//! Every cell is split into tetrahedra over its corner nodes; quadratic cells
//! use their linear corners. Edge vertices are keyed by the pair of global
//! node indices so neighbouring cells share them.

use std::collections::HashMap;

use glam::Vec3;
use kvs_core::{CellType, UnstructuredVolume};

use super::{crossing, SurfaceMesh};

/// Five-tetrahedron split of a hexahedron (corners 1, 3, 4, 6 cut off, 0-2-5-7 in the middle).
const HEX_TO_TET_PATTERN: [[usize; 4]; 5] = [
    [0, 1, 2, 5],
    [0, 2, 7, 5],
    [0, 2, 3, 7],
    [0, 5, 7, 4],
    [2, 7, 5, 6],
];

const PRISM_TO_TET_PATTERN: [[usize; 4]; 3] = [[0, 1, 2, 3], [1, 2, 3, 4], [2, 3, 4, 5]];

const PYRAMID_TO_TET_PATTERN: [[usize; 4]; 2] = [[1, 2, 3, 0], [1, 3, 4, 0]];

const TET_PATTERN: [[usize; 4]; 1] = [[0, 1, 2, 3]];

const TET_EDGES: [(usize, usize); 6] = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];

/// Tetrahedra covering one cell, as local node indices.
fn tetrahedra(cell_type: CellType) -> &'static [[usize; 4]] {
    match cell_type {
        CellType::Tetrahedra | CellType::QuadraticTetrahedra => &TET_PATTERN,
        CellType::Hexahedra | CellType::QuadraticHexahedra => &HEX_TO_TET_PATTERN,
        CellType::Prism => &PRISM_TO_TET_PATTERN,
        CellType::Pyramid => &PYRAMID_TO_TET_PATTERN,
    }
}

/// Triangles cut from a tetrahedron, as [`TET_EDGES`] indices, for a
/// configuration whose bit `i` is set when node `i` is below the isolevel.
/// Complementary configurations cut the same triangles.
fn tet_triangles(config: usize) -> &'static [[usize; 3]] {
    match config {
        1 | 14 => &[[0, 1, 2]],
        2 | 13 => &[[0, 3, 4]],
        4 | 11 => &[[1, 3, 5]],
        8 | 7 => &[[2, 4, 5]],
        3 | 12 => &[[1, 3, 4], [1, 4, 2]],
        5 | 10 => &[[0, 3, 5], [0, 5, 2]],
        9 | 6 => &[[0, 4, 5], [0, 5, 1]],
        _ => &[],
    }
}

/// Extracts the `isolevel` surface of a scalar unstructured volume.
///
/// Triangles are wound so that their normals point toward higher values.
pub(crate) fn extract(volume: &UnstructuredVolume, isolevel: f64) -> SurfaceMesh {
    let values = volume.field().values();
    let coords = volume.coords();
    let pattern = tetrahedra(volume.cell_type());

    let mut mesh = SurfaceMesh::default();
    let mut edge_vertices: HashMap<(u32, u32), u32> = HashMap::new();

    for cell in 0..volume.ncells() {
        let nodes = volume.cell_connections(cell);
        for local in pattern {
            let tet = local.map(|l| nodes[l]);
            let vs = tet.map(|n| values.get_f64(n as usize) - isolevel);

            let config = vs
                .iter()
                .enumerate()
                .fold(0_usize, |acc, (i, &v)| acc | (usize::from(v < 0.0) << i));
            let triangles = tet_triangles(config);
            if triangles.is_empty() {
                continue;
            }

            let up = uphill(&tet, &vs, coords);
            for triangle in triangles {
                let mut tri = triangle.map(|e| {
                    let (a, b) = TET_EDGES[e];
                    edge_vertex(&mut mesh, &mut edge_vertices, coords, (tet[a], vs[a]), (tet[b], vs[b]))
                });
                if SurfaceMesh::face_normal(&mesh.vertices, tri).dot(up) < 0.0 {
                    tri.swap(1, 2);
                }
                mesh.push_triangle(tri);
            }
        }
    }

    mesh.normalize();
    mesh
}

/// Direction from the nodes below the isolevel toward the nodes above it.
fn uphill(tet: &[u32; 4], vs: &[f64; 4], coords: &[Vec3]) -> Vec3 {
    let (mut below, mut above) = ((Vec3::ZERO, 0.0), (Vec3::ZERO, 0.0));
    for (&node, &v) in tet.iter().zip(vs) {
        let side = if v < 0.0 { &mut below } else { &mut above };
        side.0 += coords[node as usize];
        side.1 += 1.0;
    }
    above.0 / above.1 - below.0 / below.1
}

/// Returns the vertex on edge `a`-`b`, creating it on first use.
fn edge_vertex(
    mesh: &mut SurfaceMesh,
    cache: &mut HashMap<(u32, u32), u32>,
    coords: &[Vec3],
    a: (u32, f64),
    b: (u32, f64),
) -> u32 {
    // interpolate from the lower node so both neighbours compute the same point
    let (a, b) = if a.0 < b.0 { (a, b) } else { (b, a) };
    *cache
        .entry((a.0, b.0))
        .or_insert_with(|| mesh.push_vertex(coords[a.0 as usize].lerp(coords[b.0 as usize], crossing(a.1, b.1))))
}
