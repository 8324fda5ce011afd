//! Reference surfaces with known curvature.
//!
//! These generators produce consistently wound (outward facing) meshes used
//! by the tests, the benchmarks and the `crestline` experiments. Smooth
//! shapes carry their analytic normals; polyhedral ones use averaged normals.

use std::collections::HashMap;
use std::f64::consts::PI;

use nalgebra::{Point3, Vector3};

use super::index::MeshIndex;
use super::triangle::TriangleMesh;
use crate::error::{MeshError, Result};

/// A flat `n × n` grid of unit squares in the z = 0 plane, normals +z.
pub fn grid<I: MeshIndex>(n: usize) -> Result<TriangleMesh<I>> {
    if n == 0 {
        return Err(MeshError::invalid_param("n", n, "must be at least 1"));
    }
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(2 * n * n);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;
            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    TriangleMesh::new(vertices, faces)
}

/// Geodesic sphere: an icosahedron subdivided `subdivisions` times, with
/// vertices pushed onto the sphere of the given radius.
pub fn icosphere<I: MeshIndex>(radius: f64, subdivisions: usize) -> Result<TriangleMesh<I>> {
    if radius.is_nan() || radius <= 0.0 {
        return Err(MeshError::invalid_param("radius", radius, "must be positive"));
    }

    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let mut dirs: Vec<Vector3<f64>> = [
        (-1.0, phi, 0.0),
        (1.0, phi, 0.0),
        (-1.0, -phi, 0.0),
        (1.0, -phi, 0.0),
        (0.0, -1.0, phi),
        (0.0, 1.0, phi),
        (0.0, -1.0, -phi),
        (0.0, 1.0, -phi),
        (phi, 0.0, -1.0),
        (phi, 0.0, 1.0),
        (-phi, 0.0, -1.0),
        (-phi, 0.0, 1.0),
    ]
    .iter()
    .map(|&(x, y, z)| Vector3::new(x, y, z).normalize())
    .collect();

    let mut faces: Vec<[usize; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
        let mut next_faces = Vec::with_capacity(faces.len() * 4);

        for face in &faces {
            let mut mids = [0usize; 3];
            for k in 0..3 {
                let (a, b) = (face[k], face[(k + 1) % 3]);
                let key = (a.min(b), a.max(b));
                mids[k] = *midpoints.entry(key).or_insert_with(|| {
                    let mid = (dirs[a] + dirs[b]).normalize();
                    dirs.push(mid);
                    dirs.len() - 1
                });
            }
            next_faces.push([face[0], mids[0], mids[2]]);
            next_faces.push([face[1], mids[1], mids[0]]);
            next_faces.push([face[2], mids[2], mids[1]]);
            next_faces.push([mids[0], mids[1], mids[2]]);
        }
        faces = next_faces;
    }

    let positions = dirs.iter().map(|d| Point3::from(d * radius)).collect();
    TriangleMesh::with_normals(positions, faces, dirs)
}

/// Torus around the z axis.
///
/// `radial` samples run around the central circle (angle u), `tubular`
/// samples around the tube (angle v). A point is
/// `((R + r cos v) cos u, (R + r cos v) sin u, r sin v)`.
pub fn torus<I: MeshIndex>(
    major: f64,
    minor: f64,
    radial: usize,
    tubular: usize,
) -> Result<TriangleMesh<I>> {
    if minor.is_nan() || minor <= 0.0 || major.is_nan() || major <= minor {
        return Err(MeshError::invalid_param(
            "minor",
            minor,
            "need 0 < minor < major",
        ));
    }
    if radial < 3 || tubular < 3 {
        return Err(MeshError::invalid_param(
            "resolution",
            format!("{}x{}", radial, tubular),
            "need at least 3 samples per direction",
        ));
    }

    let mut positions = Vec::with_capacity(radial * tubular);
    let mut normals = Vec::with_capacity(radial * tubular);
    for i in 0..radial {
        let u = 2.0 * PI * i as f64 / radial as f64;
        for j in 0..tubular {
            let v = 2.0 * PI * j as f64 / tubular as f64;
            let ring = major + minor * v.cos();
            positions.push(Point3::new(ring * u.cos(), ring * u.sin(), minor * v.sin()));
            normals.push(Vector3::new(v.cos() * u.cos(), v.cos() * u.sin(), v.sin()));
        }
    }

    let index = |i: usize, j: usize| (i % radial) * tubular + (j % tubular);
    let mut faces = Vec::with_capacity(2 * radial * tubular);
    for i in 0..radial {
        for j in 0..tubular {
            let v00 = index(i, j);
            let v10 = index(i + 1, j);
            let v11 = index(i + 1, j + 1);
            let v01 = index(i, j + 1);
            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    TriangleMesh::with_normals(positions, faces, normals)
}

/// Cosine of the tube angle v of a point on the torus.
fn torus_cos_v(major: f64, minor: f64, p: &Point3<f64>) -> f64 {
    ((p.x.hypot(p.y) - major) / minor).clamp(-1.0, 1.0)
}

/// Exact Gaussian curvature `cos v / (r (R + r cos v))` at a torus point.
pub fn torus_gaussian_curvature(major: f64, minor: f64, p: &Point3<f64>) -> f64 {
    let c = torus_cos_v(major, minor, p);
    c / (minor * (major + minor * c))
}

/// Exact mean curvature `(R + 2 r cos v) / (2 r (R + r cos v))` at a torus point.
pub fn torus_mean_curvature(major: f64, minor: f64, p: &Point3<f64>) -> f64 {
    let c = torus_cos_v(major, minor, p);
    (major + 2.0 * minor * c) / (2.0 * minor * (major + minor * c))
}

/// Square pyramid with apex (0, 0, 1) over the base square with corners on
/// the axes, closed by two base triangles. Five vertices, six faces.
pub fn bipyramid<I: MeshIndex>() -> Result<TriangleMesh<I>> {
    let vertices = vec![
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(0.0, -1.0, 0.0),
    ];
    let faces = vec![
        [0, 1, 2],
        [0, 2, 3],
        [0, 3, 4],
        [0, 4, 1],
        [1, 3, 2],
        [1, 4, 3],
    ];
    TriangleMesh::new(vertices, faces)
}
