//! Vector and small-matrix primitives used by the curvature estimators.
//!
//! Everything here tolerates degenerate input. Instead of producing NaNs from
//! zero-length vectors, [`normalize_or_random`] substitutes a random unit
//! vector drawn from a seeded [`DirectionSampler`], and the sampler counts how
//! often that happened.

use std::f64::consts::PI;

use nalgebra::{Matrix2, Matrix3, Rotation3, SymmetricEigen, Unit, Vector2, Vector3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Length below which a vector (or an area) is treated as degenerate.
pub const EPSILON: f64 = 1e-8;

/// Cap on randomized retries (tangent picks, edge perturbations).
pub const MAX_RETRIES: usize = 10;

/// Iteration cap for the symmetric eigen solver.
const MAX_EIGEN_ITERATIONS: usize = 256;

/// Seeded source of random unit directions.
///
/// One sampler is created per vertex from the run seed and the vertex index,
/// so a vertex draws the same sequence no matter which thread processes it.
#[derive(Debug, Clone)]
pub struct DirectionSampler {
    rng: SmallRng,
    fallbacks: usize,
}

impl DirectionSampler {
    /// Create a sampler from a raw seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            fallbacks: 0,
        }
    }

    /// Create the sampler owned by vertex `vertex` for a run seeded with `seed`.
    pub fn for_vertex(seed: u64, vertex: usize) -> Self {
        let mixed = (vertex as u64)
            .wrapping_add(1)
            .wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self::new(seed ^ mixed)
    }

    /// Draw a uniformly distributed unit vector.
    ///
    /// Uses the cylinder projection (uniform z, uniform azimuth), so no
    /// rejection loop is involved.
    pub fn unit_vector(&mut self) -> Vector3<f64> {
        let z: f64 = self.rng.gen_range(-1.0..=1.0);
        let phi: f64 = self.rng.gen_range(0.0..2.0 * PI);
        let rho = (1.0 - z * z).max(0.0).sqrt();
        Vector3::new(rho * phi.cos(), rho * phi.sin(), z)
    }

    /// Draw a random unit vector orthogonal to the unit vector `normal`.
    ///
    /// Candidates closer than 30 degrees to `normal` (|c × n| < 0.5) are
    /// redrawn, at most [`MAX_RETRIES`] times; after that the coordinate axis
    /// least aligned with `normal` is used.
    pub fn tangent_to(&mut self, normal: &Vector3<f64>) -> Vector3<f64> {
        let mut candidate = None;
        for _ in 0..MAX_RETRIES {
            let c = self.unit_vector();
            if c.cross(normal).norm() >= 0.5 {
                candidate = Some(c);
                break;
            }
        }
        let c = candidate.unwrap_or_else(|| least_aligned_axis(normal));
        let projected = c - normal * c.dot(normal);
        normalize_or_random(&projected, self)
    }

    /// Number of degenerate-input fallbacks served so far.
    #[inline]
    pub fn fallbacks(&self) -> usize {
        self.fallbacks
    }

    #[inline]
    pub(crate) fn record_fallback(&mut self) {
        self.fallbacks += 1;
    }
}

/// The coordinate axis with the smallest absolute component in `v`.
fn least_aligned_axis(v: &Vector3<f64>) -> Vector3<f64> {
    let (ax, ay, az) = (v.x.abs(), v.y.abs(), v.z.abs());
    if ax <= ay && ax <= az {
        Vector3::x()
    } else if ay <= az {
        Vector3::y()
    } else {
        Vector3::z()
    }
}

/// Normalize `v`, or return a random unit vector if `|v| < EPSILON`.
///
/// The fallback is counted on `sampler`.
pub fn normalize_or_random(v: &Vector3<f64>, sampler: &mut DirectionSampler) -> Vector3<f64> {
    let len = v.norm();
    if len < EPSILON || !len.is_finite() {
        sampler.record_fallback();
        sampler.unit_vector()
    } else {
        v / len
    }
}

/// Eigen-decomposition of a symmetric 2×2 matrix, eigenvalues ascending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eigen2 {
    /// Eigenvalues in ascending order.
    pub values: [f64; 2],
    /// Unit eigenvectors matching `values`.
    pub vectors: [Vector2<f64>; 2],
}

/// Eigen-decomposition of a symmetric 3×3 matrix, eigenvalues ascending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eigen3 {
    /// Eigenvalues in ascending order.
    pub values: [f64; 3],
    /// Unit eigenvectors matching `values`.
    pub vectors: [Vector3<f64>; 3],
}

/// Decompose a symmetric 2×2 matrix.
///
/// The zero matrix (and any matrix the solver cannot handle) yields its
/// diagonal as eigenvalues with the canonical basis.
pub fn symmetric_eigen2(m: &Matrix2<f64>) -> Eigen2 {
    let fallback = Eigen2 {
        values: [m[(0, 0)], m[(1, 1)]],
        vectors: [Vector2::x(), Vector2::y()],
    };
    if m.iter().all(|&x| x == 0.0) || !m.iter().all(|x| x.is_finite()) {
        return sorted2(fallback);
    }
    match SymmetricEigen::try_new(*m, f64::EPSILON, MAX_EIGEN_ITERATIONS) {
        Some(eig) => sorted2(Eigen2 {
            values: [eig.eigenvalues[0], eig.eigenvalues[1]],
            vectors: [
                eig.eigenvectors.column(0).normalize(),
                eig.eigenvectors.column(1).normalize(),
            ],
        }),
        None => sorted2(fallback),
    }
}

/// Decompose a symmetric 3×3 matrix.
///
/// Both curvature tensors are symmetric by construction, so this is the
/// 3×3 solver the normal-cycle estimator relies on. The zero matrix yields
/// zero eigenvalues with the canonical basis.
pub fn symmetric_eigen3(m: &Matrix3<f64>) -> Eigen3 {
    let fallback = Eigen3 {
        values: [m[(0, 0)], m[(1, 1)], m[(2, 2)]],
        vectors: [Vector3::x(), Vector3::y(), Vector3::z()],
    };
    if m.iter().all(|&x| x == 0.0) || !m.iter().all(|x| x.is_finite()) {
        return sorted3(fallback);
    }
    match SymmetricEigen::try_new(*m, f64::EPSILON, MAX_EIGEN_ITERATIONS) {
        Some(eig) => sorted3(Eigen3 {
            values: [eig.eigenvalues[0], eig.eigenvalues[1], eig.eigenvalues[2]],
            vectors: [
                eig.eigenvectors.column(0).normalize(),
                eig.eigenvectors.column(1).normalize(),
                eig.eigenvectors.column(2).normalize(),
            ],
        }),
        None => sorted3(fallback),
    }
}

fn sorted2(e: Eigen2) -> Eigen2 {
    if e.values[1] < e.values[0] {
        Eigen2 {
            values: [e.values[1], e.values[0]],
            vectors: [e.vectors[1], e.vectors[0]],
        }
    } else {
        e
    }
}

fn sorted3(e: Eigen3) -> Eigen3 {
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| e.values[a].total_cmp(&e.values[b]));
    Eigen3 {
        values: order.map(|i| e.values[i]),
        vectors: order.map(|i| e.vectors[i]),
    }
}

/// Rotation by `angle` radians about `axis` (normalized internally).
pub fn axis_angle(axis: &Vector3<f64>, angle: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle)
}

/// Minimal rotation taking unit vector `from` onto unit vector `to`.
///
/// The angle is `acos(clamp(from·to, -1, 1))` so rounding overshoot cannot
/// produce NaN. For (anti)parallel inputs the cross product vanishes: parallel
/// vectors give the identity, antiparallel ones rotate by π about a random
/// tangent of `from` (counted as a fallback).
pub fn rotation_between(
    from: &Vector3<f64>,
    to: &Vector3<f64>,
    sampler: &mut DirectionSampler,
) -> Rotation3<f64> {
    let angle = from.dot(to).clamp(-1.0, 1.0).acos();
    let cross = from.cross(to);
    let len = cross.norm();
    if len >= EPSILON {
        return axis_angle(&(cross / len), angle);
    }
    if angle < PI / 2.0 {
        return Rotation3::identity();
    }
    sampler.record_fallback();
    let axis = sampler.tangent_to(from);
    axis_angle(&axis, angle)
}
