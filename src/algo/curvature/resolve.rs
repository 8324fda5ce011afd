//! Turning accumulated tensors into principal pairs.

use nalgebra::{Matrix2, Matrix3, Vector3};

use super::Principal;
use crate::math::{normalize_or_random, symmetric_eigen2, symmetric_eigen3, DirectionSampler};

/// Maximum |(v·n)² − 1| for an eigenvector to count as the normal.
const NORMAL_TOLERANCE: f64 = 0.1;

/// Resolve a normal-cycle tensor at a vertex with unit normal `normal`.
///
/// Returns `None` unless exactly one eigenvector is normal-like.
pub(super) fn normal_cycle(tensor: &Matrix3<f64>, normal: &Vector3<f64>) -> Option<Principal> {
    let eig = symmetric_eigen3(tensor);

    let mut normal_like = 0;
    let mut tangent = Vec::with_capacity(2);
    for k in 0..3 {
        let d = eig.vectors[k].dot(normal);
        if (d * d - 1.0).abs() < NORMAL_TOLERANCE {
            normal_like += 1;
        } else {
            tangent.push((eig.values[k], eig.vectors[k]));
        }
    }
    if normal_like != 1 {
        return None;
    }

    let trace = tensor.trace();
    let (a, b) = (tangent[0], tangent[1]);
    // Eigenvalues are ascending, so (a, b) is already the fallback order.
    let (min, max) = match (2.0 * a.0 < trace, 2.0 * b.0 < trace) {
        (false, true) => (b, a),
        _ => (a, b),
    };

    Some(Principal {
        min_direction: min.1,
        max_direction: max.1,
        min_curvature: 4.0 * min.0 - trace,
        max_curvature: 4.0 * max.0 - trace,
    })
}

/// Resolve a 2×2 tensor expressed in the tangent basis `(u, v)`.
pub(super) fn face_fit(
    tensor: &Matrix2<f64>,
    u: &Vector3<f64>,
    v: &Vector3<f64>,
    sampler: &mut DirectionSampler,
) -> Principal {
    let eig = symmetric_eigen2(tensor);
    let [e_min, e_max] = eig.vectors;
    Principal {
        min_direction: normalize_or_random(&(u * e_min.x + v * e_min.y), sampler),
        max_direction: normalize_or_random(&(u * e_max.x + v * e_max.y), sampler),
        min_curvature: eig.values[0],
        max_curvature: eig.values[1],
    }
}
