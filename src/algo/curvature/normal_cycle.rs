//! Normal-cycle curvature tensor.
//!
//! Every edge `e = p_u - p_i` leaving vertex `i` has a normal curvature
//! `κ = -2 (n·e) / |e|²` along its tangent direction `t`. The estimator
//! accumulates `area · κ · t tᵗ` over all incident (neighbor, face) pairs.

use nalgebra::{Matrix3, Vector3};

use super::{resolve, CurvatureDiagnostics, VertexCurvature};
use crate::math::{DirectionSampler, EPSILON, MAX_RETRIES};
use crate::mesh::{MeshIndex, MeshTopology, TriangleMesh, VertexId};

/// Perturbation length relative to the edge length.
const PERTURBATION: f64 = 1e-4;

/// Estimate the curvature of one vertex.
pub(super) fn estimate_vertex<I: MeshIndex>(
    mesh: &TriangleMesh<I>,
    topology: &MeshTopology<I>,
    v: VertexId<I>,
    seed: u64,
) -> VertexCurvature {
    let mut sampler = DirectionSampler::for_vertex(seed, v.index());
    let mut diagnostics = CurvatureDiagnostics::default();

    let n = *mesh.normal(v);
    let p = mesh.position(v);
    let projector = Matrix3::identity() - n * n.transpose();

    let mut tensor = Matrix3::zeros();
    let mut weight = 0.0;

    for inc in topology.incidence(v) {
        let area = topology.face_area(inc.face);
        let edge = mesh.position(inc.neighbor) - p;
        let len2 = edge.norm_squared();
        if area < EPSILON || len2.sqrt() < EPSILON {
            diagnostics.skipped_contributions += 1;
            continue;
        }

        let Some(t) = tangent_direction(&projector, &edge, &mut sampler) else {
            diagnostics.skipped_contributions += 1;
            continue;
        };

        let kappa = -2.0 * n.dot(&edge) / len2;
        tensor += (area * kappa) * (t * t.transpose());
        weight += area;
    }

    diagnostics.random_fallbacks += sampler.fallbacks();

    if weight < EPSILON {
        return VertexCurvature::unresolved(diagnostics);
    }
    tensor /= weight;

    match resolve::normal_cycle(&tensor, &n) {
        Some(principal) => VertexCurvature::resolved(principal, diagnostics),
        None => VertexCurvature::unresolved(diagnostics),
    }
}

/// Unit projection of `edge` onto the tangent plane.
///
/// An edge parallel to the normal is nudged by short random offsets; every
/// attempt counts as a fallback.
fn tangent_direction(
    projector: &Matrix3<f64>,
    edge: &Vector3<f64>,
    sampler: &mut DirectionSampler,
) -> Option<Vector3<f64>> {
    let t = projector * edge;
    let len = t.norm();
    if len >= EPSILON {
        return Some(t / len);
    }

    let radius = PERTURBATION * edge.norm();
    for _ in 0..MAX_RETRIES {
        sampler.record_fallback();
        let t = projector * (edge + sampler.unit_vector() * radius);
        let len = t.norm();
        if len >= EPSILON {
            return Some(t / len);
        }
    }
    None
}
