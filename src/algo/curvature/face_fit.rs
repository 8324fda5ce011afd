//! Per-face second fundamental form fit with transport to vertex frames.
//!
//! For a corner at vertex `A` of triangle `(A, B, C)` the face gets a local
//! frame `(ax, ay, az)` with `ay` the face normal. The three edges and the
//! three vertex-normal differences, projected onto `(ax, az)`, give six
//! equations for the form `[[L, M], [M, N]]`. The fitted form is rotated so
//! that `ay` lands on the vertex normal, re-expressed in the vertex tangent
//! frame and averaged with mixed-area weights.

use nalgebra::{Cholesky, Matrix2, Matrix3, Matrix6x3, Point3, Vector2, Vector3, Vector6};

use super::{resolve, CurvatureDiagnostics, SingularFitPolicy, VertexCurvature};
use crate::error::{MeshError, Result};
use crate::math::{normalize_or_random, rotation_between, DirectionSampler, EPSILON};
use crate::mesh::{Corner, MeshIndex, MeshTopology, TriangleMesh, VertexId};

/// Relative determinant below which the normal equations count as singular.
const CONDITION_THRESHOLD: f64 = 1e-12;

/// Orthonormal frame `{u, normal, v}` at a vertex.
#[derive(Debug, Clone, Copy)]
struct TangentFrame {
    u: Vector3<f64>,
    normal: Vector3<f64>,
    v: Vector3<f64>,
}

impl TangentFrame {
    fn new(normal: Vector3<f64>, sampler: &mut DirectionSampler) -> Self {
        let u = sampler.tangent_to(&normal);
        let v = normalize_or_random(&u.cross(&normal), sampler);
        Self { u, normal, v }
    }
}

/// Estimate the curvature of one vertex.
pub(super) fn estimate_vertex<I: MeshIndex>(
    mesh: &TriangleMesh<I>,
    topology: &MeshTopology<I>,
    v: VertexId<I>,
    seed: u64,
    policy: SingularFitPolicy,
) -> Result<VertexCurvature> {
    let mut sampler = DirectionSampler::for_vertex(seed, v.index());
    let mut diagnostics = CurvatureDiagnostics::default();
    let frame = TangentFrame::new(*mesh.normal(v), &mut sampler);

    let mut tensor = Matrix2::zeros();
    let mut weight = 0.0;

    for &corner in topology.corners(v) {
        let [a, b, c] = corner_vertices(mesh, corner);
        let positions = [a, b, c].map(|w| *mesh.position(w));

        let area = mixed_area(&positions, topology.face_area(corner.face));
        if area < EPSILON {
            diagnostics.skipped_contributions += 1;
            continue;
        }

        let normals = [a, b, c].map(|w| *mesh.normal(w));
        let Some(fit) = fit_corner(&positions, &normals) else {
            match policy {
                SingularFitPolicy::Skip => {
                    diagnostics.singular_fits += 1;
                    continue;
                }
                SingularFitPolicy::Fail => {
                    return Err(MeshError::IllConditionedFit {
                        face: corner.face.index(),
                        vertex: v.index(),
                    });
                }
            }
        };

        tensor += area * transport(&fit, &frame, &mut sampler);
        weight += area;
    }

    if weight < EPSILON {
        diagnostics.random_fallbacks += sampler.fallbacks();
        return Ok(VertexCurvature::unresolved(diagnostics));
    }
    tensor /= weight;

    let principal = resolve::face_fit(&tensor, &frame.u, &frame.v, &mut sampler);
    diagnostics.random_fallbacks += sampler.fallbacks();
    Ok(VertexCurvature::resolved(principal, diagnostics))
}

/// The triangle's vertices rotated so the corner's vertex comes first.
fn corner_vertices<I: MeshIndex>(mesh: &TriangleMesh<I>, corner: Corner<I>) -> [VertexId<I>; 3] {
    let tri = mesh.triangle(corner.face);
    let s = corner.slot as usize;
    [tri[s], tri[(s + 1) % 3], tri[(s + 2) % 3]]
}

/// Compute cotangent of angle at vertex a in triangle (a, b, c).
fn cotangent_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    let dot = ab.dot(&ac);
    let cross_norm = ab.cross(&ac).norm();
    if cross_norm < 1e-10 {
        0.0
    } else {
        dot / cross_norm
    }
}

/// Mixed area of the first corner of a triangle.
///
/// Circumcentric (Voronoi) share for non-obtuse triangles, a third of the
/// triangle area for obtuse or degenerate ones.
fn mixed_area(positions: &[Point3<f64>; 3], area: f64) -> f64 {
    let [a, b, c] = positions;
    let obtuse = (b - a).dot(&(c - a)) < 0.0
        || (a - b).dot(&(c - b)) < 0.0
        || (a - c).dot(&(b - c)) < 0.0;
    if area < EPSILON || obtuse {
        return area / 3.0;
    }

    // (1/8) * (|AC|² cot B + |AB|² cot C)
    let cot_b = cotangent_angle(b, a, c);
    let cot_c = cotangent_angle(c, a, b);
    0.125 * ((c - a).norm_squared() * cot_b + (b - a).norm_squared() * cot_c)
}

/// Fitted second fundamental form with the face frame it is expressed in.
#[derive(Debug, Clone, Copy)]
struct FaceForm {
    form: Matrix2<f64>,
    ax: Vector3<f64>,
    ay: Vector3<f64>,
    az: Vector3<f64>,
}

/// Least-squares fit of `[[L, M], [M, N]]` on one corner's face frame.
///
/// Returns `None` when the normal equations are singular.
fn fit_corner(positions: &[Point3<f64>; 3], normals: &[Vector3<f64>; 3]) -> Option<FaceForm> {
    let [a, b, c] = positions;
    let [na, nb, nc] = normals;

    let ax = (b - a).normalize();
    let ay = (b - a).cross(&(c - a)).normalize();
    let az = ax.cross(&ay).normalize();
    if !(ax.iter().chain(ay.iter()).chain(az.iter())).all(|x| x.is_finite()) {
        return None;
    }

    let edges = [c - b, c - a, b - a];
    let dnormals = [nc - nb, nc - na, nb - na];

    let mut system = Matrix6x3::zeros();
    let mut rhs = Vector6::zeros();
    for (k, (e, dn)) in edges.iter().zip(&dnormals).enumerate() {
        let (ex, ez) = (e.dot(&ax), e.dot(&az));
        system[(2 * k, 0)] = ex;
        system[(2 * k, 1)] = ez;
        system[(2 * k + 1, 1)] = ex;
        system[(2 * k + 1, 2)] = ez;
        rhs[2 * k] = dn.dot(&ax);
        rhs[2 * k + 1] = dn.dot(&az);
    }

    let normal_matrix: Matrix3<f64> = system.transpose() * system;
    let scale = normal_matrix.trace() / 3.0;
    if scale.is_nan() || scale <= 0.0 || normal_matrix.determinant() / scale.powi(3) < CONDITION_THRESHOLD {
        return None;
    }
    let lmn = Cholesky::new(normal_matrix)?.solve(&(system.transpose() * rhs));

    Some(FaceForm {
        form: Matrix2::new(lmn[0], lmn[1], lmn[1], lmn[2]),
        ax,
        ay,
        az,
    })
}

/// Re-express a face form in the vertex frame `(u, v)`.
fn transport(fit: &FaceForm, frame: &TangentFrame, sampler: &mut DirectionSampler) -> Matrix2<f64> {
    let rotation = rotation_between(&fit.ay, &frame.normal, sampler);
    let rax = rotation * fit.ax;
    let raz = rotation * fit.az;

    let a = Vector2::new(frame.u.dot(&rax), frame.u.dot(&raz));
    let b = Vector2::new(frame.v.dot(&rax), frame.v.dot(&raz));
    let s = &fit.form;

    let l = a.dot(&(s * a));
    let m = a.dot(&(s * b));
    let n = b.dot(&(s * b));
    Matrix2::new(l, m, m, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_area_equilateral() {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 3.0_f64.sqrt() / 2.0, 0.0),
        ];
        let area = 3.0_f64.sqrt() / 4.0;
        // All three corners share the area equally in an acute triangle.
        assert!((mixed_area(&positions, area) - area / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_mixed_area_right_triangle() {
        // Right angle at A: the circumcenter is the midpoint of BC.
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        assert!((mixed_area(&positions, 2.0) - 1.0).abs() < 1e-12);
        let at_b = [positions[1], positions[2], positions[0]];
        assert!((mixed_area(&at_b, 2.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_mixed_area_obtuse_uses_thirds() {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(2.0, 0.5, 0.0),
        ];
        assert!((mixed_area(&positions, 1.0) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_recovers_cylinder_form() {
        // Cylinder of radius 2 around the y axis; normals are radial in xz.
        let point = |theta: f64, y: f64| Point3::new(2.0 * theta.sin(), y, 2.0 * theta.cos());
        let normal = |theta: f64| Vector3::new(theta.sin(), 0.0, theta.cos());
        let positions = [point(0.0, 0.0), point(0.0, 0.1), point(0.1, 0.0)];
        let normals = [normal(0.0), normal(0.0), normal(0.1)];

        let fit = fit_corner(&positions, &normals).unwrap();
        // Principal curvatures of the fitted form: 0 along y, 1/2 around.
        let eig = crate::math::symmetric_eigen2(&fit.form);
        assert!(eig.values[0].abs() < 1e-9, "{:?}", eig.values);
        assert!((eig.values[1] - 0.5).abs() < 1e-9, "{:?}", eig.values);
    }

    #[test]
    fn test_fit_rejects_needle() {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1e-7, 0.0),
        ];
        let normals = [Vector3::z(); 3];
        assert!(fit_corner(&positions, &normals).is_none());
    }

    #[test]
    fn test_transport_identity_frame() {
        let mut sampler = DirectionSampler::new(0);
        let fit = FaceForm {
            form: Matrix2::new(1.0, 0.0, 0.0, 3.0),
            ax: Vector3::x(),
            ay: Vector3::z(),
            az: -Vector3::y(),
        };
        let frame = TangentFrame {
            u: Vector3::y(),
            normal: Vector3::z(),
            v: Vector3::x(),
        };
        let m = transport(&fit, &frame, &mut sampler);
        assert!((m - Matrix2::new(3.0, 0.0, 0.0, 1.0)).norm() < 1e-12);
        assert_eq!(sampler.fallbacks(), 0);
    }
}
