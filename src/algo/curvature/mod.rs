//! Principal curvature directions and magnitudes on triangle meshes.
//!
//! Two independent estimators are provided, selected with
//! [`CurvatureMethod`]:
//!
//! - **Normal cycle** ([`CurvatureMethod::NormalCycle`]): every edge leaving
//!   a vertex contributes its normal curvature `2 n·e / |e|²` along its
//!   tangent direction to a 3×3 tensor. The eigenvector closest to the
//!   normal is discarded and the other two give the principal directions.
//! - **Face fit** ([`CurvatureMethod::FaceFit`]): each triangle gets a
//!   least-squares second fundamental form from its edges and normal
//!   differences. The form is rotated into each corner's tangent frame and
//!   averaged with mixed (Voronoi) area weights. The 2×2 result is
//!   diagonalized directly in the tangent plane.
//!
//! Both report positive curvature on convex surfaces with outward normals.
//!
//! # Example
//!
//! ```
//! use crestline::algo::curvature::{principal_curvature, CurvatureMethod, CurvatureOptions};
//! use crestline::mesh::{shapes, TriangleMesh, VertexId};
//!
//! let mesh: TriangleMesh = shapes::icosphere(1.0, 2).unwrap();
//! let options = CurvatureOptions::default().with_method(CurvatureMethod::FaceFit);
//! let record = principal_curvature(&mesh, &options).unwrap();
//!
//! let v = VertexId::new(0);
//! let (k1, k2) = record.principal(v);
//! assert!((k1 - 1.0).abs() < 1e-6 && (k2 - 1.0).abs() < 1e-6);
//! ```
//!
//! # Degenerate input
//!
//! Zero-area faces, coincident vertices and edges parallel to the normal are
//! skipped or perturbed with a seeded random direction. A vertex left
//! without a usable tensor is marked [`VertexStatus::Unresolved`] and gets
//! zero directions and zero curvature. Everything recovered this way is
//! counted in [`CurvatureDiagnostics`].
//!
//! # References
//!
//! - Taubin, G. (1995). "Estimating the Tensor of Curvature of a Surface from
//!   a Polyhedral Approximation." ICCV.
//! - Rusinkiewicz, S. (2004). "Estimating Curvatures and Their Derivatives on
//!   Triangle Meshes." 3DPVT.
//! - Meyer, M., et al. (2003). "Discrete Differential-Geometry Operators for
//!   Triangulated 2-Manifolds." Visualization and Mathematics III.

mod face_fit;
mod normal_cycle;
mod resolve;

use std::f64::consts::PI;
use std::marker::PhantomData;
use std::ops::AddAssign;

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::error::Result;
use crate::mesh::{MeshIndex, MeshTopology, TriangleMesh, VertexId};

/// Which estimator to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CurvatureMethod {
    /// Edge-wise normal curvature accumulated into a 3×3 tensor.
    #[default]
    NormalCycle,
    /// Per-face second fundamental form fit, transported to vertex frames.
    FaceFit,
}

impl CurvatureMethod {
    /// Short human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            CurvatureMethod::NormalCycle => "normal-cycle",
            CurvatureMethod::FaceFit => "face-fit",
        }
    }
}

/// What the face-fit estimator does with a singular least-squares system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SingularFitPolicy {
    /// Drop that face's contribution and count it in the diagnostics.
    #[default]
    Skip,
    /// Abort with [`MeshError::IllConditionedFit`](crate::error::MeshError::IllConditionedFit).
    Fail,
}

/// Options for curvature estimation.
#[derive(Debug, Clone)]
pub struct CurvatureOptions {
    /// Estimator to run.
    pub method: CurvatureMethod,

    /// Seed for the random fallback directions and tangent frames.
    /// Equal seeds give bit-identical results.
    pub seed: u64,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,

    /// Handling of singular per-face fits (face-fit only).
    pub singular_fit: SingularFitPolicy,
}

impl Default for CurvatureOptions {
    fn default() -> Self {
        Self {
            method: CurvatureMethod::NormalCycle,
            seed: 0,
            parallel: true,
            singular_fit: SingularFitPolicy::Skip,
        }
    }
}

impl CurvatureOptions {
    /// Select the estimator.
    pub fn with_method(mut self, method: CurvatureMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the fallback seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the singular-fit policy.
    pub fn with_singular_fit(mut self, policy: SingularFitPolicy) -> Self {
        self.singular_fit = policy;
        self
    }
}

/// Counts of locally recovered anomalies. Advisory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurvatureDiagnostics {
    /// Contributions dropped for zero area, coincident endpoints or a
    /// vanishing tangent projection.
    pub skipped_contributions: usize,
    /// Random directions substituted for degenerate vectors.
    pub random_fallbacks: usize,
    /// Face fits dropped because the normal equations were singular.
    pub singular_fits: usize,
    /// Vertices left with sentinel output.
    pub unresolved_vertices: usize,
}

impl AddAssign for CurvatureDiagnostics {
    fn add_assign(&mut self, rhs: Self) {
        self.skipped_contributions += rhs.skipped_contributions;
        self.random_fallbacks += rhs.random_fallbacks;
        self.singular_fits += rhs.singular_fits;
        self.unresolved_vertices += rhs.unresolved_vertices;
    }
}

/// Whether a vertex got a usable curvature estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexStatus {
    /// Directions and magnitudes are estimates.
    Resolved,
    /// No usable tensor (no weight, or the normal direction could not be
    /// singled out). Directions are zero and magnitudes are 0.
    Unresolved,
}

/// Principal pair of one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Principal {
    min_direction: Vector3<f64>,
    max_direction: Vector3<f64>,
    min_curvature: f64,
    max_curvature: f64,
}

impl Principal {
    fn sentinel() -> Self {
        Self {
            min_direction: Vector3::zeros(),
            max_direction: Vector3::zeros(),
            min_curvature: 0.0,
            max_curvature: 0.0,
        }
    }
}

/// Everything one estimator produces for one vertex.
#[derive(Debug, Clone, Copy)]
struct VertexCurvature {
    principal: Principal,
    status: VertexStatus,
    diagnostics: CurvatureDiagnostics,
}

impl VertexCurvature {
    fn resolved(principal: Principal, diagnostics: CurvatureDiagnostics) -> Self {
        Self {
            principal,
            status: VertexStatus::Resolved,
            diagnostics,
        }
    }

    fn unresolved(mut diagnostics: CurvatureDiagnostics) -> Self {
        diagnostics.unresolved_vertices += 1;
        Self {
            principal: Principal::sentinel(),
            status: VertexStatus::Unresolved,
            diagnostics,
        }
    }
}

/// Per-vertex principal curvature output.
///
/// The record always covers every vertex; unresolved vertices hold zero
/// directions and zero curvature.
#[derive(Debug, Clone)]
pub struct CurvatureRecord<I: MeshIndex = u32> {
    method: CurvatureMethod,
    min_direction: Vec<Vector3<f64>>,
    max_direction: Vec<Vector3<f64>>,
    min_curvature: Vec<f64>,
    max_curvature: Vec<f64>,
    status: Vec<VertexStatus>,
    confidence: Vec<Option<f64>>,
    diagnostics: CurvatureDiagnostics,
    _marker: PhantomData<I>,
}

impl<I: MeshIndex> CurvatureRecord<I> {
    /// The estimator that produced this record.
    #[inline]
    pub fn method(&self) -> CurvatureMethod {
        self.method
    }

    /// Unit direction of minimum curvature (zero if unresolved).
    #[inline]
    pub fn min_direction(&self, v: VertexId<I>) -> &Vector3<f64> {
        &self.min_direction[v.index()]
    }

    /// Unit direction of maximum curvature (zero if unresolved).
    #[inline]
    pub fn max_direction(&self, v: VertexId<I>) -> &Vector3<f64> {
        &self.max_direction[v.index()]
    }

    /// Minimum principal curvature.
    #[inline]
    pub fn min_curvature(&self, v: VertexId<I>) -> f64 {
        self.min_curvature[v.index()]
    }

    /// Maximum principal curvature.
    #[inline]
    pub fn max_curvature(&self, v: VertexId<I>) -> f64 {
        self.max_curvature[v.index()]
    }

    /// Get principal curvatures at a vertex.
    ///
    /// Returns (k1, k2) where k1 >= k2.
    #[inline]
    pub fn principal(&self, v: VertexId<I>) -> (f64, f64) {
        (self.max_curvature[v.index()], self.min_curvature[v.index()])
    }

    /// Gaussian curvature `k1 * k2`.
    #[inline]
    pub fn gaussian(&self, v: VertexId<I>) -> f64 {
        self.min_curvature[v.index()] * self.max_curvature[v.index()]
    }

    /// Mean curvature `(k1 + k2) / 2`.
    #[inline]
    pub fn mean(&self, v: VertexId<I>) -> f64 {
        0.5 * (self.min_curvature[v.index()] + self.max_curvature[v.index()])
    }

    /// Compute shape index at a vertex.
    ///
    /// Shape index is a scale-invariant measure: (2/π) * atan((k1+k2)/(k1-k2))
    /// Range: [-1, 1], where -1 = cup, 0 = saddle, 1 = cap.
    /// Umbilics are caps or cups by the sign of `k1 + k2`; planar points give 0.
    pub fn shape_index(&self, v: VertexId<I>) -> f64 {
        let (k1, k2) = self.principal(v);
        let diff = k1 - k2;
        let sum = k1 + k2;
        if diff.abs() < 1e-10 {
            if sum.abs() < 1e-10 {
                0.0
            } else {
                sum.signum()
            }
        } else {
            (2.0 / PI) * ((k1 + k2) / diff).atan()
        }
    }

    /// Curvedness `sqrt((k1² + k2²) / 2)`.
    pub fn curvedness(&self, v: VertexId<I>) -> f64 {
        let (k1, k2) = self.principal(v);
        ((k1 * k1 + k2 * k2) / 2.0).sqrt()
    }

    /// Resolution status of a vertex.
    #[inline]
    pub fn status(&self, v: VertexId<I>) -> VertexStatus {
        self.status[v.index()]
    }

    /// Whether the vertex got a real estimate.
    #[inline]
    pub fn is_resolved(&self, v: VertexId<I>) -> bool {
        self.status[v.index()] == VertexStatus::Resolved
    }

    /// Reserved per-vertex confidence. Neither estimator fills it yet, so
    /// this is always `None`.
    #[inline]
    pub fn confidence(&self, v: VertexId<I>) -> Option<f64> {
        self.confidence[v.index()]
    }

    /// All minimum-curvature directions.
    #[inline]
    pub fn min_directions(&self) -> &[Vector3<f64>] {
        &self.min_direction
    }

    /// All maximum-curvature directions.
    #[inline]
    pub fn max_directions(&self) -> &[Vector3<f64>] {
        &self.max_direction
    }

    /// All minimum curvatures.
    #[inline]
    pub fn min_curvatures(&self) -> &[f64] {
        &self.min_curvature
    }

    /// All maximum curvatures.
    #[inline]
    pub fn max_curvatures(&self) -> &[f64] {
        &self.max_curvature
    }

    /// Gaussian curvature of every vertex.
    pub fn gaussian_values(&self) -> Vec<f64> {
        self.min_curvature
            .iter()
            .zip(&self.max_curvature)
            .map(|(a, b)| a * b)
            .collect()
    }

    /// Mean curvature of every vertex.
    pub fn mean_values(&self) -> Vec<f64> {
        self.min_curvature
            .iter()
            .zip(&self.max_curvature)
            .map(|(a, b)| 0.5 * (a + b))
            .collect()
    }

    /// Aggregate anomaly counts for the run.
    #[inline]
    pub fn diagnostics(&self) -> &CurvatureDiagnostics {
        &self.diagnostics
    }

    /// Get the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.status.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
    }
}

/// Estimate principal curvature for every vertex.
///
/// Builds the mesh topology and runs the estimator chosen in `options`.
/// Only [`SingularFitPolicy::Fail`] can make this return an error.
pub fn principal_curvature<I: MeshIndex>(
    mesh: &TriangleMesh<I>,
    options: &CurvatureOptions,
) -> Result<CurvatureRecord<I>> {
    let topology = MeshTopology::build(mesh);
    principal_curvature_with_topology(mesh, &topology, options)
}

/// Run both estimators on one shared topology.
///
/// Returns `(normal_cycle, face_fit)`; `options.method` is ignored.
pub fn principal_curvature_both<I: MeshIndex>(
    mesh: &TriangleMesh<I>,
    options: &CurvatureOptions,
) -> Result<(CurvatureRecord<I>, CurvatureRecord<I>)> {
    let topology = MeshTopology::build(mesh);
    let normal_cycle = principal_curvature_with_topology(
        mesh,
        &topology,
        &options.clone().with_method(CurvatureMethod::NormalCycle),
    )?;
    let face_fit = principal_curvature_with_topology(
        mesh,
        &topology,
        &options.clone().with_method(CurvatureMethod::FaceFit),
    )?;
    Ok((normal_cycle, face_fit))
}

/// Estimate principal curvature with a prebuilt topology.
///
/// `topology` must have been built from `mesh`.
pub fn principal_curvature_with_topology<I: MeshIndex>(
    mesh: &TriangleMesh<I>,
    topology: &MeshTopology<I>,
    options: &CurvatureOptions,
) -> Result<CurvatureRecord<I>> {
    debug_assert_eq!(topology.num_vertices(), mesh.num_vertices());
    debug_assert_eq!(topology.num_faces(), mesh.num_faces());

    let n = mesh.num_vertices();
    let vertex_indices: Vec<usize> = (0..n).collect();

    let compute_vertex = |idx: usize| -> Result<VertexCurvature> {
        let v = VertexId::<I>::new(idx);
        match options.method {
            CurvatureMethod::NormalCycle => {
                Ok(normal_cycle::estimate_vertex(mesh, topology, v, options.seed))
            }
            CurvatureMethod::FaceFit => face_fit::estimate_vertex(
                mesh,
                topology,
                v,
                options.seed,
                options.singular_fit,
            ),
        }
    };

    // Each vertex reads only its own incidence lists, so the map order does
    // not change any result.
    let results: Vec<VertexCurvature> = if options.parallel {
        vertex_indices
            .par_iter()
            .map(|&idx| compute_vertex(idx))
            .collect::<Result<_>>()?
    } else {
        vertex_indices
            .iter()
            .map(|&idx| compute_vertex(idx))
            .collect::<Result<_>>()?
    };

    let mut min_direction = Vec::with_capacity(n);
    let mut max_direction = Vec::with_capacity(n);
    let mut min_curvature = Vec::with_capacity(n);
    let mut max_curvature = Vec::with_capacity(n);
    let mut status = Vec::with_capacity(n);
    let mut diagnostics = CurvatureDiagnostics::default();

    for vc in results {
        min_direction.push(vc.principal.min_direction);
        max_direction.push(vc.principal.max_direction);
        min_curvature.push(vc.principal.min_curvature);
        max_curvature.push(vc.principal.max_curvature);
        status.push(vc.status);
        diagnostics += vc.diagnostics;
    }

    log::debug!(
        "{} curvature on {} vertices: {:?}",
        options.method.name(),
        n,
        diagnostics
    );
    if diagnostics.unresolved_vertices > 0 {
        log::warn!(
            "{} of {} vertices unresolved by {} estimator",
            diagnostics.unresolved_vertices,
            n,
            options.method.name()
        );
    }
    if diagnostics.singular_fits > 0 {
        log::warn!("skipped {} singular face fits", diagnostics.singular_fits);
    }

    Ok(CurvatureRecord {
        method: options.method,
        min_direction,
        max_direction,
        min_curvature,
        max_curvature,
        status,
        confidence: vec![None; n],
        diagnostics,
        _marker: PhantomData,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshError;
    use crate::mesh::shapes;
    use nalgebra::Point3;

    const METHODS: [CurvatureMethod; 2] = [CurvatureMethod::NormalCycle, CurvatureMethod::FaceFit];

    fn estimate(mesh: &TriangleMesh, method: CurvatureMethod) -> CurvatureRecord {
        principal_curvature(mesh, &CurvatureOptions::default().with_method(method)).unwrap()
    }

    /// Icosphere with normals recomputed by face averaging.
    fn averaged_icosphere(radius: f64, subdivisions: usize) -> TriangleMesh {
        let sphere: TriangleMesh = shapes::icosphere(radius, subdivisions).unwrap();
        TriangleMesh::new(sphere.positions().to_vec(), sphere.triangles().to_vec()).unwrap()
    }

    fn assert_directions_tangent(mesh: &TriangleMesh, record: &CurvatureRecord) {
        for v in mesh.vertex_ids() {
            if !record.is_resolved(v) {
                continue;
            }
            let n = mesh.normal(v);
            for d in [record.min_direction(v), record.max_direction(v)] {
                assert!((d.norm() - 1.0).abs() < 1e-3, "{:?}: |d| = {}", v, d.norm());
                assert!(d.dot(n).abs() < 1e-3, "{:?}: d·n = {}", v, d.dot(n));
            }
        }
    }

    #[test]
    fn test_flat_plane_has_zero_curvature() {
        let mesh: TriangleMesh = shapes::grid(4).unwrap();
        for method in METHODS {
            let record = estimate(&mesh, method);
            // Interior vertices of a 5x5 vertex grid.
            for j in 1..4 {
                for i in 1..4 {
                    let v = VertexId::new(j * 5 + i);
                    assert!(
                        record.min_curvature(v).abs() < 1e-9 && record.max_curvature(v).abs() < 1e-9,
                        "{}: {:?} has curvature {:?}",
                        method.name(),
                        v,
                        record.principal(v)
                    );
                }
            }
        }
    }

    #[test]
    fn test_directions_are_unit_tangents() {
        let sphere = averaged_icosphere(1.0, 2);
        for method in METHODS {
            let record = estimate(&sphere, method);
            assert_eq!(record.diagnostics().unresolved_vertices, 0);
            assert_directions_tangent(&sphere, &record);
        }

        let torus: TriangleMesh = shapes::torus(1.0, 0.4, 36, 18).unwrap();
        let record = estimate(&torus, CurvatureMethod::FaceFit);
        assert_directions_tangent(&torus, &record);
    }

    #[test]
    fn test_face_fit_exact_on_sphere() {
        // With analytic normals the normal differences are exactly e / r.
        let radius = 2.0;
        let mesh: TriangleMesh = shapes::icosphere(radius, 2).unwrap();
        let record = estimate(&mesh, CurvatureMethod::FaceFit);
        for v in mesh.vertex_ids() {
            let (k1, k2) = record.principal(v);
            assert!((k1 - 0.5).abs() < 1e-6, "k1 = {}", k1);
            assert!((k2 - 0.5).abs() < 1e-6, "k2 = {}", k2);
        }
    }

    /// Mean of |k - 1/r| over both principal curvatures of every vertex.
    fn mean_sphere_error(mesh: &TriangleMesh, record: &CurvatureRecord, radius: f64) -> f64 {
        let total: f64 = mesh
            .vertex_ids()
            .map(|v| {
                let (k1, k2) = record.principal(v);
                (k1 - 1.0 / radius).abs() + (k2 - 1.0 / radius).abs()
            })
            .sum();
        total / (2.0 * mesh.num_vertices() as f64)
    }

    #[test]
    fn test_face_fit_converges_on_sphere() {
        // Level 1 is exact by symmetry and level 3 sits slightly above
        // level 2, so the monotone stretch starts at level 3.
        let errors: Vec<f64> = (2..=5)
            .map(|subdivisions| {
                let mesh = averaged_icosphere(1.0, subdivisions);
                let record = estimate(&mesh, CurvatureMethod::FaceFit);
                mean_sphere_error(&mesh, &record, 1.0)
            })
            .collect();

        assert!(errors[2] < errors[0], "errors {:?}", errors);
        assert!(errors[2] < errors[1], "errors {:?}", errors);
        assert!(errors[3] < errors[2], "errors {:?}", errors);
        assert!(errors[3] < 0.02, "errors {:?}", errors);
    }

    #[test]
    fn test_normal_cycle_split_is_bounded() {
        // The area-weighted edge fan keeps the trace exact at every level,
        // but uneven edge directions bias the k1/k2 split and refinement
        // does not remove that bias.
        for subdivisions in 1..=4 {
            let mesh: TriangleMesh = shapes::icosphere(1.0, subdivisions).unwrap();
            let record = estimate(&mesh, CurvatureMethod::NormalCycle);
            assert_eq!(record.diagnostics().unresolved_vertices, 0);

            for v in mesh.vertex_ids() {
                assert!((record.mean(v) - 1.0).abs() < 1e-9, "H = {}", record.mean(v));
            }
            let split = mean_sphere_error(&mesh, &record, 1.0);
            assert!(split < 0.2, "level {}: mean |k - 1| = {}", subdivisions, split);
        }
    }

    #[test]
    fn test_normal_cycle_on_sphere() {
        // With analytic normals every edge sees curvature exactly 1 / r, so
        // the tensor trace (the mean curvature) is exact; only the split
        // between k1 and k2 depends on how evenly the edges fan out.
        let mesh: TriangleMesh = shapes::icosphere(1.0, 3).unwrap();
        let record = estimate(&mesh, CurvatureMethod::NormalCycle);
        assert_eq!(record.diagnostics().unresolved_vertices, 0);

        let mut gaussian_error = 0.0;
        for v in mesh.vertex_ids() {
            assert!((record.mean(v) - 1.0).abs() < 1e-9, "H = {}", record.mean(v));
            assert!(record.min_curvature(v) > 0.0);
            gaussian_error += (record.gaussian(v) - 1.0).abs();
        }
        gaussian_error /= mesh.num_vertices() as f64;
        assert!(gaussian_error < 0.1, "mean Gaussian error {}", gaussian_error);
    }

    #[test]
    fn test_face_fit_torus_gaussian() {
        let (major, minor) = (1.0, 0.5);
        let mesh: TriangleMesh = shapes::torus(major, minor, 90, 60).unwrap();
        let record = estimate(&mesh, CurvatureMethod::FaceFit);

        let mut total = 0.0;
        let mut count = 0;
        for v in mesh.vertex_ids() {
            let exact = shapes::torus_gaussian_curvature(major, minor, mesh.position(v));
            // Relative error is meaningless near the K = 0 circles.
            if exact.abs() < 0.5 {
                continue;
            }
            total += ((record.gaussian(v) - exact) / exact).abs();
            count += 1;
        }
        assert!(count > 0);
        let mean_rel = total / count as f64;
        assert!(mean_rel < 0.05, "mean relative Gaussian error {}", mean_rel);
    }

    #[test]
    fn test_normal_cycle_torus_is_finite() {
        let mesh: TriangleMesh = shapes::torus(1.0, 0.5, 90, 60).unwrap();
        let record = estimate(&mesh, CurvatureMethod::NormalCycle);
        assert_eq!(record.len(), mesh.num_vertices());
        assert!(record.min_curvatures().iter().all(|k| k.is_finite()));
        assert!(record.max_curvatures().iter().all(|k| k.is_finite()));
        assert_directions_tangent(&mesh, &record);
    }

    #[test]
    fn test_bipyramid_apex() {
        let mesh: TriangleMesh = shapes::bipyramid().unwrap();
        let record = estimate(&mesh, CurvatureMethod::NormalCycle);

        assert_eq!(record.len(), 5);
        for v in mesh.vertex_ids() {
            assert!(record.min_direction(v).iter().all(|x| x.is_finite()));
            assert!(record.max_direction(v).iter().all(|x| x.is_finite()));
            assert!(record.min_curvature(v).is_finite());
            assert!(record.max_curvature(v).is_finite());
        }

        let apex = VertexId::new(0);
        assert!(record.is_resolved(apex));
        assert!(record.gaussian(apex) > 0.0, "K = {}", record.gaussian(apex));
        // Every apex edge drops 1 over a run of 1: normal curvature 1.
        assert!((record.min_curvature(apex) - 1.0).abs() < 1e-9);
        assert!((record.max_curvature(apex) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_area_triangle() {
        let sphere: TriangleMesh = shapes::icosphere(1.0, 1).unwrap();
        let mut positions = sphere.positions().to_vec();
        let mut triangles = sphere.triangles().to_vec();
        let duplicate = positions.len();
        positions.push(positions[0]);
        triangles.push([0, 1, duplicate]);
        let mesh: TriangleMesh = TriangleMesh::new(positions, triangles).unwrap();

        for method in METHODS {
            let record = estimate(&mesh, method);
            let v = VertexId::new(duplicate);
            assert_eq!(record.status(v), VertexStatus::Unresolved);
            assert_eq!(*record.min_direction(v), Vector3::zeros());
            assert_eq!(*record.max_direction(v), Vector3::zeros());
            assert_eq!(record.principal(v), (0.0, 0.0));

            let diagnostics = record.diagnostics();
            assert_eq!(diagnostics.unresolved_vertices, 1);
            assert!(diagnostics.skipped_contributions > 0);

            for u in mesh.vertex_ids().filter(|&u| u != v) {
                assert!(record.is_resolved(u));
                assert!(record.min_curvature(u).is_finite());
                assert!(record.max_curvature(u).is_finite());
            }
        }
    }

    #[test]
    fn test_singular_fit_policy() {
        // A needle triangle: nonzero area, but its edges are nearly collinear.
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1e-7, 0.0),
        ];
        let normals = vec![Vector3::z(); 3];
        let mesh: TriangleMesh =
            TriangleMesh::with_normals(positions, vec![[0, 1, 2]], normals).unwrap();

        let skip = CurvatureOptions::default().with_method(CurvatureMethod::FaceFit);
        let record = principal_curvature(&mesh, &skip).unwrap();
        assert!(record.diagnostics().singular_fits > 0);

        let strict = skip.with_singular_fit(SingularFitPolicy::Fail);
        assert!(matches!(
            principal_curvature(&mesh, &strict),
            Err(MeshError::IllConditionedFit { face: 0, .. })
        ));
    }

    #[test]
    fn test_repeatable_and_order_independent() {
        let mesh: TriangleMesh = shapes::torus(1.0, 0.3, 24, 12).unwrap();
        for method in METHODS {
            let options = CurvatureOptions::default().with_method(method).with_seed(7);
            let a = principal_curvature(&mesh, &options).unwrap();
            let b = principal_curvature(&mesh, &options).unwrap();
            let c = principal_curvature(&mesh, &options.clone().sequential()).unwrap();

            for other in [&b, &c] {
                assert_eq!(a.min_directions(), other.min_directions());
                assert_eq!(a.max_directions(), other.max_directions());
                assert_eq!(a.min_curvatures(), other.min_curvatures());
                assert_eq!(a.max_curvatures(), other.max_curvatures());
                assert_eq!(a.diagnostics(), other.diagnostics());
            }
        }
    }

    #[test]
    fn test_both_methods_share_topology() {
        let mesh = averaged_icosphere(1.0, 2);
        let (nc, ff) = principal_curvature_both(&mesh, &CurvatureOptions::default()).unwrap();
        assert_eq!(nc.method(), CurvatureMethod::NormalCycle);
        assert_eq!(ff.method(), CurvatureMethod::FaceFit);
        assert_eq!(nc.len(), ff.len());
        for v in mesh.vertex_ids() {
            assert!((nc.mean(v) - ff.mean(v)).abs() < 0.2);
        }
    }

    #[test]
    fn test_derived_quantities() {
        let mesh = averaged_icosphere(1.0, 2);
        for method in METHODS {
            let record = estimate(&mesh, method);

            let gaussian = record.gaussian_values();
            let mean = record.mean_values();
            for v in mesh.vertex_ids() {
                let (k1, k2) = record.principal(v);
                assert!(k1 >= k2, "{}: {:?} has k1 {} < k2 {}", method.name(), v, k1, k2);
                assert!(gaussian[v.index()].is_finite() && mean[v.index()].is_finite());
                assert!((gaussian[v.index()] - k1 * k2).abs() < 1e-12);
                assert!((mean[v.index()] - 0.5 * (k1 + k2)).abs() < 1e-12);

                let si = record.shape_index(v);
                assert!((-1.0..=1.0).contains(&si));
                assert!(record.curvedness(v) >= 0.0);
                assert_eq!(record.confidence(v), None);
            }
        }
    }

    #[test]
    fn test_shape_index_of_umbilics() {
        // Analytic normals make the face fit exact: every vertex is an
        // umbilic with k1 = k2 = 1, a cap.
        let sphere: TriangleMesh = shapes::icosphere(1.0, 2).unwrap();
        let record = estimate(&sphere, CurvatureMethod::FaceFit);
        for v in sphere.vertex_ids() {
            assert!((record.shape_index(v) - 1.0).abs() < 1e-9, "{:?}", record.principal(v));
        }

        // Flat points have no shape.
        let plane: TriangleMesh = shapes::grid(2).unwrap();
        let record = estimate(&plane, CurvatureMethod::FaceFit);
        assert_eq!(record.shape_index(VertexId::new(4)), 0.0);
    }
}
