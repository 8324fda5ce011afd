//! # Crestline
//!
//! Per-vertex principal curvature directions and magnitudes on triangle
//! meshes.
//!
//! Crestline takes an immutable triangle mesh with unit vertex normals and
//! estimates, for every vertex, the directions of minimum and maximum
//! curvature together with their signed magnitudes. Two estimators are
//! available:
//!
//! - **Normal cycle**: a 3×3 tensor of edge-wise normal curvatures
//! - **Face fit**: per-face second fundamental forms transported to vertex
//!   frames and averaged with mixed-area weights
//!
//! Degenerate input never aborts a run. Skipped faces, random fallback
//! directions and unresolved vertices are counted in the diagnostics of the
//! returned record. Random fallbacks are seeded, so results are reproducible
//! and identical between parallel and sequential execution.
//!
//! ## Quick Start
//!
//! ```
//! use crestline::prelude::*;
//!
//! let mesh: TriangleMesh = shapes::torus(1.0, 0.25, 48, 24).unwrap();
//!
//! let options = CurvatureOptions::default()
//!     .with_method(CurvatureMethod::FaceFit)
//!     .with_seed(42);
//! let record = principal_curvature(&mesh, &options).unwrap();
//!
//! let v = VertexId::new(0);
//! println!("k1={}, k2={}", record.max_curvature(v), record.min_curvature(v));
//! println!("max direction: {:?}", record.max_direction(v));
//! assert_eq!(record.diagnostics().unresolved_vertices, 0);
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use crestline::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     [0, 2, 1],  // bottom
//!     [0, 1, 3],  // front
//!     [1, 2, 3],  // right
//!     [2, 0, 3],  // left
//! ];
//!
//! // Normals are computed by area-weighted averaging.
//! let mesh: TriangleMesh = TriangleMesh::new(vertices, faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 4);
//! assert_eq!(mesh.num_faces(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod math;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use crestline::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::curvature::{
        principal_curvature, principal_curvature_both, principal_curvature_with_topology,
        CurvatureDiagnostics, CurvatureMethod, CurvatureOptions, CurvatureRecord,
        SingularFitPolicy, VertexStatus,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{shapes, FaceId, MeshIndex, MeshTopology, TriangleMesh, VertexId};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
