//! Core mesh data structures.
//!
//! The primary type is [`TriangleMesh`], an immutable face-vertex triangle
//! list with per-vertex unit normals. [`MeshTopology`] derives the per-face
//! areas and per-vertex incidence tables the curvature estimators consume.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`FaceId`] - Identifies a triangle
//!
//! These are generic over the underlying integer type ([`MeshIndex`]), so
//! `u16`, `u32` or `u64` storage can be chosen per mesh.
//!
//! # Construction
//!
//! ```
//! use crestline::mesh::{MeshTopology, TriangleMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh: TriangleMesh = TriangleMesh::new(vertices, vec![[0, 1, 2]]).unwrap();
//! let topology = MeshTopology::build(&mesh);
//! assert_eq!(topology.num_faces(), 1);
//! ```

mod index;
pub mod shapes;
mod topology;
mod triangle;

pub use index::{FaceId, MeshIndex, VertexId};
pub use topology::{Corner, FaceRecord, Incidence, MeshTopology};
pub use triangle::{vertex_normals, TriangleMesh};
