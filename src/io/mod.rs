//! Mesh and curvature document I/O.
//!
//! Meshes are read from, and curvature results written to, JSON documents
//! (see [`json`]). The same file shape serves both directions, so an output
//! document can be fed back in as input.
//!
//! ```no_run
//! use crestline::algo::curvature::{principal_curvature, CurvatureOptions};
//! use crestline::io::json::{self, CurvatureDocument};
//! use crestline::mesh::TriangleMesh;
//!
//! let mesh: TriangleMesh = json::load_mesh("bunny.json").unwrap();
//! let record = principal_curvature(&mesh, &CurvatureOptions::default()).unwrap();
//! CurvatureDocument::new(&mesh, &record).rounded().save("bunny_curvature.json").unwrap();
//! ```

pub mod json;

pub use json::{load_mesh, CurvatureDocument};
