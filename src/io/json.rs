//! JSON curvature documents.
//!
//! A document carries the mesh together with one principal direction pair
//! per vertex:
//!
//! ```json
//! {
//!   "positions": [[x, y, z], ...],
//!   "triangles": [[a, b, c], ...],
//!   "normals": [[x, y, z], ...],
//!   "curvature_min": [[x, y, z], ...],
//!   "curvature_max": [[x, y, z], ...]
//! }
//! ```
//!
//! `normals` and both direction arrays may be omitted in input files.

use std::fs;
use std::path::Path;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::algo::curvature::CurvatureRecord;
use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, TriangleMesh};

/// Significant digits kept by [`CurvatureDocument::rounded`].
pub const SIGNIFICANT_DIGITS: usize = 5;

/// Serialized mesh plus per-vertex principal directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvatureDocument {
    /// Vertex positions.
    pub positions: Vec<[f64; 3]>,
    /// Triangles as vertex index triples.
    pub triangles: Vec<[usize; 3]>,
    /// Unit vertex normals.
    #[serde(default)]
    pub normals: Vec<[f64; 3]>,
    /// Direction of minimum curvature per vertex.
    #[serde(default)]
    pub curvature_min: Vec<[f64; 3]>,
    /// Direction of maximum curvature per vertex.
    #[serde(default)]
    pub curvature_max: Vec<[f64; 3]>,
}

fn to_array(v: &Vector3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}

impl CurvatureDocument {
    /// Build a document from a mesh and its curvature record.
    pub fn new<I: MeshIndex>(mesh: &TriangleMesh<I>, record: &CurvatureRecord<I>) -> Self {
        Self {
            positions: mesh.positions().iter().map(|p| to_array(&p.coords)).collect(),
            triangles: mesh.triangles().to_vec(),
            normals: mesh.normals().iter().map(to_array).collect(),
            curvature_min: record.min_directions().iter().map(to_array).collect(),
            curvature_max: record.max_directions().iter().map(to_array).collect(),
        }
    }

    /// A copy with every float rounded to [`SIGNIFICANT_DIGITS`] digits.
    pub fn rounded(&self) -> Self {
        let round = |rows: &[[f64; 3]]| -> Vec<[f64; 3]> {
            rows.iter().map(|row| row.map(round_significant)).collect()
        };
        Self {
            positions: round(&self.positions),
            triangles: self.triangles.clone(),
            normals: round(&self.normals),
            curvature_min: round(&self.curvature_min),
            curvature_max: round(&self.curvature_max),
        }
    }

    /// Serialize to a compact JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a document from a JSON string.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Write the document to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string(self).map_err(|e| MeshError::SaveError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, text)?;
        log::debug!("wrote {} vertices to {}", self.positions.len(), path.display());
        Ok(())
    }

    /// Build a mesh from the document.
    ///
    /// Normals are used when present for every vertex and recomputed by
    /// area weighting when the array is empty.
    pub fn to_mesh<I: MeshIndex>(&self) -> Result<TriangleMesh<I>> {
        let positions: Vec<Point3<f64>> = self
            .positions
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
            .collect();

        if self.normals.is_empty() {
            TriangleMesh::new(positions, self.triangles.clone())
        } else {
            let normals = self
                .normals
                .iter()
                .map(|&[x, y, z]| Vector3::new(x, y, z))
                .collect();
            TriangleMesh::with_normals(positions, self.triangles.clone(), normals)
        }
    }
}

/// Load a mesh from a JSON document.
///
/// # Example
///
/// ```no_run
/// use crestline::io::json;
/// use crestline::mesh::TriangleMesh;
///
/// let mesh: TriangleMesh = json::load_mesh("bunny.json").unwrap();
/// ```
pub fn load_mesh<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<TriangleMesh<I>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let document: CurvatureDocument =
        serde_json::from_str(&text).map_err(|e| MeshError::LoadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    document.to_mesh()
}

/// Round to [`SIGNIFICANT_DIGITS`] significant digits, like `%.5g`.
pub fn round_significant(x: f64) -> f64 {
    if !x.is_finite() || x == 0.0 {
        return x;
    }
    format!("{:.*e}", SIGNIFICANT_DIGITS - 1, x)
        .parse()
        .unwrap_or(x)
}
