//! Per-face and per-vertex lookup tables shared by the curvature estimators.
//!
//! [`MeshTopology::build`] makes one O(m) pass over the triangle list and
//! records, for every face, its area and geometric normal, and for every
//! vertex, the faces that touch it. Zero-area faces stay in the tables; each
//! estimator decides for itself what to skip.

use nalgebra::Vector3;

use super::index::{FaceId, MeshIndex, VertexId};
use super::triangle::TriangleMesh;
use crate::math::EPSILON;

/// Area and geometric normal of one triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceRecord {
    /// Triangle area, `0.5 * |(b - a) × (c - a)|`.
    pub area: f64,
    /// Unit geometric normal, or zero for a (near) zero-area triangle.
    pub normal: Vector3<f64>,
}

/// One (neighbor, face) pair around a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Incidence<I: MeshIndex = u32> {
    /// The other endpoint of an edge leaving the vertex.
    pub neighbor: VertexId<I>,
    /// The triangle that edge belongs to.
    pub face: FaceId<I>,
}

/// One triangle corner occupied by a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corner<I: MeshIndex = u32> {
    /// The triangle.
    pub face: FaceId<I>,
    /// Slot (0, 1 or 2) of the vertex within the triangle.
    pub slot: u8,
}

/// Face records plus per-vertex incidence built from a [`TriangleMesh`].
#[derive(Debug, Clone)]
pub struct MeshTopology<I: MeshIndex = u32> {
    faces: Vec<FaceRecord>,
    incidence: Vec<Vec<Incidence<I>>>,
    corners: Vec<Vec<Corner<I>>>,
}

impl<I: MeshIndex> MeshTopology<I> {
    /// Index a mesh.
    ///
    /// For each triangle `[a, b, c]` every corner receives the two other
    /// vertices as incidence pairs (next, then previous) and one corner entry.
    pub fn build(mesh: &TriangleMesh<I>) -> Self {
        let n = mesh.num_vertices();
        let mut faces = Vec::with_capacity(mesh.num_faces());
        let mut incidence: Vec<Vec<Incidence<I>>> = vec![Vec::new(); n];
        let mut corners: Vec<Vec<Corner<I>>> = vec![Vec::new(); n];

        for (fi, tri) in mesh.triangles().iter().enumerate() {
            let [a, b, c] = tri.map(|v| mesh.positions()[v]);
            let cross = (b - a).cross(&(c - a));
            let len = cross.norm();
            faces.push(FaceRecord {
                area: 0.5 * len,
                normal: if len > EPSILON { cross / len } else { Vector3::zeros() },
            });

            let face = FaceId::new(fi);
            for slot in 0..3 {
                let v = tri[slot];
                let next = tri[(slot + 1) % 3];
                let prev = tri[(slot + 2) % 3];
                incidence[v].push(Incidence {
                    neighbor: VertexId::new(next),
                    face,
                });
                incidence[v].push(Incidence {
                    neighbor: VertexId::new(prev),
                    face,
                });
                corners[v].push(Corner {
                    face,
                    slot: slot as u8,
                });
            }
        }

        log::debug!(
            "indexed {} vertices, {} faces ({} below area threshold)",
            n,
            faces.len(),
            faces.iter().filter(|f| f.area < EPSILON).count()
        );

        Self {
            faces,
            incidence,
            corners,
        }
    }

    /// Number of indexed vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.incidence.len()
    }

    /// Number of indexed faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Area and normal of a face.
    #[inline]
    pub fn face(&self, f: FaceId<I>) -> &FaceRecord {
        &self.faces[f.index()]
    }

    /// Area of a face.
    #[inline]
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        self.faces[f.index()].area
    }

    /// All face records.
    #[inline]
    pub fn faces(&self) -> &[FaceRecord] {
        &self.faces
    }

    /// The (neighbor, face) pairs of a vertex, two per incident triangle.
    #[inline]
    pub fn incidence(&self, v: VertexId<I>) -> &[Incidence<I>] {
        &self.incidence[v.index()]
    }

    /// The triangle corners occupied by a vertex.
    #[inline]
    pub fn corners(&self, v: VertexId<I>) -> &[Corner<I>] {
        &self.corners[v.index()]
    }

    /// Number of triangles incident to a vertex.
    #[inline]
    pub fn valence(&self, v: VertexId<I>) -> usize {
        self.corners[v.index()].len()
    }
}
