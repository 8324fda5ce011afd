//! Face-vertex triangle mesh with per-vertex normals.

use std::marker::PhantomData;

use nalgebra::{Point3, Vector3};

use super::index::{FaceId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// An immutable triangle mesh: positions, triangles and unit vertex normals.
///
/// Unlike a half-edge structure this accepts any triangle soup whose indices
/// are in range, including non-manifold edges, repeated indices and
/// zero-area faces. The curvature estimators degrade gracefully on such
/// input instead of rejecting it.
#[derive(Debug, Clone)]
pub struct TriangleMesh<I: MeshIndex = u32> {
    positions: Vec<Point3<f64>>,
    triangles: Vec<[usize; 3]>,
    normals: Vec<Vector3<f64>>,
    _marker: PhantomData<I>,
}

impl<I: MeshIndex> TriangleMesh<I> {
    /// Build a mesh, computing vertex normals by area-weighted averaging.
    ///
    /// # Example
    /// ```
    /// use crestline::mesh::TriangleMesh;
    /// use nalgebra::Point3;
    ///
    /// let positions = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// ];
    /// let mesh: TriangleMesh = TriangleMesh::new(positions, vec![[0, 1, 2]]).unwrap();
    /// assert_eq!(mesh.num_faces(), 1);
    /// ```
    pub fn new(positions: Vec<Point3<f64>>, triangles: Vec<[usize; 3]>) -> Result<Self> {
        validate_triangles::<I>(positions.len(), &triangles)?;
        let normals = vertex_normals(&positions, &triangles);
        Ok(Self {
            positions,
            triangles,
            normals,
            _marker: PhantomData,
        })
    }

    /// Build a mesh with caller-supplied unit vertex normals.
    pub fn with_normals(
        positions: Vec<Point3<f64>>,
        triangles: Vec<[usize; 3]>,
        normals: Vec<Vector3<f64>>,
    ) -> Result<Self> {
        validate_triangles::<I>(positions.len(), &triangles)?;
        if normals.len() != positions.len() {
            return Err(MeshError::NormalCountMismatch {
                positions: positions.len(),
                normals: normals.len(),
            });
        }
        Ok(Self {
            positions,
            triangles,
            normals,
            _marker: PhantomData,
        })
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.triangles.len()
    }

    /// Iterate over all vertex ids.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.positions.len()).map(VertexId::new)
    }

    /// Iterate over all face ids.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.triangles.len()).map(FaceId::new)
    }

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.positions[v.index()]
    }

    /// Unit normal of a vertex.
    #[inline]
    pub fn normal(&self, v: VertexId<I>) -> &Vector3<f64> {
        &self.normals[v.index()]
    }

    /// The three vertices of a face, in winding order.
    #[inline]
    pub fn triangle(&self, f: FaceId<I>) -> [VertexId<I>; 3] {
        self.triangles[f.index()].map(VertexId::new)
    }

    /// The three corner positions of a face.
    #[inline]
    pub fn face_positions(&self, f: FaceId<I>) -> [Point3<f64>; 3] {
        self.triangles[f.index()].map(|v| self.positions[v])
    }

    /// All positions.
    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// All triangles as raw vertex indices.
    #[inline]
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// All vertex normals.
    #[inline]
    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    /// Total surface area.
    pub fn surface_area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| {
                let [a, b, c] = t.map(|v| self.positions[v]);
                0.5 * (b - a).cross(&(c - a)).norm()
            })
            .sum()
    }

    /// A copy translated to its centroid and scaled into the unit ball.
    ///
    /// Normals are unaffected by a uniform scale and are kept as they are.
    pub fn centered(&self) -> Self {
        let n = self.positions.len().max(1) as f64;
        let mean = self
            .positions
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords)
            / n;
        let radius = self
            .positions
            .iter()
            .map(|p| (p.coords - mean).norm())
            .fold(0.0_f64, f64::max);
        let scale = if radius > 0.0 { 1.0 / radius } else { 1.0 };

        Self {
            positions: self
                .positions
                .iter()
                .map(|p| Point3::from((p.coords - mean) * scale))
                .collect(),
            triangles: self.triangles.clone(),
            normals: self.normals.clone(),
            _marker: PhantomData,
        }
    }
}

fn validate_triangles<I: MeshIndex>(num_vertices: usize, triangles: &[[usize; 3]]) -> Result<()> {
    if num_vertices > I::MAX.to_usize() {
        return Err(MeshError::invalid_param(
            "vertex count",
            num_vertices,
            "exceeds the index type's capacity",
        ));
    }
    if triangles.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    for (fi, tri) in triangles.iter().enumerate() {
        for &vi in tri {
            if vi >= num_vertices {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
    }
    Ok(())
}

/// Area-weighted vertex normals.
///
/// Each vertex sums the unnormalized normals `(b - a) × (c - a)` of its
/// incident triangles, so larger faces count more. Vertices whose sum
/// vanishes (isolated, or only touching zero-area faces) get the zero vector.
pub fn vertex_normals(positions: &[Point3<f64>], triangles: &[[usize; 3]]) -> Vec<Vector3<f64>> {
    let mut normals = vec![Vector3::zeros(); positions.len()];
    for tri in triangles {
        let [a, b, c] = tri.map(|v| positions[v]);
        let n = (b - a).cross(&(c - a));
        for &v in tri {
            normals[v] += n;
        }
    }
    for n in &mut normals {
        let len = n.norm();
        *n = if len > 1e-12 { *n / len } else { Vector3::zeros() };
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        (vertices, faces)
    }

    #[test]
    fn test_build_tetrahedron() {
        let (vertices, faces) = tetrahedron();
        let mesh: TriangleMesh = TriangleMesh::new(vertices, faces).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 4);
        for v in mesh.vertex_ids() {
            assert!((mesh.normal(v).norm() - 1.0).abs() < 1e-12);
        }
        // Apex normal points away from the base.
        assert!(mesh.normal(VertexId::new(3)).z > 0.0);
    }

    #[test]
    fn test_rejects_bad_input() {
        let (vertices, _) = tetrahedron();
        assert!(matches!(
            TriangleMesh::<u32>::new(vertices.clone(), vec![]),
            Err(MeshError::EmptyMesh)
        ));
        assert!(matches!(
            TriangleMesh::<u32>::new(vertices.clone(), vec![[0, 1, 7]]),
            Err(MeshError::InvalidVertexIndex { face: 0, vertex: 7 })
        ));
        assert!(matches!(
            TriangleMesh::<u32>::with_normals(vertices, vec![[0, 1, 2]], vec![Vector3::z()]),
            Err(MeshError::NormalCountMismatch { positions: 4, normals: 1 })
        ));
    }

    #[test]
    fn test_rejects_too_many_vertices_for_index() {
        // u16 indices hold at most 65534 vertices.
        let positions = vec![Point3::origin(); 65_535];
        let result = TriangleMesh::<u16>::new(positions.clone(), vec![[0, 1, 2]]);
        assert!(matches!(
            result,
            Err(MeshError::InvalidParameter { name: "vertex count", .. })
        ));

        let normals = vec![Vector3::z(); 65_535];
        assert!(TriangleMesh::<u16>::with_normals(positions.clone(), vec![[0, 1, 2]], normals).is_err());

        assert!(TriangleMesh::<u16>::new(positions[..65_534].to_vec(), vec![[0, 1, 2]]).is_ok());
        assert!(TriangleMesh::<u32>::new(positions, vec![[0, 1, 2]]).is_ok());
    }

    #[test]
    fn test_accepts_degenerate_triangles() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let mesh: TriangleMesh = TriangleMesh::new(vertices, vec![[0, 1, 2], [0, 0, 1]]).unwrap();
        assert_eq!(mesh.surface_area(), 0.0);
        assert!(mesh.normals().iter().all(|n| *n == Vector3::zeros()));
    }

    #[test]
    fn test_centered() {
        let (vertices, faces) = tetrahedron();
        let shifted: Vec<_> = vertices
            .iter()
            .map(|p| Point3::from(p.coords * 10.0 + Vector3::new(5.0, -3.0, 2.0)))
            .collect();
        let mesh: TriangleMesh = TriangleMesh::new(shifted, faces).unwrap();
        let centered = mesh.centered();

        let mean = centered
            .positions()
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords)
            / 4.0;
        assert!(mean.norm() < 1e-12);
        let radius = centered
            .positions()
            .iter()
            .map(|p| p.coords.norm())
            .fold(0.0, f64::max);
        assert!((radius - 1.0).abs() < 1e-12);
    }
}
