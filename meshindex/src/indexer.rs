// use the faces to define vertices which have a unique combo of
// position, uv and normal, indexed with one unified index buffer
// rather than separate index streams per attribute like obj does

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use thiserror::Error;

use crate::stream::{FaceVertex, FaceVertexStream};

/// Element type of the index buffer. Matches `wgpu::IndexFormat::Uint32`.
pub type Index = u32;

/// Most unique vertices one mesh can have. `Index::MAX` itself is never
/// handed out since wgpu reads it as a strip restart.
pub const MAX_VERTICES: usize = Index::MAX as usize;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("face-vertex stream has {len} entries, which is not a whole number of triangles")]
    InvalidInput { len: usize },
    #[error(
        "attribute tables differ in length: \
         {positions} positions, {uvs} uvs, {normals} normals"
    )]
    MismatchedAttributes {
        positions: usize,
        uvs: usize,
        normals: usize,
    },
    #[error("mesh has more than {limit} unique vertices")]
    TooManyVertices { limit: usize },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexedMesh {
    /// First-seen order.
    pub vertices: Vec<FaceVertex>,
    /// One entry per input face-vertex.
    pub indices: Vec<Index>,
}

impl IndexedMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn positions(&self) -> Vec<[f32; 3]> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    pub fn uvs(&self) -> Vec<[f32; 2]> {
        self.vertices.iter().map(|v| v.uv).collect()
    }

    pub fn normals(&self) -> Vec<[f32; 3]> {
        self.vertices.iter().map(|v| v.normal).collect()
    }

    /// Interleaved vertex table, ready for a vertex buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Undoes the indexing; the result draws identically to the input.
    pub fn expand(&self) -> FaceVertexStream {
        self.indices
            .iter()
            .map(|&i| self.vertices[i as usize])
            .collect()
    }
}

// index for the vertex about to be pushed onto a table of `len`
fn next_index(len: usize) -> Result<Index, IndexError> {
    if len >= MAX_VERTICES {
        return Err(IndexError::TooManyVertices {
            limit: MAX_VERTICES,
        });
    }
    Ok(len as Index)
}

pub fn index(stream: &FaceVertexStream) -> Result<IndexedMesh, IndexError> {
    index_slice(stream.as_slice())
}

/// Deduplicates `corners` on exact bit equality of all three attributes.
///
/// No tolerance is applied on purpose: merging "close enough" vertices would
/// weld seams and change the mesh topology.
pub fn index_slice(corners: &[FaceVertex]) -> Result<IndexedMesh, IndexError> {
    if corners.len() % 3 != 0 {
        return Err(IndexError::InvalidInput { len: corners.len() });
    }

    let mut vertices = Vec::new();
    let mut indices = Vec::with_capacity(corners.len());
    let mut defined = HashMap::<[u32; 8], Index>::new();

    for corner in corners {
        match defined.entry(corner.key()) {
            Entry::Occupied(slot) => indices.push(*slot.get()),
            Entry::Vacant(slot) => {
                let idx = next_index(vertices.len())?;
                slot.insert(idx);
                indices.push(idx);
                vertices.push(*corner);
            }
        }
    }

    log::debug!(
        "indexed {} face-vertices into {} unique vertices",
        corners.len(),
        vertices.len()
    );
    Ok(IndexedMesh { vertices, indices })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(p: f32, u: f32, n: f32) -> FaceVertex {
        FaceVertex::new([p, p, p], [u, u], [n, n, n])
    }

    #[test]
    fn all_distinct_triangle() {
        let s: FaceVertexStream =
            vec![fv(0.0, 0.0, 0.0), fv(1.0, 0.0, 0.0), fv(2.0, 0.0, 0.0)].into();
        let mesh = index(&s).unwrap();
        assert_eq!(mesh.vertices, s.as_slice());
        assert_eq!(mesh.indices, [0, 1, 2]);
    }

    #[test]
    fn shared_edge_reuses_first_seen() {
        let a = fv(0.0, 0.0, 0.0);
        let b = fv(1.0, 0.0, 0.0);
        let c = fv(2.0, 0.0, 0.0);
        let d = fv(3.0, 0.0, 0.0);
        let s: FaceVertexStream = vec![a, b, c, a, c, d].into();
        let mesh = index(&s).unwrap();
        assert_eq!(mesh.vertices, [a, b, c, d]);
        assert_eq!(mesh.indices, [0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn same_position_different_normal_stays_split() {
        let s: FaceVertexStream =
            vec![fv(0.0, 0.0, 0.0), fv(0.0, 0.0, 1.0), fv(0.0, 0.0, 0.0)].into();
        let mesh = index(&s).unwrap();
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.indices, [0, 1, 0]);
    }

    #[test]
    fn nearly_equal_floats_do_not_merge() {
        let a = fv(0.1, 0.0, 0.0);
        let b = fv(f32::from_bits(0.1f32.to_bits() + 1), 0.0, 0.0);
        let s: FaceVertexStream = vec![a, b, a].into();
        let mesh = index(&s).unwrap();
        assert_eq!(mesh.indices, [0, 1, 0]);
    }

    #[test]
    fn rejects_partial_triangle() {
        let s: FaceVertexStream = vec![fv(0.0, 0.0, 0.0); 4].into();
        assert!(matches!(index(&s), Err(IndexError::InvalidInput { len: 4 })));
    }

    #[test]
    fn empty_is_fine() {
        let mesh = index(&FaceVertexStream::new()).unwrap();
        assert!(mesh.vertices.is_empty());
        assert!(mesh.indices.is_empty());
    }

    #[test]
    fn split_tables_line_up() {
        let s: FaceVertexStream = vec![
            FaceVertex::new([1.0, 2.0, 3.0], [0.5, 0.25], [0.0, 0.0, 1.0]),
            FaceVertex::new([4.0, 5.0, 6.0], [0.75, 1.0], [0.0, 1.0, 0.0]),
            FaceVertex::new([1.0, 2.0, 3.0], [0.5, 0.25], [0.0, 0.0, 1.0]),
        ]
        .into();
        let mesh = index(&s).unwrap();
        assert_eq!(mesh.positions(), [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(mesh.uvs(), [[0.5, 0.25], [0.75, 1.0]]);
        assert_eq!(mesh.normals(), [[0.0, 0.0, 1.0], [0.0, 1.0, 0.0]]);
    }

    #[test]
    fn byte_views_cover_tables() {
        let s: FaceVertexStream =
            vec![fv(0.0, 0.0, 0.0), fv(1.0, 0.0, 0.0), fv(0.0, 0.0, 0.0)].into();
        let mesh = index(&s).unwrap();
        assert_eq!(mesh.vertex_bytes().len(), 2 * 32);
        assert_eq!(mesh.index_bytes().len(), 3 * 4);
        assert_eq!(&mesh.index_bytes()[8..12], &0u32.to_ne_bytes());
    }

    #[test]
    fn expand_gives_back_the_stream() {
        let s: FaceVertexStream = vec![
            fv(0.0, 0.0, 0.0),
            fv(1.0, 1.0, 0.0),
            fv(2.0, 0.0, 1.0),
            fv(2.0, 0.0, 1.0),
            fv(1.0, 1.0, 0.0),
            fv(3.0, 0.0, 0.0),
        ]
        .into();
        assert_eq!(index(&s).unwrap().expand(), s);
    }

    #[test]
    fn restart_index_is_never_handed_out() {
        assert_eq!(next_index(0).unwrap(), 0);
        assert_eq!(next_index(MAX_VERTICES - 1).unwrap(), Index::MAX - 1);
        assert!(matches!(
            next_index(MAX_VERTICES),
            Err(IndexError::TooManyVertices { limit: MAX_VERTICES })
        ));
    }
}
