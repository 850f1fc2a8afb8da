use bytemuck::{Pod, Zeroable};

use crate::indexer::IndexError;

/// One corner of one triangle with its own copy of every attribute.
///
/// Laid out so a table of these can go straight into a vertex buffer:
/// position at offset 0, uv at 12, normal at 20, 32 bytes total.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FaceVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

impl FaceVertex {
    pub fn new(position: [f32; 3], uv: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            uv,
            normal,
        }
    }

    /// Bit pattern of every component.
    ///
    /// Two corners are the same vertex only if these match, so `0.0` and
    /// `-0.0` stay apart and a NaN only merges with an identical NaN.
    pub fn key(&self) -> [u32; 8] {
        let [px, py, pz] = self.position;
        let [u, v] = self.uv;
        let [nx, ny, nz] = self.normal;
        [px, py, pz, u, v, nx, ny, nz].map(f32::to_bits)
    }

    /// Componentwise bit equality, the relation the indexer merges on.
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

/// Face-vertices in loader order, grouped in triples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceVertexStream(Vec<FaceVertex>);

impl FaceVertexStream {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Zips the three parallel tables an obj loader produces.
    pub fn from_parallel(
        positions: &[[f32; 3]],
        uvs: &[[f32; 2]],
        normals: &[[f32; 3]],
    ) -> Result<Self, IndexError> {
        if positions.len() != uvs.len() || positions.len() != normals.len() {
            return Err(IndexError::MismatchedAttributes {
                positions: positions.len(),
                uvs: uvs.len(),
                normals: normals.len(),
            });
        }
        Ok(Self(
            positions
                .iter()
                .zip(uvs)
                .zip(normals)
                .map(|((p, t), n)| FaceVertex::new(*p, *t, *n))
                .collect(),
        ))
    }

    pub fn push(&mut self, vertex: FaceVertex) {
        self.0.push(vertex);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[FaceVertex] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FaceVertex> {
        self.0.iter()
    }

    // a trailing partial triangle is dropped here;
    // the indexer is what rejects those streams
    pub fn triangles(&self) -> impl Iterator<Item = &[FaceVertex; 3]> + '_ {
        self.0
            .chunks_exact(3)
            .filter_map(|tri| <&[FaceVertex; 3]>::try_from(tri).ok())
    }
}

impl From<Vec<FaceVertex>> for FaceVertexStream {
    fn from(v: Vec<FaceVertex>) -> Self {
        Self(v)
    }
}

impl FromIterator<FaceVertex> for FaceVertexStream {
    fn from_iter<I: IntoIterator<Item = FaceVertex>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FaceVertexStream {
    type Item = &'a FaceVertex;
    type IntoIter = std::slice::Iter<'a, FaceVertex>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
