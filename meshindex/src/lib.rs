// turns the expanded per-corner attribute stream an obj file gives you
// into a deduplicated vertex table + a u32 index buffer,
// plus the bits around it the viewer needs (obj loading, bmp/dds decoding)

pub mod cube;
pub mod indexer;
pub mod objparse;
pub mod stream;
pub mod texture;

pub use self::indexer::{index, index_slice, Index, IndexError, IndexedMesh, MAX_VERTICES};
pub use self::objparse::{LoadOptions, ParseError};
pub use self::stream::{FaceVertex, FaceVertexStream};
pub use self::texture::{MipLevel, TextureData, TextureError, TextureFormat};
