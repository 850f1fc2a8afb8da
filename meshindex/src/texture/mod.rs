// cpu side of the playground's textures;
// the viewer hands these straight to the gpu

use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod bmp;
pub mod dds;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bad magic, expected {expected:?}")]
    BadMagic { expected: &'static str },
    #[error("file too short: needed {needed} bytes, found {found}")]
    Truncated { needed: usize, found: usize },
    #[error("unsupported DDS FourCC {0:#010x}")]
    UnsupportedFourCc(u32),
    #[error("texture can't be {width}x{height}")]
    BadDimensions { width: u32, height: u32 },
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("don't know how to load `{0}` textures")]
    UnknownExtension(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureFormat {
    Rgba8,
    /// DXT1
    Bc1,
    /// DXT3
    Bc2,
    /// DXT5
    Bc3,
}

impl TextureFormat {
    /// Bytes per 4x4 block for the compressed formats.
    pub fn block_size(self) -> Option<usize> {
        match self {
            TextureFormat::Rgba8 => None,
            TextureFormat::Bc1 => Some(8),
            TextureFormat::Bc2 | TextureFormat::Bc3 => Some(16),
        }
    }

    /// Size in bytes of one mip level of the given dimensions,
    /// `None` if it doesn't fit in a `usize`.
    pub fn level_size(self, width: u32, height: u32) -> Option<usize> {
        let (w, h) = (width as usize, height as usize);
        match self.block_size() {
            Some(block) => ((w + 3) / 4).checked_mul((h + 3) / 4)?.checked_mul(block),
            None => w.checked_mul(h)?.checked_mul(4),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// Largest first.
    pub mips: Vec<MipLevel>,
}

impl TextureData {
    /// Every mip level back to back, the layout wgpu's
    /// `create_texture_with_data` wants.
    pub fn packed(&self) -> Vec<u8> {
        self.mips.iter().flat_map(|m| m.data.iter().copied()).collect()
    }

    pub fn mip_count(&self) -> u32 {
        self.mips.len() as u32
    }

    /// 1x1 opaque white, for meshes drawn without a texture.
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            format: TextureFormat::Rgba8,
            mips: vec![MipLevel {
                width: 1,
                height: 1,
                data: vec![0xff; 4],
            }],
        }
    }
}

/// Picks the decoder from the file extension.
pub fn load(path: &Path) -> Result<TextureData, TextureError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let decode: fn(&[u8]) -> Result<TextureData, TextureError> = match ext.as_str() {
        "bmp" => bmp::decode,
        "dds" => dds::decode,
        _ => return Err(TextureError::UnknownExtension(ext)),
    };
    let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
        path: path.to_owned(),
        source,
    })?;
    let tex = decode(&bytes)?;
    log::debug!(
        "loaded {}x{} {:?} texture ({} mips) from {}",
        tex.width,
        tex.height,
        tex.format,
        tex.mips.len(),
        path.display()
    );
    Ok(tex)
}

pub(crate) fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

pub(crate) fn need(bytes: &[u8], needed: usize) -> Result<(), TextureError> {
    if bytes.len() < needed {
        Err(TextureError::Truncated {
            needed,
            found: bytes.len(),
        })
    } else {
        Ok(())
    }
}
