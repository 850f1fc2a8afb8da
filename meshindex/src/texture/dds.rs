// DDS: "DDS " then a 124 byte surface description,
// then every mip level back to back, largest first.
// only the three DXT flavours are understood

use super::{need, read_u32, MipLevel, TextureData, TextureError, TextureFormat};

const MAGIC: &[u8; 4] = b"DDS ";
const HEADER_LEN: usize = 124;
const DATA_START: usize = MAGIC.len() + HEADER_LEN;

pub const FOURCC_DXT1: u32 = u32::from_le_bytes(*b"DXT1");
pub const FOURCC_DXT3: u32 = u32::from_le_bytes(*b"DXT3");
pub const FOURCC_DXT5: u32 = u32::from_le_bytes(*b"DXT5");

pub fn decode(bytes: &[u8]) -> Result<TextureData, TextureError> {
    need(bytes, MAGIC.len())?;
    if &bytes[..4] != MAGIC {
        return Err(TextureError::BadMagic { expected: "DDS " });
    }
    need(bytes, DATA_START)?;
    let header = &bytes[MAGIC.len()..DATA_START];

    let height = read_u32(header, 8);
    let width = read_u32(header, 12);
    let mip_count = read_u32(header, 24).max(1);
    let fourcc = read_u32(header, 80);

    let format = match fourcc {
        FOURCC_DXT1 => TextureFormat::Bc1,
        FOURCC_DXT3 => TextureFormat::Bc2,
        FOURCC_DXT5 => TextureFormat::Bc3,
        other => return Err(TextureError::UnsupportedFourCc(other)),
    };

    if width == 0 || height == 0 {
        return Err(TextureError::BadDimensions { width, height });
    }

    // mip_count comes straight from the file, so nothing is sized from it
    let mut mips = Vec::new();
    let (mut w, mut h) = (width, height);
    let mut offset = DATA_START;
    for _ in 0..mip_count {
        if w == 0 && h == 0 {
            break;
        }
        // non power of two chains bottom out at 1, not 0
        let (lw, lh) = (w.max(1), h.max(1));
        let end = format
            .level_size(lw, lh)
            .and_then(|size| offset.checked_add(size))
            .ok_or(TextureError::BadDimensions { width, height })?;
        need(bytes, end)?;
        mips.push(MipLevel {
            width: lw,
            height: lh,
            data: bytes[offset..end].to_vec(),
        });
        offset = end;
        w /= 2;
        h /= 2;
        if lw == 1 && lh == 1 {
            break;
        }
    }

    Ok(TextureData {
        width,
        height,
        format,
        mips,
    })
}
