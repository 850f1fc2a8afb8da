// BMP goes through the image crate, then the rows are put back bottom-up,
// which is what obj's bottom-left uv origin expects

use image::{imageops, ImageFormat};

use super::{MipLevel, TextureData, TextureError, TextureFormat};

pub fn decode(bytes: &[u8]) -> Result<TextureData, TextureError> {
    if !bytes.starts_with(b"BM") {
        return Err(TextureError::BadMagic { expected: "BM" });
    }
    let mut img = image::load_from_memory_with_format(bytes, ImageFormat::Bmp)?.to_rgba8();
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureError::BadDimensions { width, height });
    }
    imageops::flip_vertical_in_place(&mut img);
    log::debug!("bmp {}x{}", width, height);

    Ok(TextureData {
        width,
        height,
        format: TextureFormat::Rgba8,
        mips: vec![MipLevel {
            width,
            height,
            data: img.into_raw(),
        }],
    })
}
