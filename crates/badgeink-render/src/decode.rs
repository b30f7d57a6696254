//! Decoding of subject and badge images.

use crate::renderer::{RenderError, RenderResult};
use image::{ImageFormat, RgbaImage};

/// Decode encoded image bytes into an RGBA buffer.
///
/// The format comes from the leading bytes, never from a name. Only PNG,
/// JPEG and WebP are accepted; anything else is a decode error.
pub fn decode_image(data: &[u8]) -> RenderResult<RgbaImage> {
    let format = image::guess_format(data)
        .map_err(|_| RenderError::Decode("unrecognized image format".to_string()))?;
    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP) {
        return Err(RenderError::Decode(format!(
            "unsupported image format {}",
            format.to_mime_type()
        )));
    }

    let decoded = image::load_from_memory_with_format(data, format)
        .map_err(|e| RenderError::Decode(e.to_string()))?
        .to_rgba8();

    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(RenderError::Decode("image has no pixels".to_string()));
    }

    log::debug!(
        "Decoded {} image {}x{}",
        format.to_mime_type(),
        decoded.width(),
        decoded.height()
    );
    Ok(decoded)
}
