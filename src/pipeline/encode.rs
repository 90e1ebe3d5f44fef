//! Image encoding: `DynamicImage` → base64 PNG wrapped in `ImageData`.
//!
//! Vision APIs accept images as base64 data embedded in the JSON request
//! body. PNG keeps the scan lossless; JPEG artefacts around thin glyphs are
//! exactly what turns `G` into `Q` in a surname.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page as a base64 PNG ready for a vision model.
pub fn encode_page(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded page image → {} bytes base64", b64.len());

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}
