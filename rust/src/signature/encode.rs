//! Lossless PNG encoding of the canvas and its data-URL form.

use base64::{engine::general_purpose::STANDARD, Engine};

use super::canvas::Canvas;
use super::SignatureError;

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

pub fn encode_png(canvas: &Canvas) -> Result<Vec<u8>, SignatureError> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, canvas.width(), canvas.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| SignatureError::Encoding(format!("{e}")))?;
        writer
            .write_image_data(canvas.pixels())
            .map_err(|e| SignatureError::Encoding(format!("{e}")))?;
        writer
            .finish()
            .map_err(|e| SignatureError::Encoding(format!("{e}")))?;
    }
    Ok(out)
}

pub fn to_data_url(png_bytes: &[u8]) -> String {
    format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png_bytes))
}
