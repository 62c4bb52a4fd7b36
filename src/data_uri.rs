//! `data:` URI handling (RFC 2397)
//!
//! Browsers hand files over as data URIs; the preprocessed image can be
//! returned the same way.

use crate::error::{CaptureError, OcrError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::RgbaImage;
use std::io::Cursor;

/// A decoded data URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Parse `data:<mime>[;param]*[;base64],<payload>`
pub fn parse(uri: &str) -> Result<DataUri, CaptureError> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| CaptureError::InvalidRequest("expected a data: URI".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| CaptureError::InvalidRequest("data URI has no payload".to_string()))?;

    let mut params = header.split(';');
    let mime = match params.next().map(str::trim) {
        Some(m) if !m.is_empty() => m.to_ascii_lowercase(),
        _ => "text/plain".to_string(),
    };
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        STANDARD.decode(payload.trim()).map_err(|e| {
            tracing::warn!("Failed to decode base64 payload: {}", e);
            CaptureError::ReadFailed
        })?
    } else {
        payload.as_bytes().to_vec()
    };

    Ok(DataUri { mime, bytes })
}

/// Encode an image as `data:image/png;base64,...`
pub fn encode_png(image: &RgbaImage) -> Result<String, OcrError> {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| OcrError::ProcessingError(format!("Failed to encode PNG: {}", e)))?;

    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
}
