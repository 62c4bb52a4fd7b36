//! Validation and decoding of submitted files

use crate::error::{CaptureError, OcrError};
use image::RgbaImage;
use std::path::Path;

pub const PDF_MIME: &str = "application/pdf";

/// A submitted file
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: Option<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Read a file from disk, taking its MIME type from the extension
    pub fn from_path(path: &Path) -> Result<Self, CaptureError> {
        let bytes = std::fs::read(path).map_err(|e| {
            tracing::warn!("Failed to read {:?}: {}", path, e);
            CaptureError::ReadFailed
        })?;

        Ok(Self {
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            content_type: Some(mime_from_path(path).to_string()),
            bytes,
        })
    }

    pub fn mime(&self) -> &str {
        self.content_type.as_deref().unwrap_or("")
    }
}

/// MIME type for a file extension
pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "pdf" => PDF_MIME,
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Check that an upload is present, is an image, and fits the size limit.
/// Nothing is decoded here.
pub fn validate(upload: Option<&Upload>, max_file_size: usize) -> Result<&Upload, CaptureError> {
    let upload = match upload {
        Some(u) if !u.bytes.is_empty() => u,
        _ => return Err(CaptureError::NoFile),
    };

    let mime = upload.mime().trim().to_ascii_lowercase();
    if mime == PDF_MIME {
        return Err(CaptureError::PdfNotSupported);
    }
    if !mime.starts_with("image/") {
        tracing::warn!("Rejected file with content type: {:?}", upload.content_type);
        return Err(CaptureError::InvalidFileType);
    }

    if upload.bytes.len() > max_file_size {
        return Err(CaptureError::FileTooLarge {
            size: upload.bytes.len(),
            max: max_file_size,
        });
    }

    Ok(upload)
}

/// Decode the upload into RGBA pixels
pub fn decode(upload: &Upload) -> Result<RgbaImage, OcrError> {
    let img = image::load_from_memory(&upload.bytes)
        .map_err(|e| OcrError::ProcessingError(format!("Failed to load image: {}", e)))?;
    Ok(img.into_rgba8())
}
