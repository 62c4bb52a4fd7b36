use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures raised by preprocessing and OCR engines.
///
/// These carry technical detail for the logs and are never shown to the
/// submitter directly; the capture flow folds them into
/// [`CaptureError::Unexpected`].
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("Failed to process image: {0}")]
    ProcessingError(String),

    #[error("Preprocessing failed: {0}")]
    PreprocessingError(String),

    #[error("Image has no pixels: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
}

/// Errors surfaced to whoever submitted the document.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Please upload a valid document.")]
    NoFile,

    #[error("PDF files are not supported. Please upload an image file.")]
    PdfNotSupported,

    #[error("Invalid file type. Please upload an image (e.g., .jpg, .jpeg, .png).")]
    InvalidFileType,

    #[error("Error reading the file")]
    ReadFailed,

    #[error("An unexpected error occurred while processing the document. Please try again later.")]
    Unexpected,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("File too large (max: {max} bytes)")]
    PayloadTooLarge { max: usize },

    #[error("Unknown OCR engine: {0}")]
    UnknownEngine(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("A document is already being processed.")]
    SubmissionInProgress,
}

impl CaptureError {
    /// Stable machine-readable code for the error
    pub fn code(&self) -> &'static str {
        match self {
            CaptureError::NoFile => "NO_FILE",
            CaptureError::PdfNotSupported => "PDF_NOT_SUPPORTED",
            CaptureError::InvalidFileType => "INVALID_FILE_TYPE",
            CaptureError::ReadFailed => "READ_FAILED",
            CaptureError::Unexpected => "UNEXPECTED_ERROR",
            CaptureError::FileTooLarge { .. } | CaptureError::PayloadTooLarge { .. } => {
                "FILE_TOO_LARGE"
            }
            CaptureError::UnknownEngine(_) => "UNKNOWN_ENGINE",
            CaptureError::InvalidRequest(_) => "INVALID_REQUEST",
            CaptureError::SubmissionInProgress => "SUBMISSION_IN_PROGRESS",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            CaptureError::NoFile
            | CaptureError::PdfNotSupported
            | CaptureError::InvalidFileType
            | CaptureError::UnknownEngine(_)
            | CaptureError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CaptureError::FileTooLarge { .. } | CaptureError::PayloadTooLarge { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            CaptureError::SubmissionInProgress => StatusCode::CONFLICT,
            CaptureError::ReadFailed | CaptureError::Unexpected => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<OcrError> for CaptureError {
    fn from(err: OcrError) -> Self {
        tracing::error!("Error during OCR process: {}", err);
        CaptureError::Unexpected
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub state: &'static str,
    pub message: String,
    pub code: String,
}

impl IntoResponse for CaptureError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            state: "failed",
            message: self.to_string(),
            code: self.code().to_string(),
        });

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_message_differs_from_generic_type_message() {
        assert_ne!(
            CaptureError::PdfNotSupported.to_string(),
            CaptureError::InvalidFileType.to_string()
        );
        assert_eq!(
            CaptureError::PdfNotSupported.to_string(),
            "PDF files are not supported. Please upload an image file."
        );
    }

    #[test]
    fn test_engine_failures_become_unexpected() {
        let err: CaptureError = OcrError::ProcessingError("model exploded".to_string()).into();
        assert!(matches!(err, CaptureError::Unexpected));
        assert!(!err.to_string().contains("model exploded"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(CaptureError::NoFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            CaptureError::FileTooLarge { size: 2, max: 1 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            CaptureError::Unexpected.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
