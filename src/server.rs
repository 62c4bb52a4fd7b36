use crate::capture::{CaptureService, ExtractRequest, Extraction};
use crate::config::Config;
use crate::data_uri;
use crate::engines::{EngineInfo, EngineRegistry};
use crate::error::CaptureError;
use crate::preprocessing::{PreprocessingResult, Preset};
use crate::state::{Submission, SubmissionState};
use crate::upload::{Upload, PDF_MIME};
use axum::{
    extract::{
        multipart::MultipartError, rejection::JsonRejection, DefaultBodyLimit, Multipart, Path,
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Headroom above the file size limit for multipart framing
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CaptureService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(service: CaptureService, config: Config) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }
}

/// Query parameters accepted by the extract routes
#[derive(Debug, Default, Deserialize)]
pub struct ExtractParams {
    pub preset: Option<Preset>,
    #[serde(default)]
    pub include_image: bool,
}

/// JSON body for `POST /extract/data-uri`
#[derive(Debug, Deserialize)]
pub struct DataUriRequest {
    pub image: String,
    pub engine: Option<String>,
    pub preset: Option<Preset>,
    #[serde(default)]
    pub include_image: bool,
}

/// Successful extraction response
#[derive(Serialize)]
pub struct ExtractResponse {
    #[serde(flatten)]
    pub state: SubmissionState,
    pub engine: String,
    pub confidence: Option<f32>,
    pub processing_time_ms: u64,
    pub preprocessing: PreprocessingResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprocessed_image: Option<String>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub default_engine: String,
    pub available_engines: Vec<EngineInfo>,
    pub max_file_size_bytes: usize,
    pub language: String,
    pub char_whitelist: String,
    pub preset: String,
    pub quantize: String,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let registry = EngineRegistry::new(&config)?;
    let service = CaptureService::new(Arc::new(registry), &config);
    let addr = format!("{}:{}", config.host, config.port);

    let app = router(AppState::new(service, config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    // base64 inflates data URI payloads by a third
    let body_limit = state.config.max_file_size / 3 * 4 + MULTIPART_OVERHEAD;

    Router::new()
        .route("/extract", post(handle_extract))
        .route("/extract/data-uri", post(handle_extract_data_uri))
        .route("/extract/:engine", post(handle_extract_with_engine))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_extract(
    State(state): State<AppState>,
    Query(params): Query<ExtractParams>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, CaptureError> {
    let upload = read_multipart(multipart, state.service.max_file_size()).await?;
    let request = ExtractRequest {
        engine: None,
        preset: params.preset,
        include_image: params.include_image,
    };
    submit(&state, upload, &request).await
}

async fn handle_extract_with_engine(
    State(state): State<AppState>,
    Path(engine): Path<String>,
    Query(params): Query<ExtractParams>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, CaptureError> {
    let upload = read_multipart(multipart, state.service.max_file_size()).await?;
    let request = ExtractRequest {
        engine: Some(engine),
        preset: params.preset,
        include_image: params.include_image,
    };
    submit(&state, upload, &request).await
}

async fn handle_extract_data_uri(
    State(state): State<AppState>,
    body: Result<Json<DataUriRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, CaptureError> {
    let Json(body) = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            CaptureError::PayloadTooLarge {
                max: state.service.max_file_size(),
            }
        } else {
            CaptureError::InvalidRequest(rejection.body_text())
        }
    })?;

    let upload = if body.image.trim().is_empty() {
        None
    } else {
        let parsed = data_uri::parse(&body.image)?;
        Some(Upload::new(None, Some(parsed.mime), parsed.bytes))
    };

    let request = ExtractRequest {
        engine: body.engine,
        preset: body.preset,
        include_image: body.include_image,
    };
    submit(&state, upload, &request).await
}

async fn submit(
    state: &AppState,
    upload: Option<Upload>,
    request: &ExtractRequest,
) -> Result<Json<ExtractResponse>, CaptureError> {
    let mut submission = Submission::new();
    let extraction = submission.submit(&state.service, upload, request).await?;
    Ok(Json(into_response(submission.state().clone(), extraction)))
}

fn into_response(state: SubmissionState, extraction: Extraction) -> ExtractResponse {
    ExtractResponse {
        state,
        engine: extraction.engine,
        confidence: extraction.confidence,
        processing_time_ms: extraction.processing_time_ms,
        preprocessing: extraction.preprocessing,
        preprocessed_image: extraction.preprocessed_image,
    }
}

/// Pull the `file` field out of a multipart form.
///
/// A part that overruns the body limit is still classified by its declared
/// content type, so PDFs and non-images get their own errors ahead of the
/// size error.
async fn read_multipart(
    mut multipart: Multipart,
    max_file_size: usize,
) -> Result<Option<Upload>, CaptureError> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        multipart_error(e, None, max_file_size, |e| {
            CaptureError::InvalidRequest(format!("Failed to parse multipart: {}", e))
        })
    })? {
        let name = field.name().unwrap_or_default().to_string();
        if name != "file" {
            continue;
        }

        let file_name = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|s| s.to_string());
        let bytes = field.bytes().await.map_err(|e| {
            multipart_error(e, content_type.as_deref(), max_file_size, |e| {
                tracing::warn!("Failed to read file data: {}", e);
                CaptureError::ReadFailed
            })
        })?;

        upload = Some(Upload::new(file_name, content_type, bytes.to_vec()));
    }

    Ok(upload)
}

fn multipart_error<F>(
    err: MultipartError,
    content_type: Option<&str>,
    max_file_size: usize,
    otherwise: F,
) -> CaptureError
where
    F: FnOnce(MultipartError) -> CaptureError,
{
    if err.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return otherwise(err);
    }

    match content_type.map(|m| m.trim().to_ascii_lowercase()) {
        Some(mime) if mime == PDF_MIME => CaptureError::PdfNotSupported,
        Some(mime) if !mime.starts_with("image/") => CaptureError::InvalidFileType,
        _ => CaptureError::PayloadTooLarge { max: max_file_size },
    }
}

async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.service.registry();
    let pipeline = state.service.pipeline();

    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        default_engine: registry.default_name().to_string(),
        available_engines: registry.info(),
        max_file_size_bytes: state.service.max_file_size(),
        language: state.config.recognition.language.clone(),
        char_whitelist: state.config.recognition.char_whitelist.clone(),
        preset: pipeline.preset().as_str().to_string(),
        quantize: pipeline.quantize().as_str().to_string(),
    })
}
