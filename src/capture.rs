//! The capture flow: validate, decode, preprocess, recognize, trim

use crate::config::Config;
use crate::data_uri;
use crate::engine::{OcrEngine, OcrResult};
use crate::engines::EngineRegistry;
use crate::error::{CaptureError, OcrError};
use crate::preprocessing::{Pipeline, PreprocessingResult, Preset};
use crate::upload::{self, Upload};
use image::DynamicImage;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Per-submission options
#[derive(Debug, Clone, Default)]
pub struct ExtractRequest {
    /// Engine name; the registry default when absent
    pub engine: Option<String>,
    /// Overrides the configured preset
    pub preset: Option<Preset>,
    /// Return the preprocessed image as a PNG data URI
    pub include_image: bool,
}

/// Outcome of a successful submission
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub text: String,
    pub engine: String,
    pub confidence: Option<f32>,
    pub processing_time_ms: u64,
    pub preprocessing: PreprocessingResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprocessed_image: Option<String>,
}

pub struct CaptureService {
    registry: Arc<EngineRegistry>,
    pipeline: Pipeline,
    max_file_size: usize,
}

impl CaptureService {
    pub fn new(registry: Arc<EngineRegistry>, config: &Config) -> Self {
        Self {
            registry,
            pipeline: Pipeline::new(config.preset, config.quantize),
            max_file_size: config.max_file_size,
        }
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    pub fn pipeline(&self) -> Pipeline {
        self.pipeline
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    pub async fn extract(
        &self,
        upload: Option<Upload>,
        request: &ExtractRequest,
    ) -> Result<Extraction, CaptureError> {
        let start = Instant::now();

        upload::validate(upload.as_ref(), self.max_file_size)?;
        let upload = upload.ok_or(CaptureError::NoFile)?;

        let engine = self.resolve_engine(request.engine.as_deref())?;
        let pipeline = match request.preset {
            Some(preset) => self.pipeline.with_preset(preset),
            None => self.pipeline,
        };
        let include_image = request.include_image;

        tracing::info!(
            "Processing {} ({}, {} bytes) with engine '{}'",
            upload.file_name.as_deref().unwrap_or("upload"),
            upload.mime(),
            upload.bytes.len(),
            engine.name()
        );

        let engine_name = engine.name().to_string();
        let (result, preprocessing, preprocessed_image) = tokio::task::spawn_blocking(move || {
            run_blocking(&upload, pipeline, engine, include_image)
        })
        .await
        .map_err(|e| {
            tracing::error!("OCR task failed to complete: {}", e);
            CaptureError::Unexpected
        })??;

        let text = result.text.trim().to_string();
        let processing_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "OCR completed in {}ms (preprocessing {}ms), text length: {}",
            processing_time_ms,
            preprocessing.total_time_ms,
            text.len()
        );

        Ok(Extraction {
            text,
            engine: engine_name,
            confidence: result.confidence,
            processing_time_ms,
            preprocessing,
            preprocessed_image,
        })
    }

    fn resolve_engine(&self, name: Option<&str>) -> Result<Arc<dyn OcrEngine>, CaptureError> {
        match name {
            Some(name) => self
                .registry
                .get(name)
                .ok_or_else(|| CaptureError::UnknownEngine(name.to_string())),
            None => self.registry.default_engine().ok_or_else(|| {
                tracing::error!("Registry has no default engine");
                CaptureError::Unexpected
            }),
        }
    }
}

type BlockingOutput = (OcrResult, PreprocessingResult, Option<String>);

fn run_blocking(
    upload: &Upload,
    pipeline: Pipeline,
    engine: Arc<dyn OcrEngine>,
    include_image: bool,
) -> Result<BlockingOutput, OcrError> {
    let decoded = upload::decode(upload)?;
    let preprocessing = pipeline.process(decoded)?;

    let preprocessed_image = if include_image {
        Some(data_uri::encode_png(&preprocessing.image)?)
    } else {
        None
    };

    let result = engine.recognize(&DynamicImage::ImageRgba8(preprocessing.image.clone()))?;

    Ok((result, preprocessing, preprocessed_image))
}
