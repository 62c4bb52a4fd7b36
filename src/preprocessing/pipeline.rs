use crate::error::OcrError;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{steps, Quantize};

/// Preprocessing preset names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Hand the decoded image to OCR untouched
    None,
    /// Grayscale, then halve dark tones
    #[default]
    Default,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Default => "default",
        }
    }
}

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingResult {
    #[serde(skip)]
    pub image: RgbaImage,
    pub total_time_ms: u64,
    pub preset: String,
    pub steps: Vec<StepTiming>,
}

/// Runs the preprocessing steps for a preset.
///
/// The grayscale pass completes over the whole image before the contrast
/// pass begins.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline {
    preset: Preset,
    quantize: Quantize,
}

impl Pipeline {
    pub fn new(preset: Preset, quantize: Quantize) -> Self {
        Self { preset, quantize }
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn quantize(&self) -> Quantize {
        self.quantize
    }

    pub fn with_preset(self, preset: Preset) -> Self {
        Self { preset, ..self }
    }

    pub fn process(&self, image: RgbaImage) -> Result<PreprocessingResult, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::EmptyImage { width, height });
        }

        let start = Instant::now();
        let mut steps_timing = Vec::new();

        if self.preset == Preset::None {
            return Ok(PreprocessingResult {
                image,
                total_time_ms: 0,
                preset: self.preset.as_str().to_string(),
                steps: vec![],
            });
        }

        let quantize = self.quantize;
        let img = self.run_step("grayscale", &image, &mut steps_timing, |img| {
            steps::grayscale::apply(img, quantize)
        });
        let img = self.run_step("contrast", &img, &mut steps_timing, |img| {
            steps::contrast::apply(img, quantize)
        });

        tracing::debug!(
            "Preprocessed {}x{} image with preset '{}'",
            width,
            height,
            self.preset.as_str()
        );

        Ok(PreprocessingResult {
            image: img,
            total_time_ms: start.elapsed().as_millis() as u64,
            preset: self.preset.as_str().to_string(),
            steps: steps_timing,
        })
    }

    fn run_step<F>(
        &self,
        name: &str,
        img: &RgbaImage,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> RgbaImage
    where
        F: FnOnce(&RgbaImage) -> RgbaImage,
    {
        let step_start = Instant::now();
        let result = step_fn(img);
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms: step_start.elapsed().as_millis() as u64,
        });
        result
    }
}
