//! Leptess/Tesseract engine implementation
//!
//! Tesseract-based OCR engine. Better for noisy/messy images like phone photos.
//! Uses tesseract-static crate for static linking (no system dependencies).
//! Downloads tessdata (training data) automatically unless a tessdata
//! directory is configured.

use super::assets;
use crate::config::Config;
use crate::engine::{OcrEngine, OcrResult, RecognitionOptions};
use crate::error::OcrError;
use image::DynamicImage;
use tesseract_static::tesseract::Tesseract;

const WHITELIST_VARIABLE: &str = "tessedit_char_whitelist";

/// Tesseract OCR Engine
pub struct LeptessEngine {
    tessdata_path: String,
    options: RecognitionOptions,
}

impl LeptessEngine {
    pub fn new(config: &Config) -> Result<Self, OcrError> {
        let options = config.recognition.clone();

        let tessdata_path = match &config.tessdata_path {
            Some(path) => path.clone(),
            None => ensure_tessdata_available(&options.language)?,
        };

        // Fail at startup rather than on the first request
        let engine = Self {
            tessdata_path,
            options,
        };
        drop(engine.session()?);

        tracing::info!(
            "Leptess engine initialized (tessdata: {}, language: {})",
            engine.tessdata_path,
            engine.options.language
        );

        Ok(engine)
    }

    /// Fresh Tesseract instance with language and whitelist applied
    fn session(&self) -> Result<Tesseract, OcrError> {
        let tess = Tesseract::new(Some(&self.tessdata_path), Some(&self.options.language))
            .map_err(|e| {
                OcrError::InitializationError(format!("Failed to initialize Tesseract: {}", e))
            })?;

        if self.options.char_whitelist.is_empty() {
            return Ok(tess);
        }

        tess.set_variable(WHITELIST_VARIABLE, &self.options.char_whitelist)
            .map_err(|e| {
                OcrError::InitializationError(format!("Failed to set character whitelist: {}", e))
            })
    }
}

impl OcrEngine for LeptessEngine {
    fn name(&self) -> &'static str {
        "leptess"
    }

    fn description(&self) -> &'static str {
        "Tesseract OCR engine - better for noisy/messy images like phone photos"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let rgb_img = image.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        // BMP is always supported by leptonica
        let mut bmp_data = Vec::new();
        rgb_img
            .write_to(&mut std::io::Cursor::new(&mut bmp_data), image::ImageFormat::Bmp)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to convert to BMP: {}", e)))?;

        tracing::debug!(
            "Processing image: {}x{}, BMP size: {} bytes",
            width,
            height,
            bmp_data.len()
        );

        let tess = self
            .session()
            .map_err(|e| OcrError::ProcessingError(e.to_string()))?;

        let tess = tess.set_image_from_mem(&bmp_data).map_err(|e| {
            OcrError::ProcessingError(format!(
                "Failed to set image ({}x{}, {} bytes): {}",
                width,
                height,
                bmp_data.len(),
                e
            ))
        })?;

        let mut tess = tess
            .recognize()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to recognize text: {}", e)))?;

        let text = tess
            .get_text()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to get text: {}", e)))?;

        // Tesseract reports 0-100
        let confidence = tess.mean_text_conf() as f32 / 100.0;

        Ok(OcrResult {
            text,
            confidence: Some(confidence.clamp(0.0, 1.0)),
        })
    }

    fn supported_languages(&self) -> Vec<String> {
        vec![self.options.language.clone()]
    }
}

/// Ensure traineddata for `language` is cached and return the tessdata directory
fn ensure_tessdata_available(language: &str) -> Result<String, OcrError> {
    let cache_dir = assets::cache_dir(Some("tessdata"))?;
    let traineddata_file = format!("{}.traineddata", language);

    assets::ensure_downloaded(&cache_dir, &tessdata_url(language), &traineddata_file)?;

    // Tesseract expects the directory, not the file
    cache_dir
        .to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| OcrError::InitializationError("Invalid tessdata path".to_string()))
}

/// tessdata_fast keeps downloads small
fn tessdata_url(language: &str) -> String {
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tessdata_url() {
        assert_eq!(
            tessdata_url("eng"),
            "https://github.com/tesseract-ocr/tessdata_fast/raw/main/eng.traineddata"
        );
    }
}
