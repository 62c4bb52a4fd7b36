//! Image preprocessing ahead of OCR
//!
//! A fixed two-step transform: average grayscale followed by a contrast
//! boost that halves dark tones. Every intermediate value goes back through
//! 8-bit storage, so the [`Quantize`] policy decides the exact output.

pub mod pipeline;
pub mod quantize;
pub mod steps;

pub use pipeline::{Pipeline, PreprocessingResult, Preset, StepTiming};
pub use quantize::Quantize;
