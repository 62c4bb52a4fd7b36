//! Driving licence capture: upload validation, a fixed grayscale/contrast
//! preprocessing transform, and text extraction through a pluggable OCR
//! engine.

pub mod capture;
pub mod config;
pub mod data_uri;
pub mod engine;
pub mod engines;
pub mod error;
pub mod preprocessing;
pub mod server;
pub mod state;
pub mod upload;
