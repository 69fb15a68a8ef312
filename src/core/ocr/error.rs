use thiserror::Error;

use crate::core::video::PixelFormat;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Failed to init OCR engine for language '{language}': {reason}")]
    EngineInit { language: String, reason: String },
    #[error("Engine rejected variable {variable}")]
    EngineConfig { variable: String },
    #[error("Recognition failed: {0}")]
    Recognition(String),
    #[error("Invalid option: {0}")]
    InvalidOption(String),
    #[error("Config parse error: {0}")]
    Config(#[from] json5::Error),
    #[error("Unsupported pixel format: {0:?}")]
    UnsupportedFormat(PixelFormat),
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
    #[error("Filter input not configured")]
    NotConfigured,
    #[error("Filter already finished")]
    AlreadyFinished,
}
