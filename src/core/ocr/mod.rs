pub mod config;
pub mod engine;
pub mod error;
pub mod region;
pub mod result;
pub mod scripted;
#[cfg(feature = "tesseract")]
pub mod tesseract;

pub use config::{OcrConfig, DEFAULT_LANGUAGE, DEFAULT_WHITELIST};
pub use engine::{
    RecognitionEngine, BLACKLIST_VARIABLE, CONFIDENCE_SENTINEL, WHITELIST_VARIABLE,
};
pub use error::OcrError;
pub use region::Region;
pub use result::{OcrResult, CONFIDENCE_KEY, TEXT_KEY};
pub use scripted::{CallLog, EngineCall, Script, ScriptedEngine};
#[cfg(feature = "tesseract")]
pub use tesseract::TesseractEngine;
