use serde::Serialize;

use crate::core::video::FrameMetadata;

pub const TEXT_KEY: &str = "lavfi.ocr.text";
pub const CONFIDENCE_KEY: &str = "lavfi.ocr.confidence";

/// Typed view of the OCR metadata attached to one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OcrResult {
    pub text: String,
    pub confidences: Vec<i32>,
}

impl OcrResult {
    /// `None` when the frame never went through the OCR filter.
    pub fn from_metadata(metadata: &FrameMetadata) -> Option<Self> {
        let text = metadata.get(TEXT_KEY)?.to_string();
        let confidences = metadata
            .get(CONFIDENCE_KEY)
            .map(|v| {
                v.split_whitespace()
                    .filter_map(|c| c.parse().ok())
                    .collect()
            })
            .unwrap_or_default();

        Some(Self { text, confidences })
    }
}
