pub mod ocr;

pub use ocr::{FrameText, OcrStats, VideoOcr};
