//! 视频 OCR 入口

use log::info;

use crate::core::ocr::{OcrConfig, OcrError, OcrResult, RecognitionEngine};
use crate::core::video::{FrameInfo, VideoFrame};
use crate::filter::{FilterPipeline, OcrFilter};

/// 单帧识别结果
#[derive(Debug, Clone, serde::Serialize)]
pub struct FrameText {
    pub frame_number: u64,
    pub timestamp_ms: u64,
    pub text: String,
    pub confidences: Vec<i32>,
}

/// 识别统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct OcrStats {
    pub processed_frames: u64,
    pub frames_with_text: u64,
}

/// 视频 OCR - 逐帧识别子区域文字
///
/// ```ignore
/// let mut ocr = VideoOcr::create("language=eng:y=400:h=80", Box::new(engine))?;
/// let frame = ocr.process(frame)?;
/// let text = frame.metadata.get("lavfi.ocr.text");
/// ocr.finish()?;
/// ```
pub struct VideoOcr {
    pipeline: FilterPipeline<OcrFilter<Box<dyn RecognitionEngine>>>,
    frames_with_text: u64,
}

impl VideoOcr {
    /// Build from filter arguments (`key=value` pairs separated by `:`).
    pub fn create(args: &str, engine: Box<dyn RecognitionEngine>) -> Result<Self, OcrError> {
        crate::init_logging();
        Self::with_config(OcrConfig::from_filter_args(args)?, engine)
    }

    pub fn from_json5(source: &str, engine: Box<dyn RecognitionEngine>) -> Result<Self, OcrError> {
        crate::init_logging();
        Self::with_config(OcrConfig::from_json5(source)?, engine)
    }

    #[cfg(feature = "tesseract")]
    pub fn with_tesseract(args: &str) -> Result<Self, OcrError> {
        let engine = crate::core::ocr::TesseractEngine::create()?;
        Self::create(args, Box::new(engine))
    }

    pub fn with_config(
        config: OcrConfig,
        engine: Box<dyn RecognitionEngine>,
    ) -> Result<Self, OcrError> {
        let filter = OcrFilter::new(config, engine)?;
        info!("🎬 VideoOcr: created");
        Ok(Self {
            pipeline: FilterPipeline::new(filter),
            frames_with_text: 0,
        })
    }

    /// Annotate one frame and hand it back.
    pub fn process(&mut self, frame: VideoFrame) -> Result<VideoFrame, OcrError> {
        let frame = self.pipeline.push(frame)?;
        let has_text = frame
            .metadata
            .get(crate::core::ocr::TEXT_KEY)
            .is_some_and(|t| !t.trim().is_empty());
        if has_text {
            self.frames_with_text += 1;
        }
        Ok(frame)
    }

    /// Annotate frames in order and return only the recognized text.
    ///
    /// The whole batch is checked first; a refused batch processes nothing.
    pub fn process_batch(&mut self, frames: Vec<VideoFrame>) -> Result<Vec<FrameText>, OcrError> {
        self.pipeline.check_batch(&frames)?;
        let mut results = Vec::with_capacity(frames.len());
        for frame in frames {
            let frame = self.process(frame)?;
            let info = FrameInfo::from_frame(&frame);
            let ocr = OcrResult::from_metadata(&frame.metadata).unwrap_or_default();
            results.push(FrameText {
                frame_number: info.frame_number,
                timestamp_ms: info.timestamp_ms,
                text: ocr.text,
                confidences: ocr.confidences,
            });
        }
        Ok(results)
    }

    pub fn stats(&self) -> OcrStats {
        OcrStats {
            processed_frames: self.pipeline.frame_count(),
            frames_with_text: self.frames_with_text,
        }
    }

    pub fn config(&self) -> &OcrConfig {
        self.pipeline.filter().config()
    }

    /// Release the engine. Dropping `VideoOcr` does the same.
    pub fn finish(mut self) -> Result<OcrStats, OcrError> {
        self.pipeline.finish()?;
        Ok(self.stats())
    }
}
