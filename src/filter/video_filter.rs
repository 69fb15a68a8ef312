use crate::core::ocr::OcrError;
use crate::core::video::{PixelFormat, VideoFrame};

/// Properties of the negotiated input link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputProps {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
}

impl InputProps {
    pub fn of(frame: &VideoFrame) -> Self {
        Self {
            format: frame.format(),
            width: frame.width(),
            height: frame.height(),
        }
    }
}

/// 滤镜接口 - 由 `FilterPipeline` 驱动
///
/// One frame in, one frame out. The pipeline calls `config_input` before the
/// first frame and again whenever the input geometry changes, and `uninit`
/// exactly once at the end of the stream.
pub trait VideoFilter {
    fn name(&self) -> &'static str;

    fn supported_formats(&self) -> &[PixelFormat];

    fn config_input(&mut self, input: &InputProps) -> Result<(), OcrError>;

    fn filter_frame(&mut self, frame: VideoFrame) -> Result<VideoFrame, OcrError>;

    fn uninit(&mut self);
}
