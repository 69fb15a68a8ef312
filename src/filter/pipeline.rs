use log::{debug, info};

use super::video_filter::{InputProps, VideoFilter};
use crate::core::ocr::OcrError;
use crate::core::video::{PixelFormat, VideoFrame};

/// 滤镜链驱动器
///
/// Owns one filter, negotiates its input, feeds it frames one at a time in
/// arrival order and tears it down exactly once.
pub struct FilterPipeline<F: VideoFilter> {
    filter: F,
    input: Option<InputProps>,
    frame_count: u64,
    finished: bool,
}

impl<F: VideoFilter> FilterPipeline<F> {
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            input: None,
            frame_count: 0,
            finished: false,
        }
    }

    /// Check `format` against the filter's list and configure its input.
    pub fn negotiate(
        &mut self,
        format: PixelFormat,
        width: u32,
        height: u32,
    ) -> Result<(), OcrError> {
        if self.finished {
            return Err(OcrError::AlreadyFinished);
        }
        if !self.filter.supported_formats().contains(&format) {
            return Err(OcrError::UnsupportedFormat(format));
        }

        let props = InputProps {
            format,
            width,
            height,
        };
        self.filter.config_input(&props)?;
        debug!(
            "{}: input negotiated as {:?} {}x{}",
            self.filter.name(),
            format,
            width,
            height
        );
        self.input = Some(props);
        Ok(())
    }

    /// Run one frame through the filter.
    ///
    /// The first frame negotiates the input if nobody did; a size change
    /// re-runs the negotiation, a format change is refused.
    pub fn push(&mut self, frame: VideoFrame) -> Result<VideoFrame, OcrError> {
        if self.finished {
            return Err(OcrError::AlreadyFinished);
        }

        let props = InputProps::of(&frame);
        let current = self.input;
        match current {
            None => self.negotiate(props.format, props.width, props.height)?,
            Some(current) if current.format != props.format => {
                return Err(OcrError::UnsupportedFormat(props.format));
            }
            Some(current) if current != props => {
                self.negotiate(props.format, props.width, props.height)?
            }
            Some(_) => {}
        }

        let out = self.filter.filter_frame(frame)?;
        self.frame_count += 1;
        Ok(out)
    }

    /// Check a batch against what `push` would refuse, before any frame runs.
    ///
    /// Every format must be supported and match the negotiated one (or the
    /// first frame's when nothing was negotiated yet).
    pub fn check_batch(&self, frames: &[VideoFrame]) -> Result<(), OcrError> {
        if self.finished {
            return Err(OcrError::AlreadyFinished);
        }
        let Some(expected) = self
            .input
            .map(|i| i.format)
            .or_else(|| frames.first().map(VideoFrame::format))
        else {
            return Ok(());
        };

        for frame in frames {
            let format = frame.format();
            if !self.filter.supported_formats().contains(&format) || format != expected {
                debug!(
                    "{}: batch refused at frame {} ({:?})",
                    self.filter.name(),
                    frame.frame_number,
                    format
                );
                return Err(OcrError::UnsupportedFormat(format));
            }
        }
        Ok(())
    }

    /// Run a batch all-or-nothing: a batch `push` would refuse part-way is
    /// rejected before the first frame reaches the filter.
    pub fn process_batch(&mut self, frames: Vec<VideoFrame>) -> Result<Vec<VideoFrame>, OcrError> {
        self.check_batch(&frames)?;
        frames.into_iter().map(|f| self.push(f)).collect()
    }

    /// Tear the filter down; safe to call on a stream that carried no frames.
    pub fn finish(&mut self) -> Result<(), OcrError> {
        if self.finished {
            return Err(OcrError::AlreadyFinished);
        }
        self.filter.uninit();
        self.finished = true;
        info!(
            "✅ {}: finished after {} frames",
            self.filter.name(),
            self.frame_count
        );
        Ok(())
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn input(&self) -> Option<InputProps> {
        self.input
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }
}

impl<F: VideoFilter> Drop for FilterPipeline<F> {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ocr::{
        EngineCall, OcrConfig, OcrResult, Region, Script, ScriptedEngine, CONFIDENCE_KEY, TEXT_KEY,
    };
    use crate::core::video::Plane;
    use crate::filter::OcrFilter;

    fn create_test_frame(width: u32, height: u32, fill: u8, frame_number: u64) -> VideoFrame {
        let mut frame = VideoFrame::gray(width, height, vec![fill; (width * height) as usize]).unwrap();
        frame.frame_number = frame_number;
        frame
    }

    fn pipeline_with(scripts: Vec<Script>) -> (FilterPipeline<OcrFilter<ScriptedEngine>>, crate::core::ocr::CallLog) {
        let engine = ScriptedEngine::with_scripts(scripts);
        let log = engine.call_log();
        let filter = OcrFilter::new(OcrConfig::default(), engine).unwrap();
        (FilterPipeline::new(filter), log)
    }

    #[test]
    fn test_pipeline_preserves_order() {
        let scripts = (1..=5).map(|i| Script::text(&format!("T{}", i), &[i * 10])).collect();
        let (mut pipeline, _) = pipeline_with(scripts);

        let frames = (1..=5).map(|i| create_test_frame(64, 32, i as u8, i)).collect();
        let out = pipeline.process_batch(frames).unwrap();

        assert_eq!(out.len(), 5);
        for (i, frame) in out.iter().enumerate() {
            let n = i as u64 + 1;
            assert_eq!(frame.frame_number, n);
            let result = OcrResult::from_metadata(&frame.metadata).unwrap();
            assert_eq!(result.text, format!("T{}", n));
            assert_eq!(result.confidences, vec![n as i32 * 10]);
        }
        assert_eq!(pipeline.frame_count(), 5);
    }

    #[test]
    fn test_rejects_unsupported_format() {
        let (mut pipeline, _) = pipeline_with(vec![]);
        assert!(matches!(
            pipeline.negotiate(PixelFormat::Rgba, 64, 64),
            Err(OcrError::UnsupportedFormat(PixelFormat::Rgba))
        ));

        let frame = VideoFrame::new(
            PixelFormat::Rgb24,
            4,
            4,
            vec![Plane::packed(vec![0u8; 48], 12)],
            0,
            0,
        )
        .unwrap();
        assert!(matches!(
            pipeline.push(frame),
            Err(OcrError::UnsupportedFormat(_))
        ));
        assert_eq!(pipeline.frame_count(), 0);
    }

    #[test]
    fn test_mixed_batch_rejected_up_front() {
        let (mut pipeline, log) = pipeline_with(vec![Script::text("A", &[90])]);
        let rgba = VideoFrame::new(
            PixelFormat::Rgba,
            2,
            2,
            vec![Plane::packed(vec![0u8; 16], 8)],
            0,
            1,
        )
        .unwrap();

        let result = pipeline.process_batch(vec![create_test_frame(8, 8, 0, 0), rgba]);

        assert!(matches!(result, Err(OcrError::UnsupportedFormat(PixelFormat::Rgba))));
        assert_eq!(pipeline.frame_count(), 0);
        assert!(pipeline.input().is_none());
        assert_eq!(
            log.count(|c| matches!(c, EngineCall::RecognizeRect { .. })),
            0
        );
    }

    #[test]
    fn test_batch_format_must_match_negotiated() {
        let (mut pipeline, _) = pipeline_with(vec![]);
        pipeline.negotiate(PixelFormat::Yuv420p, 8, 8).unwrap();

        assert!(matches!(
            pipeline.check_batch(&[create_test_frame(8, 8, 0, 0)]),
            Err(OcrError::UnsupportedFormat(PixelFormat::Gray8))
        ));
        assert!(pipeline.check_batch(&[]).is_ok());
    }

    #[test]
    fn test_accepts_all_luma_formats() {
        let (mut pipeline, _) = pipeline_with(vec![]);
        for format in crate::core::video::LUMA_PLANAR_FORMATS {
            assert!(pipeline.negotiate(*format, 320, 240).is_ok());
        }
    }

    #[test]
    fn test_geometry_change_reconfigures() {
        let (mut pipeline, _) = pipeline_with(vec![]);

        pipeline.push(create_test_frame(640, 480, 0, 1)).unwrap();
        assert_eq!(
            pipeline.filter().resolved_region(),
            Some(Region::new(0, 0, 640, 480))
        );

        pipeline.push(create_test_frame(320, 240, 0, 2)).unwrap();
        assert_eq!(
            pipeline.filter().resolved_region(),
            Some(Region::new(0, 0, 320, 240))
        );
        assert_eq!(pipeline.input().map(|i| i.width), Some(320));
    }

    #[test]
    fn test_format_change_refused() {
        let (mut pipeline, _) = pipeline_with(vec![]);
        pipeline.negotiate(PixelFormat::Yuv420p, 64, 64).unwrap();
        assert!(matches!(
            pipeline.push(create_test_frame(64, 64, 0, 1)),
            Err(OcrError::UnsupportedFormat(PixelFormat::Gray8))
        ));
    }

    #[test]
    fn test_metadata_written_for_every_frame() {
        let (mut pipeline, _) = pipeline_with(vec![Script::text("HELLO", &[91, 88])]);
        let a = pipeline.push(create_test_frame(32, 32, 1, 1)).unwrap();
        let b = pipeline.push(create_test_frame(32, 32, 2, 2)).unwrap();

        assert_eq!(a.metadata.get(CONFIDENCE_KEY), Some("91 88 "));
        assert_eq!(b.metadata.get(TEXT_KEY), Some(""));
        assert!(!b.metadata.contains_key(CONFIDENCE_KEY));
    }

    #[test]
    fn test_finish_empty_stream() {
        let (mut pipeline, log) = pipeline_with(vec![]);
        pipeline.finish().unwrap();

        assert!(pipeline.is_finished());
        assert_eq!(log.count(|c| *c == EngineCall::End), 1);
        assert!(matches!(pipeline.finish(), Err(OcrError::AlreadyFinished)));
        assert!(matches!(
            pipeline.push(create_test_frame(8, 8, 0, 0)),
            Err(OcrError::AlreadyFinished)
        ));

        drop(pipeline);
        assert_eq!(log.count(|c| *c == EngineCall::End), 1);
        assert_eq!(log.count(|c| *c == EngineCall::Destroy), 1);
    }

    #[test]
    fn test_drop_tears_down() {
        let (pipeline, log) = pipeline_with(vec![]);
        drop(pipeline);
        assert_eq!(log.count(|c| *c == EngineCall::End), 1);
    }
}
