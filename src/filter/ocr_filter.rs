//! OCR 滤镜：在帧的子区域上做文字识别，把结果写入帧元数据

use log::{debug, error, info, trace, warn};

use super::video_filter::{InputProps, VideoFilter};
use crate::core::ocr::engine::confidences_before_sentinel;
use crate::core::ocr::{
    OcrConfig, OcrError, RecognitionEngine, Region, BLACKLIST_VARIABLE, CONFIDENCE_KEY, TEXT_KEY,
    WHITELIST_VARIABLE,
};
use crate::core::video::{Plane, PixelFormat, VideoFrame, LUMA_PLANAR_FORMATS};

pub struct OcrFilter<E: RecognitionEngine> {
    config: OcrConfig,
    engine: E,
    /// Region resolved against `input_size`.
    resolved: Option<Region>,
    input_size: Option<(u32, u32)>,
    corrected: bool,
    ended: bool,
}

impl<E: RecognitionEngine> OcrFilter<E> {
    /// Initialize `engine` and install the character lists.
    ///
    /// Either everything succeeds or the engine is ended and dropped.
    pub fn new(config: OcrConfig, engine: E) -> Result<Self, OcrError> {
        config.validate()?;

        let mut filter = Self {
            config,
            engine,
            resolved: None,
            input_size: None,
            corrected: false,
            ended: false,
        };
        filter.setup()?;

        debug!("OCR engine version: {}", filter.engine.version());
        info!("🎬 OcrFilter: created (language {})", filter.config.language);
        Ok(filter)
    }

    fn setup(&mut self) -> Result<(), OcrError> {
        let language = self.config.language.clone();
        self.engine
            .init(self.config.data_path(), &language)
            .map_err(|e| {
                error!("❌ failed to init OCR engine: {}", e);
                match e {
                    OcrError::EngineInit { .. } => e,
                    other => OcrError::EngineInit {
                        language: language.clone(),
                        reason: other.to_string(),
                    },
                }
            })?;

        for (variable, value) in [
            (WHITELIST_VARIABLE, self.config.whitelist.as_str()),
            (BLACKLIST_VARIABLE, self.config.blacklist.as_str()),
        ] {
            if !self.engine.set_variable(variable, value) {
                error!("❌ failed to set {}", variable);
                return Err(OcrError::EngineConfig {
                    variable: variable.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    pub fn resolved_region(&self) -> Option<Region> {
        self.resolved
    }

    /// Whether the last `configure` had to move or shrink the requested region.
    pub fn region_corrected(&self) -> bool {
        self.corrected
    }

    /// Resolve the requested region for a `pic_w` x `pic_h` input and cache it.
    pub fn configure(&mut self, pic_w: u32, pic_h: u32) -> Region {
        let requested = self.config.region;
        let resolved = requested.clamp(pic_w, pic_h);

        self.corrected = Region::was_corrected(&requested, &resolved);
        if self.corrected {
            warn!("config error, subregion changed to {}", resolved);
        }
        debug!("OCR region for {}x{}: {}", pic_w, pic_h, resolved);

        self.resolved = Some(resolved);
        self.input_size = Some((pic_w, pic_h));
        resolved
    }

    /// Recognize the cached region of `frame` and record the result in its metadata.
    ///
    /// A frame whose size differs from the configured input re-resolves the
    /// region first. A failing recognition leaves empty text and no
    /// confidences; pixel data is never touched.
    pub fn annotate(&mut self, frame: &mut VideoFrame) -> Result<(), OcrError> {
        let configured = self.input_size.ok_or(OcrError::NotConfigured)?;
        let size = (frame.width(), frame.height());
        let region = match self.resolved {
            Some(region) if configured == size => region,
            _ => {
                debug!(
                    "frame {}: size {}x{} differs from configured {}x{}",
                    frame.frame_number, size.0, size.1, configured.0, configured.1
                );
                self.configure(size.0, size.1)
            }
        };

        let (text, confidences) = if region.is_empty() {
            trace!("frame {}: empty region, skipping recognition", frame.frame_number);
            (String::new(), Vec::new())
        } else {
            match self.recognize(frame.luma(), region) {
                Ok(result) => result,
                Err(e) => {
                    warn!("⚠️ frame {}: {}", frame.frame_number, e);
                    (String::new(), Vec::new())
                }
            }
        };

        let metadata = &mut frame.metadata;
        metadata.set(TEXT_KEY, &text);
        metadata.remove(CONFIDENCE_KEY);
        for conf in confidences_before_sentinel(&confidences) {
            metadata.append(CONFIDENCE_KEY, &format!("{} ", conf));
        }

        debug!(
            "frame {}: {} chars, {} words",
            frame.frame_number,
            text.len(),
            confidences_before_sentinel(&confidences).count()
        );
        Ok(())
    }

    fn recognize(&mut self, plane: &Plane, region: Region) -> Result<(String, Vec<i32>), OcrError> {
        let text = self.engine.recognize_rect(&plane.data, 1, plane.stride, region)?;
        let confidences = self.engine.all_word_confidences()?;
        Ok((text, confidences))
    }

    /// End the engine and release it.
    pub fn teardown(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.ended {
            return;
        }
        self.engine.end();
        self.ended = true;
        info!("🗑️ OcrFilter: released");
    }
}

impl<E: RecognitionEngine> VideoFilter for OcrFilter<E> {
    fn name(&self) -> &'static str {
        "ocr"
    }

    fn supported_formats(&self) -> &[PixelFormat] {
        LUMA_PLANAR_FORMATS
    }

    fn config_input(&mut self, input: &InputProps) -> Result<(), OcrError> {
        self.configure(input.width, input.height);
        Ok(())
    }

    fn filter_frame(&mut self, mut frame: VideoFrame) -> Result<VideoFrame, OcrError> {
        self.annotate(&mut frame)?;
        Ok(frame)
    }

    fn uninit(&mut self) {
        self.shutdown();
    }
}

impl<E: RecognitionEngine> Drop for OcrFilter<E> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
