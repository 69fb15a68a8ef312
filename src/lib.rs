pub mod api;
pub mod core;
pub mod filter;

pub use crate::api::{FrameText, OcrStats, VideoOcr};
pub use crate::core::ocr::{OcrConfig, OcrError, OcrResult, RecognitionEngine, Region};
pub use crate::core::video::{FrameMetadata, PixelFormat, Plane, VideoFrame};
pub use crate::filter::{FilterPipeline, OcrFilter, VideoFilter};

pub fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("frame_ocr"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        // already initialized by the host is fine
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init();
    }
}
