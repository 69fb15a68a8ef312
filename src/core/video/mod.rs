pub mod format;
pub mod frame;
pub mod metadata;

pub use format::{PixelFormat, LUMA_PLANAR_FORMATS};
pub use frame::{FrameInfo, Plane, VideoFrame};
pub use metadata::FrameMetadata;
