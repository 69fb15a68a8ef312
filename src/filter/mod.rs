//! 视频滤镜 - 对帧的子区域做 OCR 并写入帧元数据
//!
//! 流程：
//! 1. 协商 - 只接受首平面为 8 位亮度的平面格式
//! 2. 配置 - 输入尺寸确定（或变化）时解析识别区域并缓存
//! 3. 逐帧 - 调用识别引擎，把文字和逐词置信度写入元数据，像素不变
//! 4. 结束 - 释放识别引擎（只释放一次）

pub mod ocr_filter;
pub mod pipeline;
pub mod video_filter;

pub use ocr_filter::OcrFilter;
pub use pipeline::FilterPipeline;
pub use video_filter::{InputProps, VideoFilter};
