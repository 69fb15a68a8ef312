use std::time::Duration;

use image::GrayImage;

use super::format::PixelFormat;
use super::metadata::FrameMetadata;
use crate::core::ocr::OcrError;

/// 单个 8 位数据平面
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    pub data: Vec<u8>,
    /// 每行字节数（可能大于行宽，含填充）
    pub stride: usize,
}

impl Plane {
    pub fn new(data: Vec<u8>, stride: usize) -> Self {
        Self { data, stride }
    }

    /// Tightly packed plane, stride equals row width.
    pub fn packed(data: Vec<u8>, width: usize) -> Self {
        Self {
            data,
            stride: width,
        }
    }
}

/// 帧数据结构
///
/// 像素数据在滤镜链中不会被修改，只有 `metadata` 可写。
#[derive(Debug, Clone)]
pub struct VideoFrame {
    format: PixelFormat,
    width: u32,
    height: u32,
    planes: Vec<Plane>,
    pub timestamp: Duration,
    pub frame_number: u64,
    pub metadata: FrameMetadata,
}

impl VideoFrame {
    pub fn new(
        format: PixelFormat,
        width: u32,
        height: u32,
        planes: Vec<Plane>,
        timestamp_ms: u64,
        frame_number: u64,
    ) -> Result<Self, OcrError> {
        if planes.len() != format.plane_count() {
            return Err(OcrError::InvalidFrame(format!(
                "{:?} needs {} planes, got {}",
                format,
                format.plane_count(),
                planes.len()
            )));
        }

        for (i, plane) in planes.iter().enumerate() {
            let (row_bytes, rows) = format.plane_dimensions(i, width, height);
            if plane.stride < row_bytes {
                return Err(OcrError::InvalidFrame(format!(
                    "plane {} stride {} is smaller than row width {}",
                    i, plane.stride, row_bytes
                )));
            }
            if plane.data.len() < plane.stride * rows {
                return Err(OcrError::InvalidFrame(format!(
                    "plane {} holds {} bytes, {} rows of stride {} need {}",
                    i,
                    plane.data.len(),
                    rows,
                    plane.stride,
                    plane.stride * rows
                )));
            }
        }

        Ok(Self {
            format,
            width,
            height,
            planes,
            timestamp: Duration::from_millis(timestamp_ms),
            frame_number,
            metadata: FrameMetadata::new(),
        })
    }

    /// Single-plane GRAY8 frame with stride equal to width.
    pub fn gray(width: u32, height: u32, data: Vec<u8>) -> Result<Self, OcrError> {
        Self::new(
            PixelFormat::Gray8,
            width,
            height,
            vec![Plane::packed(data, width as usize)],
            0,
            0,
        )
    }

    pub fn from_gray_image(
        img: GrayImage,
        timestamp_ms: u64,
        frame_number: u64,
    ) -> Result<Self, OcrError> {
        let (width, height) = img.dimensions();
        Self::new(
            PixelFormat::Gray8,
            width,
            height,
            vec![Plane::packed(img.into_raw(), width as usize)],
            timestamp_ms,
            frame_number,
        )
    }

    /// YUV420P frame from tightly packed planes (as delivered by most decoders).
    pub fn yuv420p(
        width: u32,
        height: u32,
        y_plane: Vec<u8>,
        u_plane: Vec<u8>,
        v_plane: Vec<u8>,
        timestamp_ms: u64,
        frame_number: u64,
    ) -> Result<Self, OcrError> {
        let chroma_w = (width as usize).div_ceil(2);
        Self::new(
            PixelFormat::Yuv420p,
            width,
            height,
            vec![
                Plane::packed(y_plane, width as usize),
                Plane::packed(u_plane, chroma_w),
                Plane::packed(v_plane, chroma_w),
            ],
            timestamp_ms,
            frame_number,
        )
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// 第一平面（灰度 / 亮度）
    pub fn luma(&self) -> &Plane {
        &self.planes[0]
    }
}

/// 帧元数据（轻量级，用于传递信息）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub timestamp_ms: u64,
    pub frame_number: u64,
}

impl FrameInfo {
    pub fn from_frame(frame: &VideoFrame) -> Self {
        Self {
            format: frame.format,
            width: frame.width,
            height: frame.height,
            timestamp_ms: frame.timestamp.as_millis() as u64,
            frame_number: frame.frame_number,
        }
    }
}
