use serde::{Deserialize, Serialize};

/// 像素格式
///
/// 只有平面格式可以直接把第一平面交给识别引擎，打包格式仅用于协商时拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    Gray8,
    Yuv410p,
    Yuv411p,
    Yuv420p,
    Yuv422p,
    Yuv440p,
    Yuv444p,
    Yuvj411p,
    Yuvj420p,
    Yuvj422p,
    Yuvj440p,
    Yuvj444p,
    Yuva420p,
    Yuva422p,
    Yuva444p,
    Rgb24,
    Rgba,
    Nv12,
}

/// Formats whose first plane is 8-bit luma (or gray) with its own stride.
pub const LUMA_PLANAR_FORMATS: &[PixelFormat] = &[
    PixelFormat::Gray8,
    PixelFormat::Yuv410p,
    PixelFormat::Yuv411p,
    PixelFormat::Yuv420p,
    PixelFormat::Yuv422p,
    PixelFormat::Yuv440p,
    PixelFormat::Yuv444p,
    PixelFormat::Yuvj420p,
    PixelFormat::Yuvj422p,
    PixelFormat::Yuvj440p,
    PixelFormat::Yuvj444p,
    PixelFormat::Yuvj411p,
    PixelFormat::Yuva444p,
    PixelFormat::Yuva422p,
    PixelFormat::Yuva420p,
];

impl PixelFormat {
    /// Number of data planes a frame of this format carries.
    pub fn plane_count(&self) -> usize {
        use PixelFormat::*;
        match self {
            Gray8 | Rgb24 | Rgba => 1,
            Nv12 => 2,
            Yuva420p | Yuva422p | Yuva444p => 4,
            _ => 3,
        }
    }

    /// Chroma subsampling as (log2 horizontal, log2 vertical).
    pub fn chroma_shift(&self) -> (u32, u32) {
        use PixelFormat::*;
        match self {
            Gray8 | Rgb24 | Rgba | Yuv444p | Yuvj444p | Yuva444p => (0, 0),
            Yuv410p => (2, 2),
            Yuv411p | Yuvj411p => (2, 0),
            Yuv420p | Yuvj420p | Yuva420p | Nv12 => (1, 1),
            Yuv422p | Yuvj422p | Yuva422p => (1, 0),
            Yuv440p | Yuvj440p => (0, 1),
        }
    }

    /// Bytes per pixel of the first plane.
    pub fn first_plane_bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::Rgb24 => 3,
            PixelFormat::Rgba => 4,
            _ => 1,
        }
    }

    /// Minimum (bytes per row, rows) of plane `index` for a `width`x`height` picture.
    pub fn plane_dimensions(&self, index: usize, width: u32, height: u32) -> (usize, usize) {
        let bpp = self.first_plane_bytes_per_pixel() as usize;
        let (sx, sy) = self.chroma_shift();
        let is_chroma = match self {
            PixelFormat::Nv12 => index == 1,
            _ => index == 1 || index == 2,
        };

        if index == 0 || !is_chroma {
            // luma / gray / alpha / packed
            return (width as usize * bpp, height as usize);
        }

        let cw = ceil_shift(width, sx) as usize;
        let ch = ceil_shift(height, sy) as usize;
        match self {
            // interleaved UV
            PixelFormat::Nv12 => (cw * 2, ch),
            _ => (cw, ch),
        }
    }
}

fn ceil_shift(value: u32, shift: u32) -> u32 {
    (value + (1 << shift) - 1) >> shift
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_formats() {
        assert_eq!(LUMA_PLANAR_FORMATS.len(), 15);
        assert!(LUMA_PLANAR_FORMATS.contains(&PixelFormat::Gray8));
        assert!(LUMA_PLANAR_FORMATS.contains(&PixelFormat::Yuva420p));
        assert!(!LUMA_PLANAR_FORMATS.contains(&PixelFormat::Rgba));
        assert!(!LUMA_PLANAR_FORMATS.contains(&PixelFormat::Nv12));
    }

    #[test]
    fn test_plane_dimensions() {
        assert_eq!(PixelFormat::Yuv420p.plane_dimensions(0, 641, 481), (641, 481));
        assert_eq!(PixelFormat::Yuv420p.plane_dimensions(1, 641, 481), (321, 241));
        assert_eq!(PixelFormat::Yuv410p.plane_dimensions(2, 640, 480), (160, 120));
        assert_eq!(PixelFormat::Yuva422p.plane_dimensions(3, 640, 480), (640, 480));
        assert_eq!(PixelFormat::Rgba.plane_dimensions(0, 10, 10), (40, 10));
    }
}
