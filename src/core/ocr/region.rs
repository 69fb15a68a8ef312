use serde::{Deserialize, Serialize};

/// 识别子区域，`w == 0` / `h == 0` 表示延伸到画面边缘
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Resolve the region against a `pic_w` x `pic_h` picture.
    ///
    /// An origin outside the picture falls back to 0, and a zero or
    /// overflowing extent is cut at the picture edge.
    pub fn clamp(&self, pic_w: u32, pic_h: u32) -> Region {
        let x = if self.x >= pic_w { 0 } else { self.x };
        let y = if self.y >= pic_h { 0 } else { self.y };

        let w = if self.w == 0 || x as u64 + self.w as u64 > pic_w as u64 {
            pic_w - x
        } else {
            self.w
        };
        let h = if self.h == 0 || y as u64 + self.h as u64 > pic_h as u64 {
            pic_h - y
        } else {
            self.h
        };

        Region { x, y, w, h }
    }

    /// Whether resolving changed something the caller explicitly asked for.
    ///
    /// A zero extent means "to the edge", so growing it is not a correction.
    pub fn was_corrected(requested: &Region, resolved: &Region) -> bool {
        resolved.x != requested.x
            || resolved.y != requested.y
            || (requested.w != 0 && resolved.w != requested.w)
            || (requested.h != 0 && resolved.h != requested.h)
    }

    pub fn right(&self) -> u64 {
        self.x as u64 + self.w as u64
    }

    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.h as u64
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x={}, y={}, w={}, h={}", self.x, self.y, self.w, self.h)
    }
}
