//! 文字识别引擎能力接口
//!
//! The filter owns exactly one engine for its whole lifetime and drives it
//! from one thread at a time. Buffers handed back by the engine are owned
//! values, so releasing them is a plain drop on every exit path.

use std::path::Path;

use super::error::OcrError;
use super::region::Region;

/// Terminates the per-word confidence sequence.
pub const CONFIDENCE_SENTINEL: i32 = -1;

pub const WHITELIST_VARIABLE: &str = "tessedit_char_whitelist";
pub const BLACKLIST_VARIABLE: &str = "tessedit_char_blacklist";

pub trait RecognitionEngine: Send {
    /// Load trained data for `language`, looking under `data_path` when given.
    fn init(&mut self, data_path: Option<&Path>, language: &str) -> Result<(), OcrError>;

    /// Returns `false` when the engine rejects the variable or its value.
    fn set_variable(&mut self, name: &str, value: &str) -> bool;

    /// Recognize the text inside `region` of an 8-bit image.
    ///
    /// `image` starts at the top-left pixel and rows are `stride` bytes apart.
    fn recognize_rect(
        &mut self,
        image: &[u8],
        bytes_per_pixel: u32,
        stride: usize,
        region: Region,
    ) -> Result<String, OcrError>;

    /// Confidences of the words found by the last `recognize_rect`, in
    /// recognition order and terminated by [`CONFIDENCE_SENTINEL`].
    fn all_word_confidences(&mut self) -> Result<Vec<i32>, OcrError>;

    /// Release recognizer state ahead of destruction.
    fn end(&mut self);

    fn version(&self) -> String {
        "unknown".to_string()
    }
}

impl<E: RecognitionEngine + ?Sized> RecognitionEngine for Box<E> {
    fn init(&mut self, data_path: Option<&Path>, language: &str) -> Result<(), OcrError> {
        (**self).init(data_path, language)
    }

    fn set_variable(&mut self, name: &str, value: &str) -> bool {
        (**self).set_variable(name, value)
    }

    fn recognize_rect(
        &mut self,
        image: &[u8],
        bytes_per_pixel: u32,
        stride: usize,
        region: Region,
    ) -> Result<String, OcrError> {
        (**self).recognize_rect(image, bytes_per_pixel, stride, region)
    }

    fn all_word_confidences(&mut self) -> Result<Vec<i32>, OcrError> {
        (**self).all_word_confidences()
    }

    fn end(&mut self) {
        (**self).end()
    }

    fn version(&self) -> String {
        (**self).version()
    }
}

/// Confidences before the sentinel; anything after it is ignored.
pub fn confidences_before_sentinel(seq: &[i32]) -> impl Iterator<Item = i32> + '_ {
    seq.iter().copied().take_while(|&c| c != CONFIDENCE_SENTINEL)
}
