//! Tesseract backend over the C API exposed by `leptess::capi`.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::Path;
use std::ptr::NonNull;

use leptess::capi;
use log::{debug, info};

use super::engine::{RecognitionEngine, CONFIDENCE_SENTINEL};
use super::error::OcrError;
use super::region::Region;

/// Text buffer allocated by Tesseract, freed with `TessDeleteText`.
struct TessText(NonNull<c_char>);

impl TessText {
    fn to_string_lossy(&self) -> String {
        // SAFETY: Tesseract returns a NUL-terminated UTF-8 buffer.
        unsafe { CStr::from_ptr(self.0.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }
}

impl Drop for TessText {
    fn drop(&mut self) {
        unsafe { capi::TessDeleteText(self.0.as_ptr() as _) };
    }
}

/// Sentinel-terminated integer array, freed with `TessDeleteIntArray`.
struct TessIntArray(NonNull<c_int>);

impl TessIntArray {
    fn to_vec(&self) -> Vec<i32> {
        let mut out = Vec::new();
        let mut i = 0;
        loop {
            // SAFETY: the array is terminated by -1.
            let v = unsafe { *self.0.as_ptr().add(i) };
            out.push(v);
            if v == CONFIDENCE_SENTINEL {
                break;
            }
            i += 1;
        }
        out
    }
}

impl Drop for TessIntArray {
    fn drop(&mut self) {
        unsafe { capi::TessDeleteIntArray(self.0.as_ptr() as _) };
    }
}

/// Tesseract 实例（由单个滤镜独占）
pub struct TesseractEngine {
    handle: NonNull<capi::TessBaseAPI>,
    ended: bool,
}

// The handle is only ever touched through `&mut self`, never shared.
unsafe impl Send for TesseractEngine {}

impl TesseractEngine {
    pub fn create() -> Result<Self, OcrError> {
        let raw = unsafe { capi::TessBaseAPICreate() };
        let handle = NonNull::new(raw).ok_or_else(|| OcrError::EngineInit {
            language: String::new(),
            reason: "TessBaseAPICreate returned null".to_string(),
        })?;
        Ok(Self {
            handle,
            ended: false,
        })
    }
}

fn c_string(value: &str, what: &str) -> Result<CString, OcrError> {
    CString::new(value).map_err(|_| OcrError::InvalidOption(format!("{} contains NUL", what)))
}

impl RecognitionEngine for TesseractEngine {
    fn init(&mut self, data_path: Option<&Path>, language: &str) -> Result<(), OcrError> {
        let lang = c_string(language, "language")?;
        let path = data_path
            .map(|p| c_string(&p.to_string_lossy(), "datapath"))
            .transpose()?;
        let path_ptr = path.as_ref().map_or(std::ptr::null(), |p| p.as_ptr());

        let rc = unsafe { capi::TessBaseAPIInit3(self.handle.as_ptr(), path_ptr, lang.as_ptr()) };
        if rc == -1 {
            return Err(OcrError::EngineInit {
                language: language.to_string(),
                reason: format!("TessBaseAPIInit3 failed (datapath {:?})", data_path),
            });
        }
        info!("🔧 Tesseract initialized for '{}'", language);
        Ok(())
    }

    fn set_variable(&mut self, name: &str, value: &str) -> bool {
        let (Ok(name), Ok(value)) = (CString::new(name), CString::new(value)) else {
            return false;
        };
        unsafe {
            capi::TessBaseAPISetVariable(self.handle.as_ptr(), name.as_ptr(), value.as_ptr()) != 0
        }
    }

    fn recognize_rect(
        &mut self,
        image: &[u8],
        bytes_per_pixel: u32,
        stride: usize,
        region: Region,
    ) -> Result<String, OcrError> {
        let needed = (region.bottom() as usize).saturating_sub(1) * stride
            + region.right() as usize * bytes_per_pixel as usize;
        if image.len() < needed {
            return Err(OcrError::Recognition(format!(
                "plane of {} bytes cannot hold region {}",
                image.len(),
                region
            )));
        }

        let raw = unsafe {
            capi::TessBaseAPIRect(
                self.handle.as_ptr(),
                image.as_ptr(),
                bytes_per_pixel as c_int,
                stride as c_int,
                region.x as c_int,
                region.y as c_int,
                region.w as c_int,
                region.h as c_int,
            )
        };
        let text = NonNull::new(raw)
            .map(TessText)
            .ok_or_else(|| OcrError::Recognition("TessBaseAPIRect returned null".to_string()))?;
        Ok(text.to_string_lossy())
    }

    fn all_word_confidences(&mut self) -> Result<Vec<i32>, OcrError> {
        let raw = unsafe { capi::TessBaseAPIAllWordConfidences(self.handle.as_ptr()) };
        let confs = NonNull::new(raw).map(TessIntArray).ok_or_else(|| {
            OcrError::Recognition("TessBaseAPIAllWordConfidences returned null".to_string())
        })?;
        Ok(confs.to_vec())
    }

    fn end(&mut self) {
        if !self.ended {
            unsafe { capi::TessBaseAPIEnd(self.handle.as_ptr()) };
            self.ended = true;
        }
    }

    fn version(&self) -> String {
        let raw = unsafe { capi::TessVersion() };
        if raw.is_null() {
            return "unknown".to_string();
        }
        unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned()
    }
}

impl Drop for TesseractEngine {
    fn drop(&mut self) {
        self.end();
        unsafe { capi::TessBaseAPIDelete(self.handle.as_ptr()) };
        debug!("🗑️ TesseractEngine: released");
    }
}
