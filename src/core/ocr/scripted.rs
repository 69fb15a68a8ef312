use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::engine::{RecognitionEngine, CONFIDENCE_SENTINEL};
use super::error::OcrError;
use super::region::Region;

/// One scripted answer to `recognize_rect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    Text { text: String, confidences: Vec<i32> },
    Fail(String),
}

impl Script {
    pub fn text(text: &str, confidences: &[i32]) -> Self {
        Script::Text {
            text: text.to_string(),
            confidences: confidences.to_vec(),
        }
    }
}

/// 记录下来的引擎调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Init {
        data_path: Option<PathBuf>,
        language: String,
    },
    SetVariable {
        name: String,
        value: String,
    },
    RecognizeRect {
        bytes_per_pixel: u32,
        stride: usize,
        region: Region,
        /// First byte of the region, to check the plane that was handed over.
        first_pixel: Option<u8>,
    },
    AllWordConfidences,
    End,
    Destroy,
}

/// Shared view of the calls made to a [`ScriptedEngine`], usable after the
/// engine has been moved into a filter.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<EngineCall>>>);

impl CallLog {
    fn push(&self, call: EngineCall) {
        if let Ok(mut calls) = self.0.lock() {
            calls.push(call);
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.0.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.calls().iter().filter(|&c| pred(c)).count()
    }
}

/// 脚本化引擎 - 不依赖真实 OCR 后端，按顺序返回预设结果
pub struct ScriptedEngine {
    scripts: VecDeque<Script>,
    pending_confidences: Option<Vec<i32>>,
    fail_init: bool,
    rejected_variables: Vec<String>,
    log: CallLog,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            scripts: VecDeque::new(),
            pending_confidences: None,
            fail_init: false,
            rejected_variables: Vec::new(),
            log: CallLog::default(),
        }
    }

    pub fn with_scripts(scripts: Vec<Script>) -> Self {
        let mut engine = Self::new();
        engine.scripts = scripts.into();
        engine
    }

    pub fn failing_init() -> Self {
        let mut engine = Self::new();
        engine.fail_init = true;
        engine
    }

    pub fn rejecting_variable(mut self, name: &str) -> Self {
        self.rejected_variables.push(name.to_string());
        self
    }

    pub fn call_log(&self) -> CallLog {
        self.log.clone()
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecognitionEngine for ScriptedEngine {
    fn init(&mut self, data_path: Option<&Path>, language: &str) -> Result<(), OcrError> {
        self.log.push(EngineCall::Init {
            data_path: data_path.map(Path::to_path_buf),
            language: language.to_string(),
        });
        if self.fail_init {
            return Err(OcrError::EngineInit {
                language: language.to_string(),
                reason: "scripted init failure".to_string(),
            });
        }
        Ok(())
    }

    fn set_variable(&mut self, name: &str, value: &str) -> bool {
        self.log.push(EngineCall::SetVariable {
            name: name.to_string(),
            value: value.to_string(),
        });
        !self.rejected_variables.iter().any(|v| v == name)
    }

    fn recognize_rect(
        &mut self,
        image: &[u8],
        bytes_per_pixel: u32,
        stride: usize,
        region: Region,
    ) -> Result<String, OcrError> {
        let offset = region.y as usize * stride + region.x as usize * bytes_per_pixel as usize;
        self.log.push(EngineCall::RecognizeRect {
            bytes_per_pixel,
            stride,
            region,
            first_pixel: image.get(offset).copied(),
        });

        // 脚本用完后返回空结果
        match self.scripts.pop_front() {
            Some(Script::Text { text, confidences }) => {
                self.pending_confidences = Some(confidences);
                Ok(text)
            }
            Some(Script::Fail(reason)) => {
                self.pending_confidences = None;
                Err(OcrError::Recognition(reason))
            }
            None => {
                self.pending_confidences = Some(Vec::new());
                Ok(String::new())
            }
        }
    }

    fn all_word_confidences(&mut self) -> Result<Vec<i32>, OcrError> {
        self.log.push(EngineCall::AllWordConfidences);
        match self.pending_confidences.take() {
            Some(mut confs) => {
                confs.push(CONFIDENCE_SENTINEL);
                Ok(confs)
            }
            None => Err(OcrError::Recognition("no recognition result".to_string())),
        }
    }

    fn end(&mut self) {
        self.log.push(EngineCall::End);
    }

    fn version(&self) -> String {
        "scripted".to_string()
    }
}

impl Drop for ScriptedEngine {
    fn drop(&mut self) {
        self.log.push(EngineCall::Destroy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_in_order() {
        let mut engine = ScriptedEngine::with_scripts(vec![
            Script::text("HELLO", &[91, 88]),
            Script::Fail("boom".into()),
        ]);
        let plane = vec![9u8; 16];

        let text = engine.recognize_rect(&plane, 1, 4, Region::new(0, 0, 4, 4)).unwrap();
        assert_eq!(text, "HELLO");
        assert_eq!(engine.all_word_confidences().unwrap(), vec![91, 88, -1]);

        assert!(engine.recognize_rect(&plane, 1, 4, Region::new(0, 0, 4, 4)).is_err());
        assert!(engine.all_word_confidences().is_err());

        let text = engine.recognize_rect(&plane, 1, 4, Region::new(0, 0, 4, 4)).unwrap();
        assert!(text.is_empty());
        assert_eq!(engine.all_word_confidences().unwrap(), vec![-1]);
    }

    #[test]
    fn test_call_log_survives_drop() {
        let engine = ScriptedEngine::new().rejecting_variable("x");
        let log = engine.call_log();
        let mut engine = engine;
        assert!(!engine.set_variable("x", "1"));
        assert!(engine.set_variable("y", "1"));
        drop(engine);

        let calls = log.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2], EngineCall::Destroy);
    }
}
