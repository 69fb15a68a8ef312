use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::OcrError;
use super::region::Region;

pub const DEFAULT_LANGUAGE: &str = "eng";

pub const DEFAULT_WHITELIST: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ.:;,-+_!?\"'[]{}()<>|/\\=*&%$#@!~ ";

/// OCR 滤镜配置
///
/// 构造后只读，区域会在输入尺寸变化时重新解析（见 `Region::clamp`）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ConfigFile", into = "ConfigFile")]
pub struct OcrConfig {
    /// Directory holding the engine's trained data.
    pub data_path: Option<PathBuf>,
    pub language: String,
    pub whitelist: String,
    pub blacklist: String,
    pub region: Region,
}

/// On-disk shape: geometry keys sit next to the other options.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct ConfigFile {
    #[serde(alias = "datapath", skip_serializing_if = "Option::is_none")]
    data_path: Option<PathBuf>,
    language: String,
    whitelist: String,
    blacklist: String,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

impl Default for ConfigFile {
    fn default() -> Self {
        OcrConfig::default().into()
    }
}

impl From<ConfigFile> for OcrConfig {
    fn from(f: ConfigFile) -> Self {
        Self {
            data_path: f.data_path,
            language: f.language,
            whitelist: f.whitelist,
            blacklist: f.blacklist,
            region: Region::new(f.x, f.y, f.w, f.h),
        }
    }
}

impl From<OcrConfig> for ConfigFile {
    fn from(c: OcrConfig) -> Self {
        Self {
            data_path: c.data_path,
            language: c.language,
            whitelist: c.whitelist,
            blacklist: c.blacklist,
            x: c.region.x,
            y: c.region.y,
            w: c.region.w,
            h: c.region.h,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            language: DEFAULT_LANGUAGE.to_string(),
            whitelist: DEFAULT_WHITELIST.to_string(),
            blacklist: String::new(),
            region: Region::default(),
        }
    }
}

impl OcrConfig {
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn with_whitelist(mut self, whitelist: &str) -> Self {
        self.whitelist = whitelist.to_string();
        self
    }

    pub fn with_blacklist(mut self, blacklist: &str) -> Self {
        self.blacklist = blacklist.to_string();
        self
    }

    pub fn with_region(mut self, x: u32, y: u32, w: u32, h: u32) -> Self {
        self.region = Region::new(x, y, w, h);
        self
    }

    pub fn data_path(&self) -> Option<&Path> {
        self.data_path.as_deref()
    }

    /// Parse filter arguments such as `language=deu:x=10:w=200`.
    ///
    /// Pairs are separated by `:`, and `\` escapes the following character so
    /// character lists may contain `:`, `=` or `\` itself.
    pub fn from_filter_args(args: &str) -> Result<Self, OcrError> {
        let mut config = Self::default();

        for pair in split_unescaped(args, ':') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = split_key_value(&pair).ok_or_else(|| {
                OcrError::InvalidOption(format!("expected key=value, got '{}'", pair))
            })?;
            let (key, value) = (unescape(key), unescape(value));

            match key.as_str() {
                "datapath" | "data-path" => config.data_path = Some(PathBuf::from(value)),
                "language" => config.language = value,
                "whitelist" => config.whitelist = value,
                "blacklist" => config.blacklist = value,
                "x" => config.region.x = parse_geometry(&key, &value)?,
                "y" => config.region.y = parse_geometry(&key, &value)?,
                "w" => config.region.w = parse_geometry(&key, &value)?,
                "h" => config.region.h = parse_geometry(&key, &value)?,
                other => {
                    return Err(OcrError::InvalidOption(format!("unknown option '{}'", other)))
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json5(source: &str) -> Result<Self, OcrError> {
        let config: Self = json5::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), OcrError> {
        if self.language.trim().is_empty() {
            return Err(OcrError::InvalidOption("language must not be empty".into()));
        }
        if let Some(path) = &self.data_path {
            if path.as_os_str().is_empty() {
                return Err(OcrError::InvalidOption("datapath must not be empty".into()));
            }
        }
        let r = &self.region;
        for (name, v) in [("x", r.x), ("y", r.y), ("w", r.w), ("h", r.h)] {
            if v > i32::MAX as u32 {
                return Err(OcrError::InvalidOption(format!(
                    "{} = {} exceeds {}",
                    name,
                    v,
                    i32::MAX
                )));
            }
        }
        Ok(())
    }
}

fn parse_geometry(key: &str, value: &str) -> Result<u32, OcrError> {
    let v: i64 = value.trim().parse().map_err(|_| {
        OcrError::InvalidOption(format!("{} expects an integer, got '{}'", key, value))
    })?;
    if !(0..=i32::MAX as i64).contains(&v) {
        return Err(OcrError::InvalidOption(format!(
            "{} = {} out of range [0, {}]",
            key,
            v,
            i32::MAX
        )));
    }
    Ok(v as u32)
}

/// Split on `sep` unless it is preceded by `\`. Escapes are kept for [`unescape`].
fn split_unescaped(input: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            current.push(c);
            if let Some(next) = chars.next() {
                current.push(next);
            }
        } else if c == sep {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
}

/// Split at the first unescaped `=`; later ones belong to the value.
fn split_key_value(pair: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (i, c) in pair.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '=' => return Some((&pair[..i], &pair[i + 1..])),
            _ => {}
        }
    }
    None
}

fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
