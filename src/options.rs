//! Pass configuration.
//!
//! One [`Options`] value drives both passes so that the marker format the
//! numberer writes and the trimming the resolver applies always agree.
//! Options come from defaults, an optional JSON or TOML file, and CLI flags,
//! in increasing order of precedence.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How numbering markers are written and read back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerFormat {
    /// `1`, `2`, `A`. Link text uses the marker content as is.
    #[default]
    Bare,
    /// `1. `, `2. `, `A. `. Link text drops the trailing two characters.
    NumberedWithPeriod,
}

impl MarkerFormat {
    /// Marker text for a chapter number or appendix letter.
    pub fn label(self, value: impl fmt::Display) -> String {
        match self {
            MarkerFormat::Bare => value.to_string(),
            MarkerFormat::NumberedWithPeriod => format!("{value}. "),
        }
    }

    /// Link text for the content of a marker.
    ///
    /// The period form always drops two characters, whatever they are.
    pub fn link_text(self, marker: &str) -> String {
        match self {
            MarkerFormat::Bare => marker.to_string(),
            MarkerFormat::NumberedWithPeriod => {
                let keep = marker.chars().count().saturating_sub(2);
                marker.chars().take(keep).collect()
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MarkerFormat::Bare => "bare",
            MarkerFormat::NumberedWithPeriod => "numbered-with-period",
        }
    }
}

impl fmt::Display for MarkerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarkerFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bare" => Ok(MarkerFormat::Bare),
            "numbered-with-period" | "period" => Ok(MarkerFormat::NumberedWithPeriod),
            other => Err(Error::InvalidConfig(format!(
                "unknown marker format '{other}' (expected 'bare' or 'numbered-with-period')"
            ))),
        }
    }
}

/// Settings shared by the chapter and xref passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Options {
    /// Give `appendix` chapters letters instead of numbers.
    pub appendix_mode: bool,

    pub marker_format: MarkerFormat,

    /// Class put on inserted marker spans. Resolution ignores it.
    pub marker_class: Option<String>,

    /// Retry a missed identifier lookup with the percent-decoded fragment.
    pub decode_fragments: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            appendix_mode: true,
            marker_format: MarkerFormat::Bare,
            marker_class: None,
            decode_fragments: true,
        }
    }
}

impl Options {
    /// Load options from a `.json` or `.toml` file. Missing keys keep
    /// their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text),
            Some("toml") => Self::from_toml(&text),
            _ => Err(Error::InvalidConfig(format!(
                "{}: config files must end in .json or .toml",
                path.display()
            ))),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str::<Self>(text)?.validated()
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str::<Self>(text)?.validated()
    }

    /// Check values that deserialization cannot, such as `marker_class`
    /// being a single class token. Run again after applying overrides.
    pub fn validated(self) -> Result<Self> {
        if let Some(class) = &self.marker_class
            && (class.is_empty() || class.chars().any(char::is_whitespace))
        {
            return Err(Error::InvalidConfig(format!(
                "marker-class must be a single class token, got '{class}'"
            )));
        }
        Ok(self)
    }
}
