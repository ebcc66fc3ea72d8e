use masm_common::MasmError;
use serde::{Deserialize, Serialize};

/// How a substitute is spliced into the line text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpliceStrategy {
    /// Replace the text at the token's own byte offset. Falls back to a
    /// text search when the line no longer holds the token there.
    #[default]
    TrackOffsets,
    /// Replace the first occurrence of the token text in the line. Wrong
    /// when the same text appears earlier on the line, kept for
    /// compatibility with sources that depend on it.
    FirstOccurrence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionOptions {
    /// Accept SPIM-style `$name` parameters alongside `%name`
    #[serde(default = "default_true")]
    pub accept_spim_parameters: bool,
    #[serde(default)]
    pub splice: SpliceStrategy,
    /// Inserted between a local label and the invocation id
    #[serde(default = "default_label_suffix")]
    pub label_suffix: String,
    /// First invocation id handed out by the driver
    #[serde(default)]
    pub first_invocation: u64,
}

fn default_true() -> bool {
    true
}

fn default_label_suffix() -> String {
    "_M".to_string()
}

impl Default for ExpansionOptions {
    fn default() -> Self {
        Self {
            accept_spim_parameters: true,
            splice: SpliceStrategy::default(),
            label_suffix: default_label_suffix(),
            first_invocation: 0,
        }
    }
}

impl ExpansionOptions {
    pub fn from_json(text: &str) -> Result<Self, MasmError> {
        Ok(serde_json::from_str(text)?)
    }
}
