// File-extension hints and a serializable summary of a decoded image

use super::ihex::{Dialect, IntelHex};
use super::record::StartSegmentAddress;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extensions conventionally used for Intel HEX files. Advisory only.
pub const FILE_EXTENSIONS: &[&str] = &[
    "hex", "h86", "hxl", "hxh", "obl", "obh", "mcs", "ihex", "ihe", "ihx", "a43", "a90",
];

/// True if `path` carries one of the conventional Intel HEX extensions
pub fn has_hex_extension(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            FILE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Address range of one stored segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub address: u32,

    /// Exclusive end address
    pub end_address: u64,

    pub length: usize,
}

/// Overview of a decoded image, for printing and tooling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HexSummary {
    #[serde(default)]
    pub segments: Vec<SegmentSummary>,

    #[serde(default)]
    pub total_bytes: usize,

    #[serde(default)]
    pub max_address: u64,

    /// Dialect that serialization would pick with no explicit choice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_segment_address: Option<StartSegmentAddress>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_linear_address: Option<u32>,
}

impl HexSummary {
    pub fn from_model(model: &IntelHex) -> Self {
        let memory = model.memory();
        Self {
            segments: memory
                .iter()
                .map(|s| SegmentSummary {
                    address: s.address(),
                    end_address: s.end_address(),
                    length: s.len(),
                })
                .collect(),
            total_bytes: memory.total_bytes(),
            max_address: memory.max_address(),
            dialect: Some(model.infer_dialect()),
            start_segment_address: model.start_segment_address(),
            start_linear_address: model.start_linear_address(),
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
