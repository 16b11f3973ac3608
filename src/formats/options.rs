// Parse/serialize options, loadable from JSON

use super::ihex::Dialect;
use super::record::{DEFAULT_START_TOKEN, MAX_PAYLOAD};
use crate::error::{HexError, Result};
use serde::{Deserialize, Serialize};

/// Default number of data bytes per emitted record
pub const DEFAULT_LINE_LENGTH: usize = 16;

/// Options recognized by [`IntelHex::parse`](super::IntelHex::parse) and
/// [`IntelHex::serialize`](super::IntelHex::serialize)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HexOptions {
    /// Record delimiter, used by both parse and serialize
    pub start_token: String,

    /// Skip the duplicate-address checks on parse and serialize
    pub allow_duplicate_addresses: bool,

    /// Data bytes per emitted record (1..=255)
    pub line_length: usize,

    /// Serialization dialect; inferred from the highest address when unset
    pub dialect: Option<Dialect>,
}

impl Default for HexOptions {
    fn default() -> Self {
        Self {
            start_token: DEFAULT_START_TOKEN.to_string(),
            allow_duplicate_addresses: false,
            line_length: DEFAULT_LINE_LENGTH,
            dialect: None,
        }
    }
}

impl HexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_token(mut self, token: impl Into<String>) -> Self {
        self.start_token = token.into();
        self
    }

    pub fn with_duplicate_addresses(mut self, allow: bool) -> Self {
        self.allow_duplicate_addresses = allow;
        self
    }

    pub fn with_line_length(mut self, line_length: usize) -> Self {
        self.line_length = line_length;
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_token.is_empty() {
            return Err(HexError::value("Start token must not be empty"));
        }
        if self.line_length == 0 || self.line_length > MAX_PAYLOAD {
            return Err(HexError::value(format!(
                "Line length {} is outside 1..={}",
                self.line_length, MAX_PAYLOAD
            )));
        }
        Ok(())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON; missing keys take their defaults
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
