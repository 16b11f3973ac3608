// Error type shared by the record codec and the memory model

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    /// Structurally invalid record or file
    #[error("Value error: {0}")]
    Value(String),

    /// Magnitude exceeds what the target representation can hold
    #[error("Range error: {0}")]
    Range(String),

    /// A failure while decoding a specific input line (1-based)
    #[error("Error parsing line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<HexError>,
    },
}

pub type Result<T> = std::result::Result<T, HexError>;

impl HexError {
    pub fn value(msg: impl Into<String>) -> Self {
        HexError::Value(msg.into())
    }

    pub fn range(msg: impl Into<String>) -> Self {
        HexError::Range(msg.into())
    }

    /// Wrap an error with the line number it occurred on
    pub fn at_line(line: usize, source: HexError) -> Self {
        HexError::Line {
            line,
            source: Box::new(source),
        }
    }

    /// Line-annotated errors are value errors regardless of their cause
    pub fn is_value_error(&self) -> bool {
        matches!(self, HexError::Value(_) | HexError::Line { .. })
    }

    pub fn is_range_error(&self) -> bool {
        matches!(self, HexError::Range(_))
    }

    /// Line number of a decode failure, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            HexError::Line { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// The innermost error, with line annotations stripped
    pub fn root_cause(&self) -> &HexError {
        match self {
            HexError::Line { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
