// IHEX-RS: Intel HEX records and sparse memory images

pub mod bitwise;
pub mod error;
pub mod formats;
pub mod memmap;

// Re-export commonly used types
pub use bitwise::{Endianness, FromBytes, ToBytes};
pub use error::{HexError, Result};
pub use formats::{
    load_hex, save_hex, Dialect, HexOptions, HexSummary, IntelHex, Record, RecordType,
    StartSegmentAddress,
};
pub use memmap::{MemorySegment, SegmentContainer};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
