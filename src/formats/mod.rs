// Intel HEX record codec and file model
pub mod checksum;
pub mod hexfile;
pub mod ihex;
pub mod metadata;
pub mod options;
pub mod record;

pub use hexfile::{load_hex, save_hex, HexFileError};
pub use ihex::{AddressingState, DecodeEvent, DecodeState, Dialect, IntelHex};
pub use metadata::{has_hex_extension, HexSummary, SegmentSummary, FILE_EXTENSIONS};
pub use options::HexOptions;
pub use record::{RawRecord, Record, RecordType, StartSegmentAddress};
