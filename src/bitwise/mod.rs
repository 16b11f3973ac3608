// Byte-level helpers: hex text parsing and typed value encoding

pub mod parser;
pub mod types;

pub use parser::{decode_hex, hex_byte, hex_bytes, parse_u16_be, parse_u32_be};
pub use types::{Endianness, FromBytes, ToBytes};
