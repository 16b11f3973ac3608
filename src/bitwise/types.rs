// Common type definitions for typed binary payloads

use crate::error::{HexError, Result};
use serde::{Deserialize, Serialize};

/// Endianness for multi-byte values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Endianness {
    #[default]
    Big,
    Little,
}

impl Endianness {
    pub fn is_big(&self) -> bool {
        matches!(self, Endianness::Big)
    }

    pub fn is_little(&self) -> bool {
        matches!(self, Endianness::Little)
    }
}

/// A trait for types that can be read from binary data
pub trait FromBytes: Sized {
    /// Width of the encoded value in bytes
    const WIDTH: usize;

    fn from_bytes_be(data: &[u8]) -> Result<Self>;
    fn from_bytes_le(data: &[u8]) -> Result<Self>;

    fn from_bytes(data: &[u8], endianness: Endianness) -> Result<Self> {
        match endianness {
            Endianness::Big => Self::from_bytes_be(data),
            Endianness::Little => Self::from_bytes_le(data),
        }
    }
}

/// A trait for types that can be written to binary data
pub trait ToBytes {
    fn to_bytes_be(&self) -> Vec<u8>;
    fn to_bytes_le(&self) -> Vec<u8>;

    fn to_bytes(&self, endianness: Endianness) -> Vec<u8> {
        match endianness {
            Endianness::Big => self.to_bytes_be(),
            Endianness::Little => self.to_bytes_le(),
        }
    }
}

fn fixed<const N: usize>(data: &[u8]) -> Result<[u8; N]> {
    data.get(..N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| {
            HexError::range(format!(
                "Insufficient data: expected {} bytes, got {}",
                N,
                data.len()
            ))
        })
}

macro_rules! impl_bytes {
    ($($ty:ty),*) => {
        $(
            impl FromBytes for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn from_bytes_be(data: &[u8]) -> Result<Self> {
                    Ok(<$ty>::from_be_bytes(fixed(data)?))
                }

                fn from_bytes_le(data: &[u8]) -> Result<Self> {
                    Ok(<$ty>::from_le_bytes(fixed(data)?))
                }
            }

            impl ToBytes for $ty {
                fn to_bytes_be(&self) -> Vec<u8> {
                    self.to_be_bytes().to_vec()
                }

                fn to_bytes_le(&self) -> Vec<u8> {
                    self.to_le_bytes().to_vec()
                }
            }
        )*
    };
}

impl_bytes!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);
