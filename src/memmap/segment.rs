// A contiguous run of bytes at a known base address

use crate::bitwise::{Endianness, FromBytes, ToBytes};
use crate::error::{HexError, Result};
use std::cmp::{max, min};
use std::fmt;

/// Size of the 32-bit address space; no segment may extend past it
pub const ADDRESS_SPACE: u64 = 1 << 32;

fn check_span(address: u32, length: usize) -> Result<()> {
    let end = u64::from(address) + length as u64;
    if end > ADDRESS_SPACE {
        return Err(HexError::range(format!(
            "Segment at {:#010x} with {} bytes extends past the 32-bit address space",
            address, length
        )));
    }
    Ok(())
}

/// Address-tagged, resizable byte buffer.
///
/// `end_address()` is exclusive and returned as u64 so a segment ending
/// exactly at 2^32 is representable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySegment {
    address: u32,
    data: Vec<u8>,
}

impl MemorySegment {
    /// Create a zero-filled segment of `length` bytes at `address`
    pub fn new(address: u32, length: usize) -> Result<Self> {
        check_span(address, length)?;
        Ok(Self {
            address,
            data: vec![0u8; length],
        })
    }

    /// Create a segment holding a copy of `data`
    pub fn from_bytes(address: u32, data: &[u8]) -> Result<Self> {
        Self::from_vec(address, data.to_vec())
    }

    /// Create a segment taking ownership of `data`
    pub fn from_vec(address: u32, data: Vec<u8>) -> Result<Self> {
        check_span(address, data.len())?;
        Ok(Self { address, data })
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn end_address(&self) -> u64 {
        u64::from(self.address) + self.data.len() as u64
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// True iff `[position, position + size)` lies within this segment
    pub fn is_in_range(&self, position: u32, size: usize) -> bool {
        let position = u64::from(position);
        position >= u64::from(self.address) && position + size as u64 <= self.end_address()
    }

    fn offset_of(&self, position: u32, size: usize) -> Result<usize> {
        if !self.is_in_range(position, size) {
            return Err(HexError::range(format!(
                "Access of {} bytes at {:#010x} is outside {}",
                size, position, self
            )));
        }
        Ok((position - self.address) as usize)
    }

    /// Read the byte at absolute address `position`
    pub fn byte(&self, position: u32) -> Result<u8> {
        let offset = self.offset_of(position, 1)?;
        Ok(self.data[offset])
    }

    /// Write the byte at absolute address `position`
    pub fn write_byte(&mut self, position: u32, value: u8) -> Result<()> {
        let offset = self.offset_of(position, 1)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Get `length` bytes starting at absolute address `position`
    pub fn get(&self, position: u32, length: usize) -> Result<&[u8]> {
        let offset = self.offset_of(position, length)?;
        Ok(&self.data[offset..offset + length])
    }

    /// Overwrite bytes starting at absolute address `position`
    pub fn write_bytes(&mut self, position: u32, bytes: &[u8]) -> Result<()> {
        let offset = self.offset_of(position, bytes.len())?;
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }

    /// Move and/or resize the segment.
    ///
    /// Bytes in the intersection of the old and new ranges keep their
    /// values; everything else in the new range reads as zero.
    pub fn resize(&mut self, new_address: u32, new_length: usize) -> Result<()> {
        check_span(new_address, new_length)?;

        if new_address == self.address {
            self.data.resize(new_length, 0);
            return Ok(());
        }

        let new_start = u64::from(new_address);
        let new_end = new_start + new_length as u64;
        let keep_start = max(u64::from(self.address), new_start);
        let keep_end = min(self.end_address(), new_end);

        let mut data = vec![0u8; new_length];
        if keep_start < keep_end {
            let len = (keep_end - keep_start) as usize;
            let src = (keep_start - u64::from(self.address)) as usize;
            let dst = (keep_start - new_start) as usize;
            data[dst..dst + len].copy_from_slice(&self.data[src..src + len]);
        }

        self.address = new_address;
        self.data = data;
        Ok(())
    }

    /// Grow by one byte at the end
    pub fn append(&mut self, value: u8) -> Result<()> {
        self.append_all(&[value])
    }

    /// Grow by `bytes.len()` bytes at the end
    pub fn append_all(&mut self, bytes: &[u8]) -> Result<()> {
        let old_len = self.data.len();
        self.resize(self.address, old_len + bytes.len())?;
        self.data[old_len..].copy_from_slice(bytes);
        Ok(())
    }

    /// Append the serialized form of a typed value
    pub fn append_value<T: ToBytes>(&mut self, value: T, endianness: Endianness) -> Result<()> {
        self.append_all(&value.to_bytes(endianness))
    }

    /// Read a typed value stored at absolute address `position`
    pub fn read_value<T: FromBytes>(&self, position: u32, endianness: Endianness) -> Result<T> {
        T::from_bytes(self.get(position, T::WIDTH)?, endianness)
    }

    /// True if the ranges intersect or touch with no gap
    pub fn overlaps(&self, other: &MemorySegment) -> bool {
        u64::from(self.address) <= other.end_address()
            && u64::from(other.address) <= self.end_address()
    }

    /// True if at least one address of `[address, address + length)` is held here
    pub fn intersects(&self, address: u32, length: usize) -> bool {
        let start = u64::from(address);
        let end = start + length as u64;
        length > 0 && !self.is_empty() && start < self.end_address() && u64::from(self.address) < end
    }

    /// Grow to the union of both ranges, then copy every byte of `other` in.
    ///
    /// `other` wins wherever the two ranges overlap. Any gap between
    /// disjoint ranges is zero-filled.
    pub fn combine(&mut self, other: &MemorySegment) -> Result<()> {
        let start = min(self.address, other.address);
        let end = max(self.end_address(), other.end_address());
        self.resize(start, (end - u64::from(start)) as usize)?;

        for (address, value) in other.iter() {
            self.data[(address - start) as usize] = value;
        }
        Ok(())
    }

    /// Iterate `(absolute address, value)` pairs over the whole segment
    pub fn iter(&self) -> SegmentBytes<'_> {
        SegmentBytes {
            address: self.address,
            inner: self.data.iter().enumerate(),
        }
    }

    /// Get a printable hex representation using absolute addresses
    pub fn printable(&self) -> String {
        hexdump(self.address, &self.data)
    }
}

/// Iterator over the bytes of a [`MemorySegment`] with their addresses
#[derive(Debug, Clone)]
pub struct SegmentBytes<'a> {
    address: u32,
    inner: std::iter::Enumerate<std::slice::Iter<'a, u8>>,
}

impl Iterator for SegmentBytes<'_> {
    type Item = (u32, u8);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(offset, value)| (self.address + offset as u32, *value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for SegmentBytes<'_> {}

impl<'a> IntoIterator for &'a MemorySegment {
    type Item = (u32, u8);
    type IntoIter = SegmentBytes<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl AsRef<[u8]> for MemorySegment {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for MemorySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MemorySegment({:#010x}..{:#010x}, {} bytes)",
            self.address,
            self.end_address(),
            self.data.len()
        )
    }
}

/// Create a hex dump of bytes (similar to hexdump -C)
fn hexdump(base: u32, data: &[u8]) -> String {
    let mut output = String::new();

    for (i, chunk) in data.chunks(16).enumerate() {
        // Offset
        output.push_str(&format!("{:08x}  ", u64::from(base) + (i * 16) as u64));

        // Hex bytes
        for (j, byte) in chunk.iter().enumerate() {
            if j == 8 {
                output.push(' ');
            }
            output.push_str(&format!("{:02x} ", byte));
        }

        // Padding for incomplete lines
        for j in chunk.len()..16 {
            if j == 8 {
                output.push(' ');
            }
            output.push_str("   ");
        }

        // ASCII representation
        output.push_str(" |");
        for byte in chunk {
            if (0x20..=0x7e).contains(byte) {
                output.push(*byte as char);
            } else {
                output.push('.');
            }
        }
        output.push_str("|\n");
    }

    output
}
