// Intel HEX record codec: one record per text line
//
// Wire layout after the start token, all as uppercase hex pairs:
//   byte count | address (u16 BE) | type | payload | checksum

use super::checksum;
use crate::bitwise::{decode_hex, parse_u16_be, parse_u32_be};
use crate::error::{HexError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default record start token
pub const DEFAULT_START_TOKEN: &str = ":";

/// Largest payload a single record can carry
pub const MAX_PAYLOAD: usize = 255;

/// Count, address and type bytes plus the trailing checksum
const FRAME_OVERHEAD: usize = 5;

/// Record type byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RecordType {
    Data = 0x00,
    EndOfFile = 0x01,
    ExtendedSegmentAddress = 0x02,
    StartSegmentAddress = 0x03,
    ExtendedLinearAddress = 0x04,
    StartLinearAddress = 0x05,
}

impl TryFrom<u8> for RecordType {
    type Error = HexError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(RecordType::Data),
            0x01 => Ok(RecordType::EndOfFile),
            0x02 => Ok(RecordType::ExtendedSegmentAddress),
            0x03 => Ok(RecordType::StartSegmentAddress),
            0x04 => Ok(RecordType::ExtendedLinearAddress),
            0x05 => Ok(RecordType::StartLinearAddress),
            other => Err(HexError::value(format!("Unknown record type {:#04x}", other))),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordType::Data => "data",
            RecordType::EndOfFile => "end-of-file",
            RecordType::ExtendedSegmentAddress => "extended-segment-address",
            RecordType::StartSegmentAddress => "start-segment-address",
            RecordType::ExtendedLinearAddress => "extended-linear-address",
            RecordType::StartLinearAddress => "start-linear-address",
        };
        f.write_str(name)
    }
}

/// CS:IP pair carried by a start-segment-address record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSegmentAddress {
    pub code_segment: u16,
    pub instruction_pointer: u16,
}

/// A typed record.
///
/// Address-extension variants hold their raw 16-bit payload; use
/// [`Record::base_address`] for the value it contributes to absolute addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Data { address: u16, data: Vec<u8> },
    EndOfFile,
    ExtendedSegmentAddress(u16),
    StartSegmentAddress(StartSegmentAddress),
    ExtendedLinearAddress(u16),
    StartLinearAddress(u32),
}

impl Record {
    /// Data record for a 16-bit address
    pub fn data(address: u32, data: &[u8]) -> Result<Self> {
        let address = u16::try_from(address).map_err(|_| {
            HexError::range(format!(
                "Data record address {:#x} does not fit in 16 bits",
                address
            ))
        })?;
        check_payload_len(data.len())?;
        Ok(Record::Data {
            address,
            data: data.to_vec(),
        })
    }

    pub fn end_of_file() -> Self {
        Record::EndOfFile
    }

    /// Extended segment address record selecting the segment base `address`
    pub fn extended_segment_address(address: u32) -> Result<Self> {
        let segment = u16::try_from(address >> 4).map_err(|_| {
            HexError::range(format!(
                "Segment base {:#x} is beyond the 20-bit segmented space",
                address
            ))
        })?;
        Ok(Record::ExtendedSegmentAddress(segment))
    }

    /// Extended linear address record carrying the upper 16 bits of `address`
    pub fn extended_linear_address(address: u32) -> Self {
        Record::ExtendedLinearAddress((address >> 16) as u16)
    }

    pub fn start_segment_address(code_segment: u16, instruction_pointer: u16) -> Self {
        Record::StartSegmentAddress(StartSegmentAddress {
            code_segment,
            instruction_pointer,
        })
    }

    pub fn start_linear_address(address: u32) -> Self {
        Record::StartLinearAddress(address)
    }

    pub fn record_type(&self) -> RecordType {
        match self {
            Record::Data { .. } => RecordType::Data,
            Record::EndOfFile => RecordType::EndOfFile,
            Record::ExtendedSegmentAddress(_) => RecordType::ExtendedSegmentAddress,
            Record::StartSegmentAddress(_) => RecordType::StartSegmentAddress,
            Record::ExtendedLinearAddress(_) => RecordType::ExtendedLinearAddress,
            Record::StartLinearAddress(_) => RecordType::StartLinearAddress,
        }
    }

    /// Value an address-extension record adds to following data addresses
    pub fn base_address(&self) -> Option<u32> {
        match self {
            Record::ExtendedSegmentAddress(segment) => Some(u32::from(*segment) << 4),
            Record::ExtendedLinearAddress(upper) => Some(u32::from(*upper) << 16),
            _ => None,
        }
    }

    fn address16(&self) -> u16 {
        match self {
            Record::Data { address, .. } => *address,
            _ => 0,
        }
    }

    fn payload(&self) -> Vec<u8> {
        match self {
            Record::Data { data, .. } => data.clone(),
            Record::EndOfFile => Vec::new(),
            Record::ExtendedSegmentAddress(value) | Record::ExtendedLinearAddress(value) => {
                value.to_be_bytes().to_vec()
            }
            Record::StartSegmentAddress(start) => {
                let mut payload = start.code_segment.to_be_bytes().to_vec();
                payload.extend_from_slice(&start.instruction_pointer.to_be_bytes());
                payload
            }
            Record::StartLinearAddress(address) => address.to_be_bytes().to_vec(),
        }
    }

    /// Binary frame: count, address, type, payload and checksum
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = self.payload();
        check_payload_len(payload.len())?;

        let mut frame = Vec::with_capacity(payload.len() + FRAME_OVERHEAD);
        frame.push(payload.len() as u8);
        frame.extend_from_slice(&self.address16().to_be_bytes());
        frame.push(self.record_type() as u8);
        frame.extend_from_slice(&payload);
        Ok(checksum::append(&frame))
    }

    /// Encode as a newline-terminated text line
    pub fn encode(&self, start_token: &str) -> Result<String> {
        let frame = self.to_bytes()?;
        let mut line = String::with_capacity(start_token.len() + frame.len() * 2 + 1);
        line.push_str(start_token);
        for byte in &frame {
            line.push_str(&format!("{:02X}", byte));
        }
        line.push('\n');
        Ok(line)
    }

    /// Decode a text line into a typed record
    pub fn decode(line: &str, start_token: &str) -> Result<Self> {
        RawRecord::decode(line, start_token)?.into_record()
    }
}

fn check_payload_len(len: usize) -> Result<()> {
    if len > MAX_PAYLOAD {
        return Err(HexError::range(format!(
            "Record payload of {} bytes exceeds {} bytes",
            len, MAX_PAYLOAD
        )));
    }
    Ok(())
}

/// A structurally valid line whose payload has not yet been interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub record_type: RecordType,
    pub address: u16,
    pub payload: Vec<u8>,
}

impl RawRecord {
    /// Decode one line. Text before the start token is ignored.
    pub fn decode(line: &str, start_token: &str) -> Result<Self> {
        if start_token.is_empty() {
            return Err(HexError::value("Start token must not be empty"));
        }
        let start = line
            .find(start_token)
            .ok_or_else(|| HexError::value(format!("Missing start token {:?}", start_token)))?;
        let body = line[start + start_token.len()..].trim_end();

        let bytes = decode_hex(body)?;
        if bytes.len() < FRAME_OVERHEAD {
            return Err(HexError::value(format!(
                "Record too short: {} bytes, need at least {}",
                bytes.len(),
                FRAME_OVERHEAD
            )));
        }
        if !checksum::validate(&bytes) {
            return Err(HexError::value(format!(
                "Checksum mismatch: expected {:02X}, found {:02X}",
                checksum::compute(&bytes[..bytes.len() - 1]),
                bytes[bytes.len() - 1]
            )));
        }
        let declared = usize::from(bytes[0]);
        if declared != bytes.len() - FRAME_OVERHEAD {
            return Err(HexError::value(format!(
                "Byte count {} does not match payload length {}",
                declared,
                bytes.len() - FRAME_OVERHEAD
            )));
        }
        let record_type = RecordType::try_from(bytes[3])?;

        Ok(Self {
            record_type,
            address: u16::from_be_bytes([bytes[1], bytes[2]]),
            payload: bytes[4..bytes.len() - 1].to_vec(),
        })
    }

    fn check_shape(&self, record_type: RecordType, len: usize) -> Result<()> {
        if self.record_type != record_type {
            return Err(HexError::value(format!(
                "Expected a {} record, found {}",
                record_type, self.record_type
            )));
        }
        if self.payload.len() != len {
            return Err(HexError::value(format!(
                "A {} record carries {} payload bytes, found {}",
                record_type,
                len,
                self.payload.len()
            )));
        }
        Ok(())
    }

    fn payload_u16(&self) -> Result<u16> {
        parse_u16_be(&self.payload)
            .map(|(_, value)| value)
            .map_err(|_| HexError::value("Payload too short for a 16-bit field"))
    }

    /// Segment base selected by an extended-segment-address record
    pub fn extended_segment_address(&self) -> Result<u32> {
        self.check_shape(RecordType::ExtendedSegmentAddress, 2)?;
        Ok(u32::from(self.payload_u16()?) << 4)
    }

    /// Linear base selected by an extended-linear-address record
    pub fn extended_linear_address(&self) -> Result<u32> {
        self.check_shape(RecordType::ExtendedLinearAddress, 2)?;
        Ok(u32::from(self.payload_u16()?) << 16)
    }

    pub fn start_segment_address(&self) -> Result<StartSegmentAddress> {
        self.check_shape(RecordType::StartSegmentAddress, 4)?;
        let (rest, code_segment) = parse_u16_be(&self.payload)
            .map_err(|_| HexError::value("Payload too short for a code segment"))?;
        let (_, instruction_pointer) = parse_u16_be(rest)
            .map_err(|_| HexError::value("Payload too short for an instruction pointer"))?;
        Ok(StartSegmentAddress {
            code_segment,
            instruction_pointer,
        })
    }

    pub fn start_linear_address(&self) -> Result<u32> {
        self.check_shape(RecordType::StartLinearAddress, 4)?;
        parse_u32_be(&self.payload)
            .map(|(_, value)| value)
            .map_err(|_| HexError::value("Payload too short for a 32-bit address"))
    }

    /// Project into the typed record, checking payload shape for the kind
    pub fn into_record(self) -> Result<Record> {
        match self.record_type {
            RecordType::Data => Ok(Record::Data {
                address: self.address,
                data: self.payload,
            }),
            RecordType::EndOfFile => Ok(Record::EndOfFile),
            RecordType::ExtendedSegmentAddress => {
                self.check_shape(RecordType::ExtendedSegmentAddress, 2)?;
                Ok(Record::ExtendedSegmentAddress(self.payload_u16()?))
            }
            RecordType::ExtendedLinearAddress => {
                self.check_shape(RecordType::ExtendedLinearAddress, 2)?;
                Ok(Record::ExtendedLinearAddress(self.payload_u16()?))
            }
            RecordType::StartSegmentAddress => {
                Ok(Record::StartSegmentAddress(self.start_segment_address()?))
            }
            RecordType::StartLinearAddress => {
                Ok(Record::StartLinearAddress(self.start_linear_address()?))
            }
        }
    }
}
