// Intel HEX file model: decode records into a sparse memory image and back
//
// Decoding folds an explicit `DecodeState` across the record stream; the
// state carries the two extension registers and the once-only start
// addresses. Encoding chooses a `Dialect` and interleaves extension records
// whenever a data chunk enters a new address block.

use super::options::HexOptions;
use super::record::{Record, RecordType, StartSegmentAddress};
use crate::error::{HexError, Result};
use crate::memmap::{MemorySegment, SegmentContainer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Size of the block a 16-bit record address can reach
const BLOCK_SIZE: u64 = 0x1_0000;

/// Addressing convention used when writing records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// 16-bit addresses: data and end-of-file records only
    Narrow,
    /// 20-bit addresses via extended segment address records
    Segmented,
    /// 32-bit addresses via extended linear address records
    Linear,
}

impl Dialect {
    /// Highest address the dialect advertises
    pub fn max_address(self) -> u32 {
        match self {
            Dialect::Narrow => 0xFFFF,
            Dialect::Segmented => 0xF_FFF0,
            Dialect::Linear => 0xFFFF_FFF0,
        }
    }

    /// Exclusive end of the span the dialect can serialize
    pub fn span(self) -> u64 {
        match self {
            Dialect::Narrow => 0x1_0000,
            Dialect::Segmented => 0x10_0000,
            Dialect::Linear => 1 << 32,
        }
    }

    /// Smallest dialect whose span covers `max_address` (an exclusive end)
    pub fn infer(max_address: u64) -> Self {
        if max_address <= 0x1_0000 {
            Dialect::Narrow
        } else if max_address <= 0x10_0000 {
            Dialect::Segmented
        } else {
            Dialect::Linear
        }
    }

    /// Whether records of `record_type` belong to this dialect
    pub fn allows(self, record_type: RecordType) -> bool {
        match record_type {
            RecordType::Data | RecordType::EndOfFile => true,
            RecordType::ExtendedSegmentAddress | RecordType::StartSegmentAddress => {
                self == Dialect::Segmented
            }
            RecordType::ExtendedLinearAddress | RecordType::StartLinearAddress => {
                self == Dialect::Linear
            }
        }
    }

    /// Address bits selected by the dialect's extension record
    fn block_mask(self) -> Option<u32> {
        match self {
            Dialect::Narrow => None,
            Dialect::Segmented => Some(0xF_0000),
            Dialect::Linear => Some(0xFFFF_0000),
        }
    }

    fn extension_record(self, base: u32) -> Result<Option<Record>> {
        match self {
            Dialect::Narrow => Ok(None),
            Dialect::Segmented => Record::extended_segment_address(base).map(Some),
            Dialect::Linear => Ok(Some(Record::extended_linear_address(base))),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Narrow => "narrow",
            Dialect::Segmented => "segmented",
            Dialect::Linear => "linear",
        };
        f.write_str(name)
    }
}

impl FromStr for Dialect {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "narrow" | "i8hex" => Ok(Dialect::Narrow),
            "segmented" | "i16hex" => Ok(Dialect::Segmented),
            "linear" | "i32hex" => Ok(Dialect::Linear),
            other => Err(HexError::value(format!("Unknown dialect {:?}", other))),
        }
    }
}

/// Extension registers added to each data record's 16-bit address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressingState {
    pub extended_segment: u32,
    pub extended_linear: u32,
}

impl AddressingState {
    /// Absolute address of a record offset; overflow is a range error
    pub fn absolute(&self, address16: u16) -> Result<u32> {
        u32::from(address16)
            .checked_add(self.extended_linear)
            .and_then(|a| a.checked_add(self.extended_segment))
            .ok_or_else(|| {
                HexError::range(format!(
                    "Address {:#06x} with segment base {:#x} and linear base {:#x} exceeds 32 bits",
                    address16, self.extended_segment, self.extended_linear
                ))
            })
    }
}

/// What a decoded record asks the model to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    Data { address: u32, data: Vec<u8> },
    EndOfFile,
}

/// State threaded through one decode pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeState {
    pub addressing: AddressingState,
    pub start_segment_address: Option<StartSegmentAddress>,
    pub start_linear_address: Option<u32>,
}

impl DecodeState {
    /// Apply one record, returning the next state and any event for the model
    pub fn step(self, record: Record) -> Result<(Self, Option<DecodeEvent>)> {
        let mut next = self;
        let event = match record {
            Record::Data { address, data } => Some(DecodeEvent::Data {
                address: self.addressing.absolute(address)?,
                data,
            }),
            Record::EndOfFile => Some(DecodeEvent::EndOfFile),
            Record::ExtendedSegmentAddress(segment) => {
                next.addressing.extended_segment = u32::from(segment) << 4;
                None
            }
            Record::ExtendedLinearAddress(upper) => {
                next.addressing.extended_linear = u32::from(upper) << 16;
                None
            }
            Record::StartSegmentAddress(start) => {
                if self.start_segment_address.is_some() {
                    return Err(HexError::value(
                        "Start segment address record occurs more than once",
                    ));
                }
                next.start_segment_address = Some(start);
                None
            }
            Record::StartLinearAddress(address) => {
                if self.start_linear_address.is_some() {
                    return Err(HexError::value(
                        "Start linear address record occurs more than once",
                    ));
                }
                next.start_linear_address = Some(address);
                None
            }
        };
        Ok((next, event))
    }
}

/// A decoded Intel HEX file: memory contents plus optional start addresses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntelHex {
    memory: SegmentContainer,
    start_segment_address: Option<StartSegmentAddress>,
    start_linear_address: Option<u32>,
}

impl IntelHex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing container as-is
    pub fn from_container(memory: SegmentContainer) -> Self {
        Self {
            memory,
            ..Default::default()
        }
    }

    /// Decode records from `text`.
    ///
    /// Lines without the start token are skipped. Processing stops at the
    /// first end-of-file record. Any failure aborts the whole parse and is
    /// reported with its 1-based line number.
    pub fn parse(text: &str, options: &HexOptions) -> Result<Self> {
        options.validate()?;
        let token = options.start_token.as_str();

        let mut model = Self::new();
        let mut state = DecodeState::default();
        let mut records = 0usize;

        for (index, line) in text.lines().enumerate() {
            if !line.contains(token) {
                continue;
            }
            let line_no = index + 1;

            let (next, event) = Record::decode(line, token)
                .and_then(|record| state.step(record))
                .map_err(|e| HexError::at_line(line_no, e))?;
            state = next;
            records += 1;

            match event {
                Some(DecodeEvent::Data { address, data }) => {
                    tracing::trace!("Line {}: {} bytes at {:#010x}", line_no, data.len(), address);
                    model
                        .store(address, &data, options)
                        .map_err(|e| HexError::at_line(line_no, e))?;
                }
                Some(DecodeEvent::EndOfFile) => {
                    tracing::trace!("Line {}: end of file", line_no);
                    break;
                }
                None => {}
            }
        }

        model.start_segment_address = state.start_segment_address;
        model.start_linear_address = state.start_linear_address;

        tracing::debug!(
            "Decoded {} records into {} segments (max address {:#x})",
            records,
            model.memory.len(),
            model.memory.max_address()
        );
        Ok(model)
    }

    fn store(&mut self, address: u32, data: &[u8], options: &HexOptions) -> Result<()> {
        let segment = MemorySegment::from_bytes(address, data)?;
        if segment.is_empty() {
            return Ok(());
        }
        if !options.allow_duplicate_addresses && self.memory.intersects(address, data.len()) {
            return Err(HexError::range(format!(
                "Data at {:#010x}..{:#010x} overlaps previously decoded data",
                address,
                segment.end_address()
            )));
        }
        self.memory.add_segment(segment)
    }

    /// Dialect used when none is configured: chosen by the highest address,
    /// then widened so any start record present can be written.
    pub fn infer_dialect(&self) -> Dialect {
        let by_address = Dialect::infer(self.memory.max_address());
        if self.start_linear_address.is_some() {
            Dialect::Linear
        } else if self.start_segment_address.is_some() && by_address == Dialect::Narrow {
            Dialect::Segmented
        } else {
            by_address
        }
    }

    /// Encode the memory image as record text
    pub fn serialize(&self, options: &HexOptions) -> Result<String> {
        options.validate()?;
        let token = options.start_token.as_str();

        let mut segments: Vec<&MemorySegment> = self.memory.iter().collect();
        segments.sort_by_key(|s| s.address());

        if !options.allow_duplicate_addresses && !self.memory.validate_segments_are_unique() {
            return Err(HexError::range(
                "Segments hold overlapping addresses; allow duplicate addresses to write them",
            ));
        }

        let dialect = options.dialect.unwrap_or_else(|| self.infer_dialect());
        let max_address = self.memory.max_address();
        if max_address > dialect.span() {
            return Err(HexError::range(format!(
                "Address {:#x} exceeds the {} dialect limit of {:#x}",
                max_address - 1,
                dialect,
                dialect.span() - 1
            )));
        }
        tracing::debug!(
            "Serializing {} segments as {} with {}-byte lines",
            segments.len(),
            dialect,
            options.line_length
        );

        let mut out = String::new();

        if let Some(start) = self.start_segment_address {
            if dialect.allows(RecordType::StartSegmentAddress) {
                let record =
                    Record::start_segment_address(start.code_segment, start.instruction_pointer);
                out.push_str(&record.encode(token)?);
            } else {
                tracing::warn!(
                    "Dropping start segment address: not representable in {} dialect",
                    dialect
                );
            }
        }

        let mut current_base = 0u32;
        for segment in segments {
            let data = segment.as_slice();
            let mut offset = 0usize;
            while offset < data.len() {
                let address = segment.address() + offset as u32;
                let to_block_end = (BLOCK_SIZE - u64::from(address & 0xFFFF)) as usize;
                let len = options
                    .line_length
                    .min(data.len() - offset)
                    .min(to_block_end);

                if let Some(mask) = dialect.block_mask() {
                    let base = address & mask;
                    if base != current_base {
                        if let Some(record) = dialect.extension_record(base)? {
                            out.push_str(&record.encode(token)?);
                        }
                        current_base = base;
                    }
                }

                let record = Record::data(address & 0xFFFF, &data[offset..offset + len])?;
                out.push_str(&record.encode(token)?);
                offset += len;
            }
        }

        if let Some(address) = self.start_linear_address {
            if dialect.allows(RecordType::StartLinearAddress) {
                out.push_str(&Record::start_linear_address(address).encode(token)?);
            } else {
                tracing::warn!(
                    "Dropping start linear address: not representable in {} dialect",
                    dialect
                );
            }
        }

        out.push_str(&Record::end_of_file().encode(token)?);
        Ok(out)
    }

    pub fn memory(&self) -> &SegmentContainer {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut SegmentContainer {
        &mut self.memory
    }

    pub fn into_memory(self) -> SegmentContainer {
        self.memory
    }

    pub fn segments(&self) -> &[MemorySegment] {
        self.memory.segments()
    }

    pub fn add_segment(&mut self, segment: MemorySegment) -> Result<()> {
        self.memory.add_segment(segment)
    }

    pub fn add_all(&mut self, address: u32, data: &[u8]) -> Result<()> {
        self.memory.add_all(address, data)
    }

    pub fn max_address(&self) -> u64 {
        self.memory.max_address()
    }

    /// Byte stored at `address`, if any segment holds it
    pub fn read_byte(&self, address: u32) -> Option<u8> {
        self.memory.byte(address)
    }

    pub fn start_segment_address(&self) -> Option<StartSegmentAddress> {
        self.start_segment_address
    }

    pub fn set_start_segment_address(&mut self, start: Option<StartSegmentAddress>) {
        self.start_segment_address = start;
    }

    pub fn start_linear_address(&self) -> Option<u32> {
        self.start_linear_address
    }

    pub fn set_start_linear_address(&mut self, address: Option<u32>) {
        self.start_linear_address = address;
    }
}

impl FromStr for IntelHex {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, &HexOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting(address: u32, len: usize) -> MemorySegment {
        let data: Vec<u8> = (0..len).map(|i| i as u8).collect();
        MemorySegment::from_vec(address, data).unwrap()
    }

    #[test]
    fn test_empty_file() {
        let model = IntelHex::new();
        assert_eq!(model.serialize(&HexOptions::default()).unwrap(), ":00000001FF\n");

        let parsed = IntelHex::parse("", &HexOptions::default()).unwrap();
        assert!(parsed.memory().is_empty());
        assert_eq!(parsed.max_address(), 0);
    }

    #[test]
    fn test_narrow_two_records() {
        let mut model = IntelHex::new();
        model.add_segment(counting(0x20, 32)).unwrap();

        let options = HexOptions::new()
            .with_line_length(16)
            .with_dialect(Dialect::Narrow);
        let text = model.serialize(&options).unwrap();
        assert_eq!(
            text,
            ":10002000000102030405060708090A0B0C0D0E0F58\n\
             :10003000101112131415161718191A1B1C1D1E1F48\n\
             :00000001FF\n"
        );

        let parsed: IntelHex = text.parse().unwrap();
        assert_eq!(parsed.segments(), model.segments());
    }

    #[test]
    fn test_narrow_rejects_high_addresses() {
        let mut model = IntelHex::new();
        model.add_all(0xFFFF, &[1, 2]).unwrap();
        let err = model
            .serialize(&HexOptions::new().with_dialect(Dialect::Narrow))
            .unwrap_err();
        assert!(err.is_range_error());

        let mut model = IntelHex::new();
        model.add_all(0xFFF0, &[0xAA; 16]).unwrap();
        assert!(model
            .serialize(&HexOptions::new().with_dialect(Dialect::Narrow))
            .is_ok());
    }

    #[test]
    fn test_dialect_inference() {
        assert_eq!(Dialect::infer(0), Dialect::Narrow);
        assert_eq!(Dialect::infer(0x1_0000), Dialect::Narrow);
        assert_eq!(Dialect::infer(0x1_0001), Dialect::Segmented);
        assert_eq!(Dialect::infer(0x10_0000), Dialect::Segmented);
        assert_eq!(Dialect::infer(0x10_0001), Dialect::Linear);

        let mut model = IntelHex::new();
        model.add_all(0x100, &[1]).unwrap();
        assert_eq!(model.infer_dialect(), Dialect::Narrow);
        model.set_start_segment_address(Some(StartSegmentAddress {
            code_segment: 0,
            instruction_pointer: 0x100,
        }));
        assert_eq!(model.infer_dialect(), Dialect::Segmented);
        model.set_start_linear_address(Some(0x100));
        assert_eq!(model.infer_dialect(), Dialect::Linear);
    }

    #[test]
    fn test_dialect_names() {
        assert_eq!("Linear".parse::<Dialect>().unwrap(), Dialect::Linear);
        assert_eq!("i16hex".parse::<Dialect>().unwrap(), Dialect::Segmented);
        assert!("wide".parse::<Dialect>().unwrap_err().is_value_error());
        assert_eq!(Dialect::Segmented.max_address(), 1_048_560);
        assert!(Dialect::Narrow.allows(RecordType::Data));
        assert!(!Dialect::Narrow.allows(RecordType::StartLinearAddress));
        assert!(!Dialect::Linear.allows(RecordType::ExtendedSegmentAddress));
    }

    #[test]
    fn test_segmented_crossing_block() {
        let mut model = IntelHex::new();
        model.add_segment(counting(0xFFF8, 16)).unwrap();

        let options = HexOptions::new().with_dialect(Dialect::Segmented);
        let text = model.serialize(&options).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with(":08FFF800"));
        assert_eq!(lines[1], ":020000021000EC");
        assert!(lines[2].starts_with(":0800000008090A0B0C0D0E0F"));
        assert_eq!(lines[3], ":00000001FF");

        let parsed: IntelHex = text.parse().unwrap();
        assert_eq!(parsed.segments(), model.segments());
    }

    #[test]
    fn test_linear_round_trip() {
        let mut model = IntelHex::new();
        model.add_segment(counting(0x0800_0000, 40)).unwrap();
        model.add_segment(counting(0x2000_FFF0, 48)).unwrap();
        model.set_start_linear_address(Some(0x0800_00ED));

        let options = HexOptions::new().with_line_length(32);
        let text = model.serialize(&options).unwrap();
        assert!(text.starts_with(":020000040800F2\n"));
        assert!(text.ends_with(":04000005080000ED02\n:00000001FF\n"));

        let parsed = IntelHex::parse(&text, &options).unwrap();
        assert_eq!(parsed.segments(), model.segments());
        assert_eq!(parsed.start_linear_address(), Some(0x0800_00ED));
        assert_eq!(parsed.read_byte(0x2001_0000), Some(16));
    }

    #[test]
    fn test_segmented_round_trip_with_start() {
        let mut model = IntelHex::new();
        model.add_segment(counting(0x1_2340, 20)).unwrap();
        model.set_start_segment_address(Some(StartSegmentAddress {
            code_segment: 0x1234,
            instruction_pointer: 0x0000,
        }));

        let text = model.serialize(&HexOptions::default()).unwrap();
        assert!(text.starts_with(":0400000312340000B3\n"));

        let parsed: IntelHex = text.parse().unwrap();
        assert_eq!(parsed.segments(), model.segments());
        assert_eq!(parsed.start_segment_address(), model.start_segment_address());
    }

    #[test]
    fn test_parse_applies_registers() {
        let text = "\
:020000021000EC
:0100000011EE
:020000040001F9
:0100000022DD
";
        let model: IntelHex = text.parse().unwrap();
        assert_eq!(model.read_byte(0x1_0000), Some(0x11));
        // linear base plus the still-set segment base
        assert_eq!(model.read_byte(0x2_0000), Some(0x22));
        assert_eq!(model.memory().len(), 2);
    }

    #[test]
    fn test_parse_skips_noise_and_stops_at_eof() {
        let text = "# firmware image\r\n\
                    :0100000055AA\r\n\
                    \n\
                    :00000001FF\n\
                    :01000100FFFF\n\
                    garbage that would never parse :ZZ\n";
        let model: IntelHex = text.parse().unwrap();
        assert_eq!(model.memory().len(), 1);
        assert_eq!(model.max_address(), 1);
        assert_eq!(model.read_byte(0), Some(0x55));
    }

    #[test]
    fn test_parse_errors_carry_line_number() {
        let text = ":0100000055AA\n:0100010055AA\n";
        let err = IntelHex::parse(text, &HexOptions::default()).unwrap_err();
        assert!(err.is_value_error());
        assert_eq!(err.line(), Some(2));
        assert!(err.root_cause().is_value_error());
    }

    #[test]
    fn test_duplicate_start_linear() {
        let once = ":04000005080000ED02\n:00000001FF\n";
        let model: IntelHex = once.parse().unwrap();
        assert_eq!(model.start_linear_address(), Some(0x0800_00ED));

        let twice = ":04000005080000ED02\n:04000005080000ED02\n:00000001FF\n";
        let err = twice.parse::<IntelHex>().unwrap_err();
        assert!(err.is_value_error());
        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_duplicate_start_segment() {
        let twice = ":0400000300003800C1\n:0400000300003800C1\n";
        let err = twice.parse::<IntelHex>().unwrap_err();
        assert!(err.is_value_error());
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_parse_duplicate_addresses() {
        let text = ":020000000102FB\n:0100010009F5\n:00000001FF\n";
        let err = IntelHex::parse(text, &HexOptions::default()).unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(err.root_cause().is_range_error());

        let options = HexOptions::new().with_duplicate_addresses(true);
        let model = IntelHex::parse(text, &options).unwrap();
        assert_eq!(model.memory().len(), 1);
        // later record overwrites on insert
        assert_eq!(model.read_byte(1), Some(0x09));
        assert_eq!(model.read_byte(0), Some(0x01));
    }

    #[test]
    fn test_uniqueness_guard_on_serialize() {
        let memory = SegmentContainer::from_segments(vec![
            MemorySegment::from_bytes(0x00, &[0x11; 4]).unwrap(),
            MemorySegment::from_bytes(0x02, &[0x22; 4]).unwrap(),
        ]);
        let model = IntelHex::from_container(memory);

        let err = model.serialize(&HexOptions::default()).unwrap_err();
        assert!(err.is_range_error());

        let options = HexOptions::new().with_duplicate_addresses(true);
        let text = model.serialize(&options).unwrap();
        assert_eq!(
            text,
            ":0400000011111111B8\n:040002002222222272\n:00000001FF\n"
        );
    }

    #[test]
    fn test_invalid_line_length() {
        let model = IntelHex::new();
        let err = model
            .serialize(&HexOptions::new().with_line_length(0))
            .unwrap_err();
        assert!(err.is_value_error());
        assert!(IntelHex::parse("", &HexOptions::new().with_line_length(300)).is_err());
    }

    #[test]
    fn test_custom_start_token() {
        let mut model = IntelHex::new();
        model.add_all(0x10, &[0xAB]).unwrap();
        let options = HexOptions::new().with_start_token("@");
        let text = model.serialize(&options).unwrap();
        assert_eq!(text, "@01001000AB44\n@00000001FF\n");

        let parsed = IntelHex::parse(&text, &options).unwrap();
        assert_eq!(parsed.read_byte(0x10), Some(0xAB));
        // default token finds nothing to decode
        assert!(IntelHex::parse(&text, &HexOptions::default())
            .unwrap()
            .memory()
            .is_empty());
    }

    #[test]
    fn test_explicit_dialect_drops_start_records() {
        let mut model = IntelHex::new();
        model.add_all(0, &[1]).unwrap();
        model.set_start_linear_address(Some(0x1234));
        let text = model
            .serialize(&HexOptions::new().with_dialect(Dialect::Narrow))
            .unwrap();
        assert_eq!(text, ":0100000001FE\n:00000001FF\n");
    }

    #[test]
    fn test_decode_state_in_isolation() {
        let state = DecodeState::default();
        let (state, event) = state
            .step(Record::extended_linear_address(0x0002_0000))
            .unwrap();
        assert!(event.is_none());
        assert_eq!(state.addressing.extended_linear, 0x0002_0000);

        let (_, event) = state
            .step(Record::data(0x10, &[7]).unwrap())
            .unwrap();
        assert_eq!(
            event,
            Some(DecodeEvent::Data {
                address: 0x0002_0010,
                data: vec![7]
            })
        );

        let overflow = AddressingState {
            extended_segment: 0xF_FFF0,
            extended_linear: 0xFFFF_0000,
        };
        assert!(overflow.absolute(0xFFFF).unwrap_err().is_range_error());
    }

    #[test]
    fn test_empty_segment_keeps_narrow_round_trip() {
        let mut model = IntelHex::new();
        model.add_all(0x10, &[0xAB]).unwrap();
        model.add_all(0x2_0000, &[]).unwrap();

        assert_eq!(model.segments().len(), 1);
        assert_eq!(model.max_address(), 0x11);
        assert_eq!(model.infer_dialect(), Dialect::Narrow);

        let text = model
            .serialize(&HexOptions::new().with_dialect(Dialect::Narrow))
            .unwrap();
        assert_eq!(text, ":01001000AB44\n:00000001FF\n");

        let text = model.serialize(&HexOptions::default()).unwrap();
        let parsed: IntelHex = text.parse().unwrap();
        assert_eq!(parsed, model);
    }

    #[test]
    fn test_round_trip_across_dialects_and_line_lengths() {
        let layouts = [
            (
                Dialect::Narrow,
                vec![counting(0x0000, 0x21), counting(0xFF00, 0x100)],
            ),
            (
                Dialect::Segmented,
                vec![
                    counting(0x1_0000, 0x40),
                    counting(0x1_FFF0, 0x20),
                    counting(0xE_FF00, 0x100),
                ],
            ),
            (
                Dialect::Linear,
                vec![
                    counting(0x0800_0000, 0x40),
                    counting(0x0801_FFE0, 0x40),
                    counting(0xFFFF_FF00, 0x100),
                ],
            ),
        ];

        for (dialect, segments) in &layouts {
            let mut model = IntelHex::new();
            for segment in segments {
                model.add_segment(segment.clone()).unwrap();
            }
            assert_eq!(model.segments().len(), segments.len());

            for line_length in [1, 16, 255] {
                let options = HexOptions::new()
                    .with_line_length(line_length)
                    .with_dialect(*dialect);
                let text = model.serialize(&options).unwrap();
                let parsed = IntelHex::parse(&text, &options).unwrap();
                assert_eq!(
                    parsed.segments(),
                    model.segments(),
                    "{} dialect, {}-byte lines",
                    dialect,
                    line_length
                );
            }
        }
    }
}
