// Sparse memory model: address-tagged segments and their container
pub mod container;
pub mod segment;

pub use container::SegmentContainer;
pub use segment::{MemorySegment, SegmentBytes};
