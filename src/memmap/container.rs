// Ordered collection of disjoint memory segments

use super::segment::MemorySegment;
use crate::error::Result;

/// Sparse memory image: segments kept sorted by address.
///
/// Two precedence rules apply and they intentionally differ:
/// - [`SegmentContainer::add_segment`]: newly added data overwrites what was
///   already stored at the same addresses.
/// - [`SegmentContainer::merge_segments`]: when stored segments turn out to
///   overlap, the lower-address segment's data wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentContainer {
    segments: Vec<MemorySegment>,
}

impl SegmentContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a container from segments as given: sorted but not merged.
    ///
    /// This is the only way to hold overlapping segments; serializing such a
    /// container requires duplicate addresses to be allowed.
    pub fn from_segments(segments: Vec<MemorySegment>) -> Self {
        let mut container = Self { segments };
        container.sort_segments();
        container
    }

    /// Add a segment, folding it into the first stored segment it overlaps.
    /// Empty segments hold no address and are ignored.
    pub fn add_segment(&mut self, segment: MemorySegment) -> Result<()> {
        if segment.is_empty() {
            return Ok(());
        }
        match self.segments.iter_mut().find(|s| s.overlaps(&segment)) {
            Some(existing) => {
                tracing::trace!("Combining {} into {}", segment, existing);
                existing.combine(&segment)?;
            }
            None => self.segments.push(segment),
        }
        self.sort_segments();
        self.merge_segments()
    }

    /// Add raw bytes starting at `address`
    pub fn add_all(&mut self, address: u32, data: &[u8]) -> Result<()> {
        self.add_segment(MemorySegment::from_bytes(address, data)?)
    }

    /// Fuse every pair of overlapping segments.
    ///
    /// Walks pairs `(i, k)` with `i < k` in address order; when `k` overlaps
    /// `i`, `i` is folded into `k` as the argument of `combine`, so the lower
    /// segment's bytes take precedence, and `i` is dropped.
    pub fn merge_segments(&mut self) -> Result<()> {
        let count = self.segments.len();
        let mut merged = vec![false; count];

        for i in 0..count {
            for k in (i + 1)..count {
                let (lower, upper) = self.segments.split_at_mut(k);
                if upper[0].overlaps(&lower[i]) {
                    upper[0].combine(&lower[i])?;
                    merged[i] = true;
                }
            }
        }

        if merged.iter().any(|&m| m) {
            let mut flags = merged.into_iter();
            self.segments.retain(|_| !flags.next().unwrap_or(false));
            self.sort_segments();
            tracing::trace!("Merged down to {} segments", self.segments.len());
        }
        Ok(())
    }

    /// Stable sort by ascending address
    pub fn sort_segments(&mut self) {
        self.segments.sort_by_key(|s| s.address());
    }

    /// Highest exclusive end address, or 0 when empty
    pub fn max_address(&self) -> u64 {
        self.segments
            .iter()
            .map(MemorySegment::end_address)
            .max()
            .unwrap_or(0)
    }

    /// True iff no address is held by more than one segment.
    ///
    /// Touching segments share no address and pass, unlike
    /// [`MemorySegment::overlaps`] which counts them as overlapping.
    pub fn validate_segments_are_unique(&self) -> bool {
        self.segments.iter().enumerate().all(|(i, a)| {
            self.segments[i + 1..]
                .iter()
                .all(|b| !a.intersects(b.address(), b.len()))
        })
    }

    /// True if any stored segment holds an address in `[address, address + length)`
    pub fn intersects(&self, address: u32, length: usize) -> bool {
        self.segments.iter().any(|s| s.intersects(address, length))
    }

    /// Read one byte from whichever segment holds `address`
    pub fn byte(&self, address: u32) -> Option<u8> {
        self.segments
            .iter()
            .find(|s| s.is_in_range(address, 1))
            .and_then(|s| s.byte(address).ok())
    }

    pub fn segments(&self) -> &[MemorySegment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MemorySegment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Total number of stored bytes
    pub fn total_bytes(&self) -> usize {
        self.segments.iter().map(MemorySegment::len).sum()
    }
}

impl<'a> IntoIterator for &'a SegmentContainer {
    type Item = &'a MemorySegment;
    type IntoIter = std::slice::Iter<'a, MemorySegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(address: u32, len: usize, value: u8) -> MemorySegment {
        MemorySegment::from_bytes(address, &vec![value; len]).unwrap()
    }

    #[test]
    fn test_disjoint_segments_stay_sorted() {
        let mut mem = SegmentContainer::new();
        mem.add_all(0x200, &[2; 4]).unwrap();
        mem.add_all(0x100, &[1; 4]).unwrap();
        mem.add_all(0x300, &[3; 4]).unwrap();

        let starts: Vec<u32> = mem.iter().map(|s| s.address()).collect();
        assert_eq!(starts, vec![0x100, 0x200, 0x300]);
        assert_eq!(mem.max_address(), 0x304);
        assert_eq!(mem.total_bytes(), 12);
        assert!(mem.validate_segments_are_unique());
    }

    #[test]
    fn test_touching_segments_fuse() {
        let mut mem = SegmentContainer::new();
        mem.add_all(0x00, &[1; 16]).unwrap();
        mem.add_all(0x10, &[2; 16]).unwrap();

        assert_eq!(mem.len(), 1);
        let seg = &mem.segments()[0];
        assert_eq!(seg.address(), 0);
        assert_eq!(seg.len(), 32);
        assert_eq!(seg.byte(0x0F).unwrap(), 1);
        assert_eq!(seg.byte(0x10).unwrap(), 2);
    }

    #[test]
    fn test_add_time_insert_overwrites() {
        let mut mem = SegmentContainer::new();
        mem.add_segment(filled(0, 32, 25)).unwrap();
        mem.add_segment(filled(16, 32, 26)).unwrap();
        mem.add_segment(filled(32, 32, 27)).unwrap();

        assert_eq!(mem.len(), 1);
        let seg = &mem.segments()[0];
        assert_eq!(seg.address(), 0);
        assert_eq!(seg.end_address(), 64);
        assert!(seg.as_slice()[..16].iter().all(|&b| b == 25));
        assert!(seg.as_slice()[16..32].iter().all(|&b| b == 26));
        assert!(seg.as_slice()[32..].iter().all(|&b| b == 27));
        assert_eq!(seg.byte(15).unwrap(), 25);
        assert_eq!(seg.byte(16).unwrap(), 26);
        assert_eq!(seg.byte(31).unwrap(), 26);
        assert_eq!(seg.byte(32).unwrap(), 27);
    }

    #[test]
    fn test_merge_sweep_lower_address_wins() {
        let mut mem =
            SegmentContainer::from_segments(vec![filled(16, 32, 26), filled(0, 32, 25)]);
        assert_eq!(mem.len(), 2);
        assert!(!mem.validate_segments_are_unique());

        mem.merge_segments().unwrap();
        assert_eq!(mem.len(), 1);
        let seg = &mem.segments()[0];
        assert_eq!(seg.address(), 0);
        assert_eq!(seg.len(), 48);
        assert_eq!(seg.byte(31).unwrap(), 25);
        assert_eq!(seg.byte(32).unwrap(), 26);
        assert!(mem.validate_segments_are_unique());
    }

    #[test]
    fn test_merge_sweep_chains() {
        // The first segment spans the other two; its bytes win throughout
        let mut mem = SegmentContainer::from_segments(vec![
            filled(0, 100, 1),
            filled(10, 10, 2),
            filled(50, 60, 3),
        ]);
        mem.merge_segments().unwrap();

        assert_eq!(mem.len(), 1);
        let seg = &mem.segments()[0];
        assert_eq!(seg.address(), 0);
        assert_eq!(seg.end_address(), 110);
        assert!(seg.as_slice()[..100].iter().all(|&b| b == 1));
        assert!(seg.as_slice()[100..].iter().all(|&b| b == 3));
    }

    #[test]
    fn test_add_bridging_gap_merges_neighbours() {
        let mut mem = SegmentContainer::new();
        mem.add_all(0x00, &[1; 8]).unwrap();
        mem.add_all(0x10, &[3; 8]).unwrap();
        assert_eq!(mem.len(), 2);

        // Overlaps the first, combined there, then the sweep fuses the second
        mem.add_all(0x04, &[2; 12]).unwrap();
        assert_eq!(mem.len(), 1);
        let seg = &mem.segments()[0];
        assert_eq!(seg.len(), 0x18);
        assert_eq!(seg.byte(0x03).unwrap(), 1);
        assert_eq!(seg.byte(0x04).unwrap(), 2);
        assert_eq!(seg.byte(0x0F).unwrap(), 2);
        assert_eq!(seg.byte(0x10).unwrap(), 3);
    }

    #[test]
    fn test_lookup_and_clear() {
        let mut mem = SegmentContainer::new();
        mem.add_all(0x1000, &[0xAA, 0xBB]).unwrap();
        assert_eq!(mem.byte(0x1001), Some(0xBB));
        assert_eq!(mem.byte(0x1002), None);
        assert!(mem.intersects(0x0FFF, 2));
        assert!(!mem.intersects(0x1002, 4));

        mem.clear();
        assert!(mem.is_empty());
        assert_eq!(mem.max_address(), 0);
    }

    #[test]
    fn test_empty_segment_is_ignored() {
        let mut mem = SegmentContainer::new();
        mem.add_all(0x10, &[0xAB]).unwrap();
        mem.add_all(0x2_0000, &[]).unwrap();
        mem.add_segment(MemorySegment::new(0x11, 0).unwrap()).unwrap();

        assert_eq!(mem.len(), 1);
        assert_eq!(mem.max_address(), 0x11);
        assert_eq!(mem.total_bytes(), 1);

        let mut empty = SegmentContainer::new();
        empty.add_all(0x4000, &[]).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.max_address(), 0);
    }

    #[test]
    fn test_touching_segments_are_unique() {
        let mem = SegmentContainer::from_segments(vec![
            filled(0x00, 0x10, 1),
            filled(0x10, 0x10, 2),
        ]);
        assert!(mem.segments()[0].overlaps(&mem.segments()[1]));
        assert!(mem.validate_segments_are_unique());

        let mem = SegmentContainer::from_segments(vec![
            filled(0x00, 0x10, 1),
            filled(0x0F, 0x10, 2),
        ]);
        assert!(!mem.validate_segments_are_unique());
    }
}
