use crate::Range;

/// A contiguous run of bytes starting at `start_address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start_address: u32,
    pub data: Vec<u8>,
}

impl Segment {
    pub fn new(start_address: u32, data: Vec<u8>) -> Self {
        debug_assert!(
            (start_address as u64) + (data.len() as u64) <= u32::MAX as u64,
            "segment data runs past the 32-bit address space"
        );
        Self {
            start_address,
            data,
        }
    }

    /// First address past the segment.
    pub fn end_address(&self) -> u32 {
        self.start_address.saturating_add(self.data.len() as u32)
    }

    pub fn range(&self) -> Range {
        Range::from_start_end(self.start_address, self.end_address())
            .unwrap_or_else(|_| unreachable!("segment end precedes its start"))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_contiguous_with(&self, other: &Segment) -> bool {
        self.end_address() == other.start_address
    }

    /// Bytes of this segment that fall inside `range`, as a new segment.
    pub fn slice(&self, range: Range) -> Option<Segment> {
        let overlap = self.range().intersection(&range)?;
        let start = (overlap.start() - self.start_address) as usize;
        let end = (overlap.end() - self.start_address) as usize;
        Some(Segment::new(overlap.start(), self.data[start..end].to_vec()))
    }
}
