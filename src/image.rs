use thiserror::Error;

use crate::Segment;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error(
        "overlapping segments at address {address:#X}: existing {existing_start:#X}..{existing_end:#X}, new {new_start:#X}..{new_end:#X}"
    )]
    OverlappingSegments {
        address: u32,
        existing_start: u32,
        existing_end: u32,
        new_start: u32,
        new_end: u32,
    },
}

/// A sparse, byte-addressed firmware image.
///
/// Addresses not covered by any segment are holes: they have no value, which
/// is different from holding zero. Segments may overlap until normalized:
/// - `normalized()` errors on overlap
/// - `normalized_lossy()` uses "last wins"
///
/// Use `append_segment` for high-priority data (wins on overlap).
/// Use `prepend_segment` for low-priority data (loses on overlap).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    segments: Vec<Segment>,
}

impl Image {
    pub fn new() -> Self {
        Self { segments: vec![] }
    }

    pub fn with_segments(segments: Vec<Segment>) -> Self {
        Self {
            segments: segments.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn segments_mut(&mut self) -> &mut Vec<Segment> {
        &mut self.segments
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    pub(crate) fn set_segments(&mut self, segments: Vec<Segment>) {
        self.segments = segments;
    }

    /// Add segment with HIGH priority (wins on overlap after normalize).
    pub fn append_segment(&mut self, segment: Segment) {
        if segment.is_empty() {
            return;
        }
        self.segments.push(segment);
    }

    /// Add segment with LOW priority (loses on overlap after normalize).
    pub fn prepend_segment(&mut self, segment: Segment) {
        if segment.is_empty() {
            return;
        }
        self.segments.insert(0, segment);
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn min_address(&self) -> Option<u32> {
        self.segments.iter().map(|s| s.start_address).min()
    }

    /// First address past the highest defined byte.
    pub fn end_address(&self) -> Option<u32> {
        self.segments.iter().map(|s| s.end_address()).max()
    }

    pub fn total_bytes(&self) -> usize {
        self.segments.iter().map(|s| s.len()).sum()
    }

    /// Returns sorted/merged copy. Errors if any segments overlap.
    pub fn normalized(&self) -> Result<Image, ImageError> {
        if self.segments.is_empty() {
            return Ok(Image::new());
        }

        let mut sorted: Vec<_> = self.segments.iter().collect();
        sorted.sort_by_key(|s| s.start_address);

        let mut merged: Vec<Segment> = Vec::with_capacity(sorted.len());

        for seg in sorted {
            if let Some(last) = merged.last_mut() {
                if seg.start_address < last.end_address() {
                    return Err(ImageError::OverlappingSegments {
                        address: seg.start_address,
                        existing_start: last.start_address,
                        existing_end: last.end_address(),
                        new_start: seg.start_address,
                        new_end: seg.end_address(),
                    });
                }
                if last.is_contiguous_with(seg) {
                    last.data.extend_from_slice(&seg.data);
                    continue;
                }
            }
            merged.push(seg.clone());
        }

        Ok(Image { segments: merged })
    }

    /// Returns sorted/merged copy. Later-inserted segments overwrite earlier ones on overlap.
    pub fn normalized_lossy(&self) -> Image {
        // Walk from the highest-priority segment down. `claimed` holds the
        // sorted, disjoint spans already taken by later segments.
        let mut claimed: Vec<(u32, u32)> = Vec::new();
        let mut pieces: Vec<Segment> = Vec::new();

        for seg in self.segments.iter().rev() {
            let (start, end) = (seg.start_address, seg.end_address());
            let mut cursor = start;
            for &(taken_start, taken_end) in &claimed {
                if taken_end <= cursor {
                    continue;
                }
                if taken_start >= end {
                    break;
                }
                if taken_start > cursor {
                    pieces.push(sub_segment(seg, cursor, taken_start));
                }
                cursor = taken_end;
                if cursor >= end {
                    break;
                }
            }
            if cursor < end {
                pieces.push(sub_segment(seg, cursor, end));
            }
            claim(&mut claimed, start, end);
        }

        pieces.sort_by_key(|p| p.start_address);
        let mut merged: Vec<Segment> = Vec::with_capacity(pieces.len());
        for piece in pieces {
            match merged.last_mut() {
                Some(last) if last.is_contiguous_with(&piece) => {
                    last.data.extend_from_slice(&piece.data)
                }
                _ => merged.push(piece),
            }
        }
        Image { segments: merged }
    }

    /// Read a single byte at address. Returns None if the address is a hole.
    /// The last segment covering the address wins.
    pub fn read_byte(&self, addr: u32) -> Option<u8> {
        self.segments
            .iter()
            .rev()
            .find(|seg| seg.range().contains(addr))
            .map(|seg| seg.data[(addr - seg.start_address) as usize])
    }

    /// Read bytes from address range. Holes and addresses past u32::MAX read as None.
    pub fn read_bytes(&self, addr: u32, len: usize) -> Vec<Option<u8>> {
        (0..len)
            .map(|i| {
                let a = addr.checked_add(u32::try_from(i).ok()?)?;
                self.read_byte(a)
            })
            .collect()
    }

    /// Read bytes from address range. Returns None if any address in range is a hole.
    pub fn read_bytes_contiguous(&self, addr: u32, len: usize) -> Option<Vec<u8>> {
        self.read_bytes(addr, len).into_iter().collect()
    }

    /// Write bytes at address. Creates a new high-priority segment.
    pub fn write_bytes(&mut self, addr: u32, data: &[u8]) {
        self.append_segment(Segment::new(addr, data.to_vec()));
    }
}

/// Bytes of `seg` in `[start, end)`; the bounds must lie inside it.
fn sub_segment(seg: &Segment, start: u32, end: u32) -> Segment {
    let from = (start - seg.start_address) as usize;
    let to = (end - seg.start_address) as usize;
    Segment::new(start, seg.data[from..to].to_vec())
}

/// Add `[start, end)` to a sorted list of disjoint spans, merging as needed.
fn claim(spans: &mut Vec<(u32, u32)>, start: u32, end: u32) {
    spans.push((start, end));
    spans.sort_unstable();
    let mut merged: Vec<(u32, u32)> = Vec::with_capacity(spans.len());
    for &(s, e) in spans.iter() {
        match merged.last_mut() {
            Some(last) if s <= last.1 => last.1 = last.1.max(e),
            _ => merged.push((s, e)),
        }
    }
    *spans = merged;
}
