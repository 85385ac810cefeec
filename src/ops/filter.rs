use super::OpsError;
use crate::{Image, Range, Segment};

impl Image {
    /// Keep only data within the specified range. Clips segments that partially overlap.
    pub fn crop(&mut self, range: Range) {
        let kept = self
            .segments()
            .iter()
            .filter_map(|segment| segment.slice(range))
            .collect();
        self.set_segments(kept);
    }

    /// Remove all data within the specified range. Splits segments if the hole is in the middle.
    pub fn exclude(&mut self, range: Range) {
        if range.is_empty() {
            return;
        }

        let mut new_segments = Vec::new();
        for segment in self.segments_mut().drain(..) {
            let seg_start = segment.start_address;
            let seg_end = segment.end_address();

            if seg_end <= range.start() || seg_start >= range.end() {
                new_segments.push(segment);
                continue;
            }

            if seg_start < range.start() {
                let end_offset = (range.start() - seg_start) as usize;
                new_segments.push(Segment::new(seg_start, segment.data[..end_offset].to_vec()));
            }

            if seg_end > range.end() {
                let start_offset = (range.end() - seg_start) as usize;
                new_segments.push(Segment::new(
                    range.end(),
                    segment.data[start_offset..].to_vec(),
                ));
            }
        }

        self.set_segments(new_segments);
    }

    /// Fill the holes of `range` with `value`. Existing data is preserved and
    /// only the missing bytes are allocated.
    pub fn fill(&mut self, value: u8, range: Range) {
        if range.is_empty() {
            return;
        }

        let mut covered: Vec<Range> = self
            .segments()
            .iter()
            .filter_map(|segment| segment.range().intersection(&range))
            .collect();
        covered.sort_by_key(|r| r.start());

        let mut holes = Vec::new();
        let mut cursor = range.start();
        for span in covered {
            if span.start() > cursor {
                holes.push(Segment::new(
                    cursor,
                    vec![value; (span.start() - cursor) as usize],
                ));
            }
            cursor = cursor.max(span.end());
        }
        if cursor < range.end() {
            holes.push(Segment::new(
                cursor,
                vec![value; (range.end() - cursor) as usize],
            ));
        }

        // Low priority, though the holes never overlap existing data.
        self.segments_mut().splice(0..0, holes);
    }

    /// Move every segment by `delta` addresses.
    ///
    /// Fails without modifying the image if any byte would leave the 32-bit
    /// address space.
    pub fn offset(&mut self, delta: i64) -> Result<(), OpsError> {
        let mut moved = Vec::with_capacity(self.segments().len());
        for segment in self.segments() {
            let overflow = || OpsError::AddressOverflow {
                address: segment.start_address,
                delta,
            };
            let start = i64::from(segment.start_address)
                .checked_add(delta)
                .ok_or_else(overflow)?;
            let start = u32::try_from(start).map_err(|_| overflow())?;
            Range::from_start_length(start, segment.len() as u32).map_err(|_| overflow())?;
            moved.push(start);
        }

        for (segment, start) in self.segments_mut().iter_mut().zip(moved) {
            segment.start_address = start;
        }
        Ok(())
    }

    /// Concatenate images in order. Later images win where addresses collide.
    pub fn concatenate<'a, I>(images: I) -> Image
    where
        I: IntoIterator<Item = &'a Image>,
    {
        let mut out = Image::new();
        for image in images {
            for segment in image.segments() {
                out.append_segment(segment.clone());
            }
        }
        out
    }
}
