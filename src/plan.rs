//! Declarative range-operation plans.
//!
//! A [`SplicePlan`] never holds image data. Each [`Stream`] starts from a copy
//! of whatever source image the plan is executed against and applies its
//! operations in order.

use log::trace;

use crate::{CrcParams, Image, OpsError, Range};

/// One transform applied to a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    /// Fill holes in `range` with `value`.
    Fill { value: u8, range: Range },
    /// Keep only bytes inside the range.
    Crop(Range),
    /// Remove bytes inside the range.
    Exclude(Range),
    /// Move every byte by `delta` addresses.
    Offset(i64),
}

impl RangeOp {
    pub fn apply(&self, image: &mut Image) -> Result<(), OpsError> {
        match *self {
            RangeOp::Fill { value, range } => image.fill(value, range),
            RangeOp::Crop(range) => image.crop(range),
            RangeOp::Exclude(range) => image.exclude(range),
            RangeOp::Offset(delta) => image.offset(delta)?,
        }
        Ok(())
    }
}

/// A copy of the source image followed by a sequence of operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stream {
    ops: Vec<RangeOp>,
}

impl Stream {
    pub fn source() -> Self {
        Self::default()
    }

    pub fn fill(mut self, value: u8, range: Range) -> Self {
        self.ops.push(RangeOp::Fill { value, range });
        self
    }

    pub fn crop(mut self, range: Range) -> Self {
        self.ops.push(RangeOp::Crop(range));
        self
    }

    pub fn exclude(mut self, range: Range) -> Self {
        self.ops.push(RangeOp::Exclude(range));
        self
    }

    pub fn offset(mut self, delta: i64) -> Self {
        self.ops.push(RangeOp::Offset(delta));
        self
    }

    pub fn ops(&self) -> &[RangeOp] {
        &self.ops
    }

    pub fn materialize(&self, source: &Image) -> Result<Image, OpsError> {
        let mut image = source.clone();
        for op in &self.ops {
            op.apply(&mut image)?;
        }
        trace!(
            "materialized stream {:?}: {} bytes in {} segments",
            self.ops,
            image.total_bytes(),
            image.segments().len()
        );
        Ok(image)
    }
}

/// Which shape of plan was chosen for the slot/range relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpliceCase {
    /// The slot lies outside the checksummed range.
    Disjoint,
    /// The slot lies inside, or straddles an edge of, the checksummed range.
    Overlapping,
}

/// Checksum the concatenated input and place the result at `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumStep {
    pub params: CrcParams,
    pub little_endian_output: bool,
    pub address: u32,
}

/// Computes a checksum over one part of an image and splices it into another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplicePlan {
    pub case: SpliceCase,
    /// Concatenated in order to form the checksum input.
    pub checksum_inputs: Vec<Stream>,
    pub checksum: ChecksumStep,
    /// The image the checksum record is laid over.
    pub base: Stream,
}

/// Checksum over the concatenated inputs of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumValue {
    pub crc: u32,
    /// Length of the checksum input after concatenation.
    pub input_len: usize,
}

/// What executing a plan produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceResult {
    pub image: Image,
    pub checksum: ChecksumValue,
    /// Checksum bytes as written into the image.
    pub checksum_bytes: [u8; 4],
}

impl SplicePlan {
    /// Checksum input parts concatenated into one image.
    pub fn checksum_input(&self, source: &Image) -> Result<Image, OpsError> {
        let mut input = Image::new();
        for stream in &self.checksum_inputs {
            for segment in stream.materialize(source)?.into_segments() {
                input.append_segment(segment);
            }
        }
        Ok(input)
    }

    /// Checksum of the concatenated inputs. The input is flattened once.
    pub fn compute_checksum(&self, source: &Image) -> Result<ChecksumValue, OpsError> {
        let data = self.checksum_input(source)?.contiguous_data();
        Ok(ChecksumValue {
            crc: self.checksum.params.compute(&data),
            input_len: data.len(),
        })
    }

    /// Run the plan against `source`. The source is left untouched.
    pub fn execute(&self, source: &Image) -> Result<SpliceResult, OpsError> {
        let checksum = self.compute_checksum(source)?;
        let checksum_bytes = if self.checksum.little_endian_output {
            checksum.crc.to_le_bytes()
        } else {
            checksum.crc.to_be_bytes()
        };

        let mut record = Image::new();
        record.write_bytes(self.checksum.address, &checksum_bytes);

        // Overlaps already present in the source resolve last-wins; only a
        // collision with the checksum record is an error.
        let base = self.base.materialize(source)?.normalized_lossy();
        let image = Image::concatenate([&base, &record]).normalized()?;

        Ok(SpliceResult {
            image,
            checksum,
            checksum_bytes,
        })
    }
}
