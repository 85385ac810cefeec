//! Planning and applying the BCA CRC update.

use log::debug;
use thiserror::Error;

use crate::bca::{BcaError, BcaRecord, CRC_SLOT_SIZE, CrcSlot, decode_bca};
use crate::plan::{ChecksumStep, SpliceCase, SplicePlan, Stream};
use crate::{CrcParams, ERASED_BYTE, Image, OpsError, Range, RangeError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpdateError {
    #[error(transparent)]
    Bca(#[from] BcaError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Ops(#[from] OpsError),
}

/// Result of [`update_crc`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// BCA as found in the source image.
    pub record: BcaRecord,
    /// Where the CRC was written.
    pub slot: CrcSlot,
    pub case: SpliceCase,
    pub crc: u32,
    pub image: Image,
}

impl UpdateOutcome {
    /// Whether the source already carried the correct CRC.
    pub fn was_current(&self) -> bool {
        self.record.expected_crc == self.crc
    }
}

/// Result of [`verify_crc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    pub record: BcaRecord,
    pub computed: u32,
}

impl Verification {
    pub fn matches(&self) -> bool {
        self.record.expected_crc == self.computed
    }
}

/// Build the plan that checksums `crc_range` and writes the result to `slot`.
///
/// When the slot lies inside the range its four bytes are cut out of the
/// checksum input and the tail is shifted down to close the gap. Touching
/// ranges count as disjoint. Each part is cropped before its holes are
/// filled, so only bytes inside that part are ever materialized.
pub fn plan_crc_update(crc_range: Range, slot: CrcSlot) -> Result<SplicePlan, RangeError> {
    let slot_range = slot.range()?;
    let checksum = ChecksumStep {
        params: CrcParams::BCA,
        little_endian_output: true,
        address: slot.address,
    };
    let base = Stream::source().exclude(slot_range);

    if crc_range.is_disjoint(&slot_range) {
        debug!("CRC slot {slot_range} lies outside CRC range {crc_range}");
        return Ok(SplicePlan {
            case: SpliceCase::Disjoint,
            checksum_inputs: vec![
                Stream::source()
                    .crop(crc_range)
                    .fill(ERASED_BYTE, crc_range),
            ],
            checksum,
            base,
        });
    }

    debug!("CRC slot {slot_range} lies inside CRC range {crc_range}; eliding it");
    let head = Range::from_start_end(
        crc_range.start(),
        slot_range.start().max(crc_range.start()),
    )?;
    let tail = Range::from_start_end(slot_range.end().min(crc_range.end()), crc_range.end())?;

    Ok(SplicePlan {
        case: SpliceCase::Overlapping,
        checksum_inputs: vec![
            Stream::source().crop(head).fill(ERASED_BYTE, head),
            Stream::source()
                .crop(tail)
                .fill(ERASED_BYTE, tail)
                .offset(-i64::from(CRC_SLOT_SIZE)),
        ],
        checksum,
        base,
    })
}

/// Recompute the CRC of the BCA at `bca_address` and return the patched image.
pub fn update_crc(image: &Image, bca_address: u32) -> Result<UpdateOutcome, UpdateError> {
    let record = decode_bca(image, bca_address)?;
    let slot = CrcSlot::for_bca(bca_address)?;
    let plan = plan_crc_update(record.crc_range, slot)?;
    let result = plan.execute(image)?;

    debug!(
        "CRC over {:#X} bytes: {:#010X} (stored {:#010X})",
        result.checksum.input_len, result.checksum.crc, record.expected_crc
    );

    Ok(UpdateOutcome {
        record,
        slot,
        case: plan.case,
        crc: result.checksum.crc,
        image: result.image,
    })
}

/// Compare the stored CRC of the BCA at `bca_address` with a fresh one.
pub fn verify_crc(image: &Image, bca_address: u32) -> Result<Verification, UpdateError> {
    let record = decode_bca(image, bca_address)?;
    let slot = CrcSlot::for_bca(bca_address)?;
    let plan = plan_crc_update(record.crc_range, slot)?;
    let checksum = plan.compute_checksum(image)?;

    Ok(Verification {
        record,
        computed: checksum.crc,
    })
}
