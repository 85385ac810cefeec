pub mod bca;
pub mod error;
pub mod image;
pub mod io;
pub mod ops;
pub mod plan;
pub mod range;
pub mod segment;
pub mod update;

/// Value of an erased flash byte. Holes inside a checksummed range read as this.
pub const ERASED_BYTE: u8 = 0xFF;

pub use bca::{
    BCA_MAGIC, BCA_SIZE, BCA_UNDEFINED, BcaError, BcaRecord, CRC_SLOT_OFFSET, CRC_SLOT_SIZE,
    CrcSlot, DEFAULT_BCA_ADDRESS, decode_bca, encode_bca,
};
pub use error::Error;
pub use image::{Image, ImageError};
pub use io::{ParseError, SRecordWriteOptions, parse_srec, write_srec};
pub use ops::{CRC_32_BCA, CrcParams, OpsError, crc32_bca};
pub use plan::{
    ChecksumStep, ChecksumValue, RangeOp, SpliceCase, SplicePlan, SpliceResult, Stream,
};
pub use range::{Range, RangeError, parse_number};
pub use segment::Segment;
pub use update::{UpdateError, UpdateOutcome, Verification, plan_crc_update, update_crc, verify_crc};
