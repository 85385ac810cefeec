//! Bootloader Configuration Area decoding.
//!
//! The BCA is a block of little-endian words inside the image. Only the first
//! four are used here:
//!
//! | Offset | Field          |
//! |--------|----------------|
//! | 0x0    | key ("kcfg")   |
//! | 0x4    | crc_start      |
//! | 0x8    | crc_count      |
//! | 0xC    | expected_crc   |

use log::debug;
use thiserror::Error;

use crate::{Image, Range, RangeError};

/// `kcfg` in memory order, read as a little-endian word.
pub const BCA_MAGIC: u32 = 0x6766_636B;

/// Erased-flash value a BCA field holds when it was never programmed.
pub const BCA_UNDEFINED: u32 = 0xFFFF_FFFF;

/// Number of bytes decoded from the BCA.
pub const BCA_SIZE: usize = 16;

/// Offset of the expected CRC inside the BCA.
pub const CRC_SLOT_OFFSET: u32 = 0xC;

pub const CRC_SLOT_SIZE: u32 = 4;

pub const DEFAULT_BCA_ADDRESS: u32 = 0x83C0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BcaError {
    #[error("could not find Bootloader Configuration Area at {address:#X}")]
    NotFound { address: u32 },

    #[error(
        "Bootloader Configuration Area key mismatch at {address:#X}: expected 0x6766636B, found {found:#010X}"
    )]
    KeyMismatch { address: u32, found: u32 },

    #[error("invalid CRC range: start {start:#X}, count {count:#X}")]
    InvalidRange { start: u32, count: u32 },
}

/// Decoded BCA contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcaRecord {
    pub key: u32,
    pub crc_range: Range,
    pub expected_crc: u32,
}

/// The 4-byte word receiving the computed CRC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrcSlot {
    pub address: u32,
}

impl CrcSlot {
    pub fn new(address: u32) -> Self {
        Self { address }
    }

    /// Slot of the BCA located at `bca_address`.
    pub fn for_bca(bca_address: u32) -> Result<Self, RangeError> {
        let address = bca_address
            .checked_add(CRC_SLOT_OFFSET)
            .ok_or(RangeError::AddressOverflow {
                start: bca_address,
                length: CRC_SLOT_OFFSET,
            })?;
        Ok(Self { address })
    }

    pub fn range(&self) -> Result<Range, RangeError> {
        Range::from_start_length(self.address, CRC_SLOT_SIZE)
    }
}

/// Read and decode the BCA at `bca_address`.
pub fn decode_bca(image: &Image, bca_address: u32) -> Result<BcaRecord, BcaError> {
    let raw = image
        .read_bytes_contiguous(bca_address, BCA_SIZE)
        .ok_or(BcaError::NotFound {
            address: bca_address,
        })?;

    let word = |offset: usize| {
        u32::from_le_bytes([
            raw[offset],
            raw[offset + 1],
            raw[offset + 2],
            raw[offset + 3],
        ])
    };
    let key = word(0x0);
    let crc_start = word(0x4);
    let crc_count = word(0x8);
    let expected_crc = word(0xC);

    if key != BCA_MAGIC {
        return Err(BcaError::KeyMismatch {
            address: bca_address,
            found: key,
        });
    }

    if crc_start == BCA_UNDEFINED || crc_count == BCA_UNDEFINED {
        debug!("BCA at {bca_address:#X} leaves the CRC range unprogrammed; CRC checking disabled");
    }

    let invalid = BcaError::InvalidRange {
        start: crc_start,
        count: crc_count,
    };
    if crc_count == 0 {
        return Err(invalid);
    }
    let crc_range = Range::from_start_length(crc_start, crc_count).map_err(|_| invalid)?;

    debug!(
        "Found BCA at {bca_address:#X}: crc_start_address = {:#X}, crc_end_address = {:#X}, expected_crc = {expected_crc:#010X}",
        crc_range.start(),
        crc_range.end()
    );

    Ok(BcaRecord {
        key,
        crc_range,
        expected_crc,
    })
}

/// Encode the first 16 BCA bytes.
pub fn encode_bca(crc_start: u32, crc_count: u32, expected_crc: u32) -> [u8; BCA_SIZE] {
    let mut raw = [0u8; BCA_SIZE];
    for (chunk, word) in raw
        .chunks_exact_mut(4)
        .zip([BCA_MAGIC, crc_start, crc_count, expected_crc])
    {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Segment;

    fn image_with_bca(address: u32, raw: &[u8]) -> Image {
        Image::with_segments(vec![Segment::new(address, raw.to_vec())])
    }

    #[test]
    fn test_decode_well_formed() {
        let image = image_with_bca(0x83C0, &encode_bca(0x4300, 0x100, 0x1234_5678));
        let record = decode_bca(&image, 0x83C0).unwrap();
        assert_eq!(record.key, BCA_MAGIC);
        assert_eq!(record.crc_range, Range::from_start_end(0x4300, 0x4400).unwrap());
        assert_eq!(record.expected_crc, 0x1234_5678);
    }

    #[test]
    fn test_decode_raw_dump() {
        // 000043C0: 6B 63 66 67 00 40 00 00 00 BC 00 00 0B 28 8A 9C  #kcfg.@...<...(..
        let raw = [
            0x6B, 0x63, 0x66, 0x67, 0x00, 0x40, 0x00, 0x00, 0x00, 0xBC, 0x00, 0x00, 0x0B, 0x28,
            0x8A, 0x9C,
        ];
        assert_eq!(&raw[..4], b"kcfg");
        let record = decode_bca(&image_with_bca(0x43C0, &raw), 0x43C0).unwrap();
        assert_eq!(record.crc_range, Range::from_start_length(0x4000, 0xBC00).unwrap());
        assert_eq!(record.expected_crc, 0x9C8A_280B);
    }

    #[test]
    fn test_decode_across_segments() {
        let raw = encode_bca(0x4300, 0x100, 0);
        let image = Image::with_segments(vec![
            Segment::new(0x83C0, raw[..6].to_vec()),
            Segment::new(0x83C6, raw[6..].to_vec()),
        ]);
        assert!(decode_bca(&image, 0x83C0).is_ok());
    }

    #[test]
    fn test_zeroed_window_is_key_mismatch() {
        let image = image_with_bca(0x83C0, &[0u8; 16]);
        assert_eq!(
            decode_bca(&image, 0x83C0),
            Err(BcaError::KeyMismatch {
                address: 0x83C0,
                found: 0
            })
        );
    }

    #[test]
    fn test_short_window_is_not_found() {
        let raw = encode_bca(0x4300, 0x100, 0);
        let image = image_with_bca(0x83C0, &raw[..15]);
        assert_eq!(
            decode_bca(&image, 0x83C0),
            Err(BcaError::NotFound { address: 0x83C0 })
        );
    }

    #[test]
    fn test_hole_in_window_is_not_found() {
        let raw = encode_bca(0x4300, 0x100, 0);
        let image = Image::with_segments(vec![
            Segment::new(0x83C0, raw[..8].to_vec()),
            Segment::new(0x83C9, raw[9..].to_vec()),
        ]);
        assert!(matches!(
            decode_bca(&image, 0x83C0),
            Err(BcaError::NotFound { .. })
        ));
    }

    #[test]
    fn test_window_past_address_space_is_not_found() {
        assert!(matches!(
            decode_bca(&Image::new(), u32::MAX - 4),
            Err(BcaError::NotFound { .. })
        ));
    }

    #[test]
    fn test_zero_count_is_invalid_range() {
        let image = image_with_bca(0x83C0, &encode_bca(0x4300, 0, 0));
        assert_eq!(
            decode_bca(&image, 0x83C0),
            Err(BcaError::InvalidRange {
                start: 0x4300,
                count: 0
            })
        );
    }

    #[test]
    fn test_overflowing_range_is_invalid() {
        let image = image_with_bca(0x83C0, &encode_bca(0xFFFF_FF00, 0x100, 0));
        assert!(matches!(
            decode_bca(&image, 0x83C0),
            Err(BcaError::InvalidRange { .. })
        ));

        let erased = image_with_bca(0x83C0, &encode_bca(BCA_UNDEFINED, BCA_UNDEFINED, 0));
        assert!(matches!(
            decode_bca(&erased, 0x83C0),
            Err(BcaError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_key_checked_before_range() {
        let mut raw = encode_bca(0x4300, 0, 0);
        raw[0] = 0x00;
        assert!(matches!(
            decode_bca(&image_with_bca(0x83C0, &raw), 0x83C0),
            Err(BcaError::KeyMismatch { .. })
        ));
    }

    #[test]
    fn test_crc_slot() {
        let slot = CrcSlot::for_bca(DEFAULT_BCA_ADDRESS).unwrap();
        assert_eq!(slot.address, 0x83CC);
        assert_eq!(slot.range().unwrap(), Range::from_start_end(0x83CC, 0x83D0).unwrap());

        assert!(CrcSlot::for_bca(u32::MAX - 8).is_err());
        assert!(CrcSlot::new(u32::MAX - 2).range().is_err());
    }
}
