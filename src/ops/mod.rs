mod checksum;
mod error;
mod filter;

pub use checksum::{CRC_32_BCA, CrcParams, crc32_bca};
pub use error::OpsError;
