use thiserror::Error;

use crate::{ImageError, RangeError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OpsError {
    #[error("address overflow offsetting segment at {address:#X} by {delta}")]
    AddressOverflow { address: u32, delta: i64 },

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Range(#[from] RangeError),
}
