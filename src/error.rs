use thiserror::Error;

use crate::image::ImageError;
use crate::io::ParseError;
use crate::update::UpdateError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("source image has contradictory records: {0}")]
    Image(#[from] ImageError),

    #[error(transparent)]
    Update(#[from] UpdateError),
}
