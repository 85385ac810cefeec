use std::io::Write;
use std::path::Path;

use bca_crc::{Error, Image, SRecordWriteOptions};

/// Read an S-record file. Records that disagree about a byte are rejected.
pub(crate) fn load_image(path: &Path) -> Result<Image, Error> {
    let content = std::fs::read(path)?;
    let image = bca_crc::parse_srec(&content)?;
    Ok(image.normalized()?)
}

/// Write `image` as S-records to `path`, or to stdout when `path` is `-`.
pub(crate) fn write_image(image: &Image, path: &Path) -> Result<(), Error> {
    let output = bca_crc::write_srec(image, &SRecordWriteOptions::default());
    if path.as_os_str() == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&output)?;
        stdout.flush()?;
    } else {
        std::fs::write(path, output)?;
    }
    Ok(())
}
