mod error;
mod srec;

pub use error::ParseError;
pub use srec::{SRecordWriteOptions, parse_srec, write_srec};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

pub(crate) fn push_hex_byte(out: &mut Vec<u8>, byte: u8) {
    out.push(HEX_DIGITS[(byte >> 4) as usize]);
    out.push(HEX_DIGITS[(byte & 0x0F) as usize]);
}

pub(crate) fn push_crlf(out: &mut Vec<u8>) {
    out.extend_from_slice(b"\r\n");
}
