use crate::io::{ParseError, push_crlf, push_hex_byte};
use crate::{Image, Range, Segment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SRecordType {
    S1,
    S2,
    S3,
}

impl SRecordType {
    fn address_len(self) -> usize {
        match self {
            SRecordType::S1 => 2,
            SRecordType::S2 => 3,
            SRecordType::S3 => 4,
        }
    }

    fn data_digit(self) -> u8 {
        match self {
            SRecordType::S1 => b'1',
            SRecordType::S2 => b'2',
            SRecordType::S3 => b'3',
        }
    }

    fn termination_digit(self) -> u8 {
        match self {
            SRecordType::S1 => b'9',
            SRecordType::S2 => b'8',
            SRecordType::S3 => b'7',
        }
    }

    /// Smallest record type that can address `max_addr`.
    fn for_max_address(max_addr: u32) -> Self {
        match max_addr {
            0..=0xFFFF => SRecordType::S1,
            0x1_0000..=0xFF_FFFF => SRecordType::S2,
            _ => SRecordType::S3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SRecordWriteOptions {
    pub bytes_per_line: u8,
}

impl Default for SRecordWriteOptions {
    fn default() -> Self {
        Self { bytes_per_line: 16 }
    }
}

/// Parse Motorola S-Record input.
///
/// Data records (S1/S2/S3) become segments in file order. Header, count and
/// termination records are validated and skipped.
pub fn parse_srec(data: &[u8]) -> Result<Image, ParseError> {
    let mut image = Image::new();

    for (idx, raw_line) in data.split(|&b| b == b'\n').enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim_ascii();
        if line.is_empty() {
            continue;
        }
        if (line[0] != b'S' && line[0] != b's') || line.len() < 2 {
            return Err(ParseError::InvalidRecord {
                line: line_no,
                message: "missing S-record prefix".to_string(),
            });
        }

        let record_type = line[1] as char;
        let record_bytes = parse_hex_bytes(&line[2..], line_no)?;
        let Some((&count, _)) = record_bytes.split_first() else {
            return Err(ParseError::InvalidRecord {
                line: line_no,
                message: "missing record length".to_string(),
            });
        };

        let count = count as usize;
        if record_bytes.len() != count + 1 {
            return Err(ParseError::InvalidRecord {
                line: line_no,
                message: format!(
                    "byte count mismatch: expected {}, got {}",
                    count + 1,
                    record_bytes.len()
                ),
            });
        }

        let (&actual, body) = record_bytes
            .split_last()
            .ok_or(ParseError::InvalidRecord {
                line: line_no,
                message: "missing checksum".to_string(),
            })?;
        let expected = expected_checksum(body);
        if expected != actual {
            return Err(ParseError::ChecksumMismatch {
                line: line_no,
                expected,
                actual,
            });
        }

        let data_type = match record_type {
            '0' | '5' | '6' | '7' | '8' | '9' => continue,
            '1' => SRecordType::S1,
            '2' => SRecordType::S2,
            '3' => SRecordType::S3,
            other => {
                return Err(ParseError::UnsupportedRecordType {
                    line: line_no,
                    record_type: other,
                });
            }
        };

        let addr_end = 1 + data_type.address_len();
        if body.len() < addr_end {
            return Err(ParseError::InvalidRecord {
                line: line_no,
                message: "record length too short".to_string(),
            });
        }

        let addr = parse_address(&body[1..addr_end]);
        let payload = &body[addr_end..];
        if payload.is_empty() {
            continue;
        }
        Range::from_start_length(addr, payload.len() as u32).map_err(|_| {
            ParseError::AddressOverflow(format!("{:#X} + {} exceeds u32", addr, payload.len()))
        })?;
        image.append_segment(Segment::new(addr, payload.to_vec()));
    }

    Ok(image)
}

/// Write Motorola S-Record output.
///
/// The data record type is the smallest one that reaches the highest address.
pub fn write_srec(image: &Image, options: &SRecordWriteOptions) -> Vec<u8> {
    let normalized = image.normalized_lossy();
    let max_addr = normalized
        .end_address()
        .map(|end| end.saturating_sub(1))
        .unwrap_or(0);
    let record_type = SRecordType::for_max_address(max_addr);

    let bytes_per_line = match options.bytes_per_line {
        0 => 16,
        n => n,
    } as usize;
    let addr_len = record_type.address_len();

    let mut out = Vec::new();

    for segment in normalized.segments() {
        let mut addr = segment.start_address;
        for chunk in segment.data.chunks(bytes_per_line) {
            let addr_bytes = addr.to_be_bytes();
            let mut record = Vec::with_capacity(1 + addr_len + chunk.len());
            record.push((addr_len + chunk.len() + 1) as u8);
            record.extend_from_slice(&addr_bytes[4 - addr_len..]);
            record.extend_from_slice(chunk);
            push_record_line(&mut out, record_type.data_digit(), &record);
            addr = addr.wrapping_add(chunk.len() as u32);
        }
    }

    let mut term = vec![(addr_len + 1) as u8];
    term.extend(std::iter::repeat_n(0u8, addr_len));
    push_record_line(&mut out, record_type.termination_digit(), &term);

    out
}

fn parse_hex_bytes(data: &[u8], line: usize) -> Result<Vec<u8>, ParseError> {
    if !data.len().is_multiple_of(2) {
        return Err(ParseError::InvalidRecord {
            line,
            message: "odd number of hex digits".to_string(),
        });
    }
    data.chunks_exact(2)
        .map(|pair| {
            let digit = |c: u8| {
                (c as char)
                    .to_digit(16)
                    .ok_or(ParseError::InvalidHexDigit {
                        line,
                        char: c as char,
                    })
            };
            Ok(((digit(pair[0])? << 4) | digit(pair[1])?) as u8)
        })
        .collect()
}

fn parse_address(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32)
}

fn expected_checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    0xFFu8.wrapping_sub(sum)
}

/// Emit `S<digit>`, the record bytes and their checksum as one line.
fn push_record_line(out: &mut Vec<u8>, digit: u8, record: &[u8]) {
    out.push(b'S');
    out.push(digit);
    for &byte in record {
        push_hex_byte(out, byte);
    }
    push_hex_byte(out, expected_checksum(record));
    push_crlf(out);
}
