use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("range start ({start:#X}) exceeds end ({end:#X})")]
    StartExceedsEnd { start: u32, end: u32 },

    #[error("range {start:#X} + {length:#X} overflows the 32-bit address space")]
    AddressOverflow { start: u32, length: u32 },
}

/// A half-open memory address range `[start, end)`.
///
/// Empty ranges (`start == end`) are valid and contain no addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    start: u32,
    end: u32, // exclusive
}

impl Range {
    /// Create range from start address and length.
    pub fn from_start_length(start: u32, length: u32) -> Result<Self, RangeError> {
        let end = start
            .checked_add(length)
            .ok_or(RangeError::AddressOverflow { start, length })?;
        Ok(Self { start, end })
    }

    /// Create range from start and end addresses (end exclusive).
    pub fn from_start_end(start: u32, end: u32) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::StartExceedsEnd { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn length(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.start && addr < self.end
    }

    /// True when the ranges share no address. Touching ranges are disjoint,
    /// and so is an empty range.
    pub fn is_disjoint(&self, other: &Range) -> bool {
        self.is_empty() || other.is_empty() || self.start >= other.end || self.end <= other.start
    }

    pub fn overlaps(&self, other: &Range) -> bool {
        !self.is_disjoint(other)
    }

    /// Return the intersection of two ranges, if they overlap.
    pub fn intersection(&self, other: &Range) -> Option<Range> {
        if self.is_disjoint(other) {
            return None;
        }
        Some(Range {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }
}

/// Parse a number from decimal, hex (`0x`), octal (`0o`) or binary (`0b`).
pub fn parse_number(s: &str) -> Result<u32, RangeError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(RangeError::InvalidNumber("empty string".to_string()));
    }

    let (radix, digits) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        (2, bin)
    } else if let Some(oct) = s.strip_prefix("0o").or_else(|| s.strip_prefix("0O")) {
        (8, oct)
    } else {
        (10, s)
    };

    u32::from_str_radix(digits, radix).map_err(|e| RangeError::InvalidNumber(e.to_string()))
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:#X}, {:#X})", self.start, self.end)
    }
}
