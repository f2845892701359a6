//! Parses an IEEE EUI-48 MAC address written as six hexadecimal pairs
//! separated by either colons or hyphens.
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Length of the textual form, e.g. `AA:BB:CC:DD:EE:FF`.
pub const MAC_STR_LEN: usize = 17;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid MAC address
    #[error("invalid length")]
    InvalidLength,

    /// Expected ':' or '-'
    #[error("expected a separator at position {0}")]
    ExpectedSeparator(usize),

    /// Colons and hyphens in the same address
    #[error("mixed separators at position {0}")]
    MixedSeparators(usize),

    #[error("invalid hexadecimal digit at position {0}")]
    InvalidHexDigit(usize),
}

/// A six byte hardware address, octet 0 first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Parses `XX:XX:XX:XX:XX:XX` or `XX-XX-XX-XX-XX-XX`. The whole input must
    /// match; one separator kind per address.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let raw = input.as_bytes();

        // must be exactly 17 characters long
        if raw.len() != MAC_STR_LEN {
            return Err(ParseError::InvalidLength);
        }

        // every 3rd character is a separator, and all of them agree
        let separator = match raw[2] {
            c @ (b':' | b'-') => c,
            _ => return Err(ParseError::ExpectedSeparator(2)),
        };
        for index in (5..MAC_STR_LEN).step_by(3) {
            match raw[index] {
                c if c == separator => {}
                b':' | b'-' => return Err(ParseError::MixedSeparators(index)),
                _ => return Err(ParseError::ExpectedSeparator(index)),
            }
        }

        let mut bytes = [0u8; 6];
        for (i, octet) in bytes.iter_mut().enumerate() {
            let pos = i * 3;
            let hi = nibble(raw[pos]).ok_or(ParseError::InvalidHexDigit(pos))?;
            let lo = nibble(raw[pos + 1]).ok_or(ParseError::InvalidHexDigit(pos + 1))?;
            *octet = hi << 4 | lo;
        }

        Ok(Self(bytes))
    }
}

fn nibble(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

impl FromStr for MacAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl fmt::LowerHex for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}
