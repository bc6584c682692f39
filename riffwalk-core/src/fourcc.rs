//! Four character codes identifying chunks and list types

use std::fmt;
use std::str::FromStr;

/// A 4-byte chunk or list type tag
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    pub const RIFF: FourCc = FourCc(*b"RIFF");
    pub const BW64: FourCc = FourCc(*b"BW64");
    pub const LIST: FourCc = FourCc(*b"LIST");
    pub const DS64: FourCc = FourCc(*b"ds64");

    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// All four bytes in 0x20..=0x7E
    pub fn is_printable(&self) -> bool {
        is_printable(&self.0)
    }

    /// Only RIFF, BW64 and LIST chunks may hold sub chunks
    pub fn is_list(&self) -> bool {
        matches!(*self, FourCc::RIFF | FourCc::BW64 | FourCc::LIST)
    }

    /// Valid outer header ids
    pub fn is_file_id(&self) -> bool {
        matches!(*self, FourCc::RIFF | FourCc::BW64)
    }
}

pub(crate) fn is_printable(bytes: &[u8; 4]) -> bool {
    bytes.iter().all(|b| (0x20..=0x7e).contains(b))
}

/// Renders tag bytes for messages, hex-escaping anything unprintable
pub fn escape(bytes: &[u8; 4]) -> String {
    if is_printable(bytes) {
        return format!("'{}'", bytes.iter().map(|&b| b as char).collect::<String>());
    }
    let hex: Vec<String> = bytes.iter().map(|b| format!("0x{b:02x}")).collect();
    hex.join(",")
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if (0x20..=0x7e).contains(&b) {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc(\"{self}\")")
    }
}

impl From<[u8; 4]> for FourCc {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl From<&[u8; 4]> for FourCc {
    fn from(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }
}

impl PartialEq<[u8; 4]> for FourCc {
    fn eq(&self, other: &[u8; 4]) -> bool {
        &self.0 == other
    }
}

impl PartialEq<&[u8; 4]> for FourCc {
    fn eq(&self, other: &&[u8; 4]) -> bool {
        &self.0 == *other
    }
}

/// Error parsing a [`FourCc`] from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Four character code must be 1 to 4 printable ASCII characters, got {0:?}")]
pub struct ParseFourCcError(String);

impl FromStr for FourCc {
    type Err = ParseFourCcError;

    /// Short codes are padded with spaces, so `"fmt"` parses as `"fmt "`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.is_empty() || bytes.len() > 4 {
            return Err(ParseFourCcError(s.to_string()));
        }
        let mut tag = [b' '; 4];
        tag[..bytes.len()].copy_from_slice(bytes);
        if !is_printable(&tag) {
            return Err(ParseFourCcError(s.to_string()));
        }
        Ok(Self(tag))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FourCc {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_capable_tags() {
        assert!(FourCc::RIFF.is_list());
        assert!(FourCc::BW64.is_list());
        assert!(FourCc::LIST.is_list());
        assert!(!FourCc::from(b"fmt ").is_list());
        assert!(!FourCc::from(b"list").is_list());
    }

    #[test]
    fn test_printable_range() {
        assert!(FourCc::from(b"fmt ").is_printable());
        assert!(FourCc::from(b"~ ~ ").is_printable());
        assert!(!FourCc::new([0x1f, b'a', b'b', b'c']).is_printable());
        assert!(!FourCc::new([b'a', b'b', b'c', 0x7f]).is_printable());
    }

    #[test]
    fn test_parse_pads_short_codes() {
        assert_eq!("fmt".parse::<FourCc>().unwrap(), FourCc::from(b"fmt "));
        assert_eq!("data".parse::<FourCc>().unwrap(), FourCc::from(b"data"));
        assert!("".parse::<FourCc>().is_err());
        assert!("fivec".parse::<FourCc>().is_err());
        assert!("a\tb".parse::<FourCc>().is_err());
    }

    #[test]
    fn test_display_escapes_unprintable() {
        assert_eq!(FourCc::from(b"WAVE").to_string(), "WAVE");
        assert_eq!(FourCc::new([b'a', 0, b'b', 0xff]).to_string(), "a\\x00b\\xff");
        assert_eq!(escape(&[1, 2, 3, 4]), "0x01,0x02,0x03,0x04");
        assert_eq!(escape(b"LIST"), "'LIST'");
    }
}
