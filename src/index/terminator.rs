//! Line terminator detection
//!
//! The default newline scan uses `memchr` for SIMD-accelerated byte search;
//! multi-byte delimiters go through `memchr::memmem`.

use crate::error::{ArrayFileError, Result};
use memchr::memmem;

/// Byte sequence that ends a logical line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LineTerminator {
    /// A single `\n`; a preceding `\r` is also stripped from decoded lines
    #[default]
    Newline,
    /// An arbitrary non-empty byte sequence
    Custom(Vec<u8>),
}

impl LineTerminator {
    /// Build a terminator from raw bytes. `b"\n"` normalizes to [`LineTerminator::Newline`].
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        match bytes.as_slice() {
            [] => Err(ArrayFileError::invalid_argument(
                "line delimiter must not be empty",
            )),
            b"\n" => Ok(LineTerminator::Newline),
            _ => Ok(LineTerminator::Custom(bytes)),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            LineTerminator::Newline => b"\n",
            LineTerminator::Custom(bytes) => bytes,
        }
    }

    pub fn is_newline(&self) -> bool {
        matches!(self, LineTerminator::Newline)
    }

    /// Offsets immediately following every terminator occurrence in `data`
    ///
    /// Matches never overlap: scanning resumes after each match.
    pub fn scan(&self, data: &[u8]) -> Vec<u64> {
        match self {
            LineTerminator::Newline => memchr::memchr_iter(b'\n', data)
                .map(|pos| (pos + 1) as u64)
                .collect(),
            LineTerminator::Custom(delimiter) => {
                let finder = memmem::Finder::new(delimiter);
                finder
                    .find_iter(data)
                    .map(|pos| (pos + delimiter.len()) as u64)
                    .collect()
            }
        }
    }

    /// Remove one trailing terminator from `line`, if present
    pub fn strip<'a>(&self, line: &'a [u8]) -> &'a [u8] {
        match self {
            LineTerminator::Newline => match line.strip_suffix(b"\n") {
                Some(rest) => rest.strip_suffix(b"\r").unwrap_or(rest),
                None => line,
            },
            LineTerminator::Custom(delimiter) => {
                line.strip_suffix(delimiter.as_slice()).unwrap_or(line)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes() {
        assert_eq!(
            LineTerminator::from_bytes(b"\n".to_vec()).unwrap(),
            LineTerminator::Newline
        );
        assert_eq!(
            LineTerminator::from_bytes("\n\n").unwrap(),
            LineTerminator::Custom(b"\n\n".to_vec())
        );
        assert!(LineTerminator::from_bytes(Vec::new()).is_err());
    }

    #[test]
    fn test_newline_scan() {
        let ends = LineTerminator::Newline.scan(b"line1\nline2\n\nlast");
        assert_eq!(ends, vec![6, 12, 13]);
    }

    #[test]
    fn test_custom_scan_does_not_overlap() {
        let terminator = LineTerminator::Custom(b"\n\n".to_vec());
        // "a\n\n\nb" has one match at 1, then resumes at 3
        assert_eq!(terminator.scan(b"a\n\n\nb"), vec![3]);
        assert_eq!(terminator.scan(b"a\n\nb\n\n"), vec![3, 6]);
        assert!(terminator.scan(b"no delimiter").is_empty());
    }

    #[test]
    fn test_strip_newline() {
        let newline = LineTerminator::Newline;
        assert_eq!(newline.strip(b"text\n"), b"text");
        assert_eq!(newline.strip(b"text\r\n"), b"text");
        assert_eq!(newline.strip(b"text"), b"text");
        assert_eq!(newline.strip(b"text\r"), b"text\r");
        assert_eq!(newline.strip(b"\n"), b"");
    }

    #[test]
    fn test_strip_custom() {
        let custom = LineTerminator::Custom(b"||".to_vec());
        assert_eq!(custom.strip(b"a|b||"), b"a|b");
        assert_eq!(custom.strip(b"a|b|"), b"a|b|");
        assert_eq!(custom.as_bytes(), b"||");
        assert!(!custom.is_newline());
    }
}
