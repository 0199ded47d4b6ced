//! Text encodings understood by the views.
//!
//! Lines are decoded straight out of the mapped region. Valid UTF-8 borrows
//! from the mapping; single-byte encodings allocate.

use crate::error::{ArrayFileError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Encoding used to turn line bytes into text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Encoding {
    /// Strict UTF-8; invalid sequences are a `DecodeError`
    #[default]
    Utf8,
    /// UTF-8 with invalid sequences replaced by U+FFFD
    Utf8Lossy,
    /// ISO-8859-1, every byte maps to the code point of the same value
    Latin1,
    /// 7-bit ASCII; bytes above 0x7F are a `DecodeError`
    Ascii,
}

impl Encoding {
    /// Canonical label, also used in error messages
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Utf8Lossy => "utf-8-lossy",
            Encoding::Latin1 => "latin-1",
            Encoding::Ascii => "ascii",
        }
    }

    /// Decode `bytes`, which start at absolute byte `offset` in the file.
    pub fn decode<'a>(self, bytes: &'a [u8], offset: u64) -> Result<Cow<'a, str>> {
        match self {
            Encoding::Utf8 => std::str::from_utf8(bytes).map(Cow::Borrowed).map_err(|e| {
                ArrayFileError::DecodeError {
                    encoding: self.name(),
                    offset: offset + e.valid_up_to() as u64,
                    message: e.to_string(),
                }
            }),
            Encoding::Utf8Lossy => Ok(String::from_utf8_lossy(bytes)),
            Encoding::Latin1 => {
                if bytes.is_ascii() {
                    // ASCII is valid UTF-8 with identical code points
                    Ok(Cow::Borrowed(std::str::from_utf8(bytes).unwrap_or_default()))
                } else {
                    Ok(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()))
                }
            }
            Encoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(ArrayFileError::DecodeError {
                    encoding: self.name(),
                    offset: offset + pos as u64,
                    message: format!("byte 0x{:02x} is not ASCII", bytes[pos]),
                }),
                None => Ok(Cow::Borrowed(std::str::from_utf8(bytes).unwrap_or_default())),
            },
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Encoding> for String {
    fn from(encoding: Encoding) -> Self {
        encoding.name().to_string()
    }
}

impl TryFrom<String> for Encoding {
    type Error = ArrayFileError;

    fn try_from(label: String) -> Result<Self> {
        label.parse()
    }
}

impl FromStr for Encoding {
    type Err = ArrayFileError;

    fn from_str(label: &str) -> Result<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "utf-8-lossy" | "utf8-lossy" => Ok(Encoding::Utf8Lossy),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "l1" => Ok(Encoding::Latin1),
            "ascii" | "us-ascii" => Ok(Encoding::Ascii),
            _ => Err(ArrayFileError::invalid_argument(format!(
                "unsupported encoding: {label}"
            ))),
        }
    }
}
