//! # EncodingLens - Text Representation Converter
//!
//! Converts text between the representations developers juggle while
//! debugging encoding problems: plain text, hexadecimal code units, UTF-8
//! bit strings and Unicode escape sequences.
//!
//! ## Features
//!
//! - **Canonical pivot**: every conversion goes through a sequence of Unicode
//!   scalar values, so code units, bytes and codepoints are never mixed up
//! - **Surrogate-pair aware** hex and escape codecs
//! - **Lossy fallback** to `?` for ASCII and ISO-8859-1 targets
//! - **Pure and thread-safe**: no shared state between calls
//!
//! ## Quick Start
//!
//! ```rust
//! use encoding_lens::{convert, Encoding};
//!
//! let outcome = convert("Hello", Encoding::Utf8, Encoding::Hex);
//! assert_eq!(outcome.output(), Some("48 65 6c 6c 6f"));
//!
//! let back = convert("48 65 6c 6c 6f", Encoding::Hex, Encoding::Utf8);
//! assert_eq!(back.output(), Some("Hello"));
//! ```

#![deny(missing_docs)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod decode;
pub mod encode;
pub mod pipeline;
mod scalars;
pub mod validation;

pub use pipeline::{ConversionOutcome, ConversionRequest, convert};
pub use scalars::ScalarSequence;
pub use validation::{MAX_INPUT_CHARS, ValidationResult, validate};

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while validating, decoding or encoding input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Input is empty or whitespace only
    #[error("Input is empty")]
    EmptyInput,

    /// Input exceeds the size limit
    #[error("Input is too large: {length} characters (limit {limit})")]
    InputTooLarge {
        /// Input length in characters
        length: usize,
        /// Maximum accepted length
        limit: usize,
    },

    /// Input does not match the hex grammar
    #[error("Malformed hex input: {0}")]
    MalformedHex(String),

    /// Input does not match the binary grammar
    #[error("Malformed binary input: {0}")]
    MalformedBinary(String),

    /// Input contains no recognizable escape sequence
    #[error("Malformed unicode escape input: no \\uXXXX or \\u{{X}} sequence found")]
    MalformedUnicodeEscape,

    /// A numeric group could not be parsed
    #[error("Invalid code unit '{group}' at group {position}")]
    InvalidCodeUnit {
        /// The offending group as written in the input
        group: String,
        /// Zero-based index of the group
        position: usize,
    },

    /// A surrogate code unit without its partner
    #[error("Unpaired surrogate 0x{unit:04X} at group {position}")]
    UnpairedSurrogate {
        /// The surrogate code unit
        unit: u16,
        /// Zero-based index of the group
        position: usize,
    },

    /// A codepoint outside the Unicode scalar value range
    #[error("Value 0x{value:X} at group {position} is not a Unicode scalar value")]
    InvalidScalar {
        /// The parsed value
        value: u32,
        /// Zero-based index of the group
        position: usize,
    },

    /// Byte stream is not valid UTF-8
    #[error("Invalid UTF-8 sequence at byte {position}")]
    InvalidUtf8 {
        /// Offset of the first invalid byte
        position: usize,
    },

    /// Encoding identifier not recognized
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    /// Unexpected internal fault
    #[error("Conversion failed: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error onto the conversion error taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyInput => ErrorKind::EmptyInput,
            Error::InputTooLarge { .. } => ErrorKind::InputTooLarge,
            Error::MalformedHex(_) => ErrorKind::MalformedHex,
            Error::MalformedBinary(_) => ErrorKind::MalformedBinary,
            Error::MalformedUnicodeEscape => ErrorKind::MalformedUnicodeEscape,
            Error::InvalidCodeUnit { .. }
            | Error::UnpairedSurrogate { .. }
            | Error::InvalidScalar { .. }
            | Error::InvalidUtf8 { .. } => ErrorKind::InvalidCodeUnit,
            Error::UnknownEncoding(_) | Error::Internal(_) => ErrorKind::UnknownConversionFailure,
        }
    }
}

/// Error taxonomy reported in a failed [`ConversionOutcome`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Input is empty or all whitespace
    EmptyInput,
    /// Input exceeds [`MAX_INPUT_CHARS`]
    InputTooLarge,
    /// Input fails the hex grammar
    MalformedHex,
    /// Input fails the binary grammar
    MalformedBinary,
    /// Input fails the unicode escape grammar
    MalformedUnicodeEscape,
    /// A group or escape parsed to an unusable value, or bytes are not UTF-8
    InvalidCodeUnit,
    /// Any unexpected internal fault
    UnknownConversionFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Supported text representations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    /// Plain text
    #[serde(rename = "utf-8")]
    Utf8,
    /// `\uXXXX` escape per UTF-16 code unit
    #[serde(rename = "utf-16")]
    Utf16,
    /// 7-bit ASCII, `?` for anything above 0x7F
    #[serde(rename = "ascii")]
    Ascii,
    /// Latin-1, `?` for anything above 0xFF
    #[serde(rename = "iso-8859-1")]
    Iso8859_1,
    /// Space separated hexadecimal UTF-16 code units
    #[serde(rename = "hex")]
    Hex,
    /// Space separated 8-bit groups of UTF-8 bytes
    #[serde(rename = "binary")]
    Binary,
    /// JavaScript style `\uXXXX` and `\u{X}` escapes
    #[serde(rename = "unicode-escape")]
    UnicodeEscape,
}

impl Encoding {
    /// All encodings in declaration order
    pub const ALL: [Encoding; 7] = [
        Encoding::Utf8,
        Encoding::Utf16,
        Encoding::Ascii,
        Encoding::Iso8859_1,
        Encoding::Hex,
        Encoding::Binary,
        Encoding::UnicodeEscape,
    ];

    /// Get the stable identifier of this encoding
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Utf16 => "utf-16",
            Encoding::Ascii => "ascii",
            Encoding::Iso8859_1 => "iso-8859-1",
            Encoding::Hex => "hex",
            Encoding::Binary => "binary",
            Encoding::UnicodeEscape => "unicode-escape",
        }
    }

    /// Check if input in this encoding is taken as already decoded text
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Encoding::Utf8 | Encoding::Utf16 | Encoding::Ascii | Encoding::Iso8859_1
        )
    }

    /// Check if encoding into this target can replace characters with `?`
    pub fn is_lossy_target(self) -> bool {
        matches!(self, Encoding::Ascii | Encoding::Iso8859_1)
    }

    /// Human readable description
    pub fn description(self) -> &'static str {
        match self {
            Encoding::Utf8 => "Plain Unicode text",
            Encoding::Utf16 => "UTF-16 code units written as \\uXXXX escapes",
            Encoding::Ascii => "American Standard Code for Information Interchange (7-bit)",
            Encoding::Iso8859_1 => "Latin alphabet No. 1, Western European",
            Encoding::Hex => "Hexadecimal UTF-16 code units, one group per unit",
            Encoding::Binary => "UTF-8 bytes as 8-bit binary groups",
            Encoding::UnicodeEscape => "Escape notation with \\uXXXX and \\u{X} sequences",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Encoding::ALL
            .into_iter()
            .find(|encoding| encoding.name() == s)
            .ok_or_else(|| Error::UnknownEncoding(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_names() {
        let names: Vec<_> = Encoding::ALL.iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            [
                "utf-8",
                "utf-16",
                "ascii",
                "iso-8859-1",
                "hex",
                "binary",
                "unicode-escape"
            ]
        );
    }

    #[test]
    fn test_encoding_from_str() {
        for encoding in Encoding::ALL {
            assert_eq!(encoding.name().parse::<Encoding>().unwrap(), encoding);
            assert_eq!(encoding.to_string(), encoding.name());
        }
        // Only the exact stable identifiers are accepted
        for alias in ["UTF-8", "utf8", "latin1", "unicode", " hex"] {
            assert!(alias.parse::<Encoding>().is_err(), "accepted {:?}", alias);
        }

        let err = "gbk".parse::<Encoding>().unwrap_err();
        assert_eq!(err, Error::UnknownEncoding("gbk".to_string()));
        assert_eq!(err.kind(), ErrorKind::UnknownConversionFailure);
    }

    #[test]
    fn test_encoding_serde_ids() {
        let json = serde_json::to_string(&Encoding::Iso8859_1).unwrap();
        assert_eq!(json, "\"iso-8859-1\"");

        let parsed: Encoding = serde_json::from_str("\"unicode-escape\"").unwrap();
        assert_eq!(parsed, Encoding::UnicodeEscape);
        assert!(serde_json::from_str::<Encoding>("\"utf-32\"").is_err());
    }

    #[test]
    fn test_encoding_properties() {
        assert!(Encoding::Utf8.is_text());
        assert!(Encoding::Iso8859_1.is_text());
        assert!(!Encoding::Hex.is_text());
        assert!(!Encoding::UnicodeEscape.is_text());

        assert!(Encoding::Ascii.is_lossy_target());
        assert!(!Encoding::Utf16.is_lossy_target());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::EmptyInput.kind(), ErrorKind::EmptyInput);
        assert_eq!(
            Error::UnpairedSurrogate {
                unit: 0xD800,
                position: 0
            }
            .kind(),
            ErrorKind::InvalidCodeUnit
        );
        assert_eq!(
            Error::InvalidUtf8 { position: 3 }.kind(),
            ErrorKind::InvalidCodeUnit
        );
        assert_eq!(
            Error::Internal("boom".into()).kind(),
            ErrorKind::UnknownConversionFailure
        );
    }

    #[test]
    fn test_error_messages() {
        let err = Error::UnpairedSurrogate {
            unit: 0xDC00,
            position: 2,
        };
        assert_eq!(err.to_string(), "Unpaired surrogate 0xDC00 at group 2");

        let err = Error::InputTooLarge {
            length: 10,
            limit: 5,
        };
        assert_eq!(
            err.to_string(),
            "Input is too large: 10 characters (limit 5)"
        );
    }
}
