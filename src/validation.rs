//! Lexical validation of raw input against the grammar of its source format
//!
//! Validation runs before any decoding and never mutates the input. The
//! generic checks (emptiness, size) apply to every format; hex, binary and
//! unicode escape input additionally has to match its own grammar.

use crate::{Encoding, Error};

/// Maximum accepted input length in characters (1 MiB)
pub const MAX_INPUT_CHARS: usize = 1_048_576;

/// Result of validating raw input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the input passed every check
    pub ok: bool,
    /// The first failed check, if any
    pub error: Option<Error>,
}

impl ValidationResult {
    fn pass() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    fn fail(error: Error) -> Self {
        Self {
            ok: false,
            error: Some(error),
        }
    }

    /// Convert into a `Result`, surfacing the recorded error
    pub fn into_result(self) -> crate::Result<()> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Validate `raw` against the grammar of `source`
pub fn validate(raw: &str, source: Encoding) -> ValidationResult {
    if raw.trim().is_empty() {
        return ValidationResult::fail(Error::EmptyInput);
    }

    // Byte length bounds the char count, so only count when it could matter
    if raw.len() > MAX_INPUT_CHARS {
        let length = raw.chars().count();
        if length > MAX_INPUT_CHARS {
            return ValidationResult::fail(Error::InputTooLarge {
                length,
                limit: MAX_INPUT_CHARS,
            });
        }
    }

    let checked = match source {
        Encoding::Hex => check_hex(raw),
        Encoding::Binary => check_binary(raw),
        Encoding::UnicodeEscape => check_unicode_escape(raw),
        Encoding::Utf8 | Encoding::Utf16 | Encoding::Ascii | Encoding::Iso8859_1 => Ok(()),
    };

    match checked {
        Ok(()) => ValidationResult::pass(),
        Err(error) => ValidationResult::fail(error),
    }
}

/// Check if `raw` is whitespace separated hex with an even digit count
pub fn is_valid_hex(raw: &str) -> bool {
    check_hex(raw).is_ok()
}

/// Check if `raw` is whitespace separated bits forming whole bytes
pub fn is_valid_binary(raw: &str) -> bool {
    check_binary(raw).is_ok()
}

/// Check if `raw` contains at least one `\uXXXX` or `\u{X}` escape
///
/// Empty input is accepted by the grammar itself; emptiness is rejected by
/// [`validate`] before the grammar is consulted.
pub fn is_valid_unicode_escape(raw: &str) -> bool {
    raw.is_empty() || contains_escape(raw)
}

fn check_hex(raw: &str) -> crate::Result<()> {
    let mut digits = 0usize;
    for ch in raw.chars().filter(|c| !c.is_whitespace()) {
        if !ch.is_ascii_hexdigit() {
            return Err(Error::MalformedHex(format!(
                "unexpected character '{}'",
                ch.escape_default()
            )));
        }
        digits += 1;
    }

    if digits % 2 != 0 {
        return Err(Error::MalformedHex(format!(
            "odd number of hex digits ({})",
            digits
        )));
    }
    Ok(())
}

fn check_binary(raw: &str) -> crate::Result<()> {
    let mut bits = 0usize;
    for ch in raw.chars().filter(|c| !c.is_whitespace()) {
        if ch != '0' && ch != '1' {
            return Err(Error::MalformedBinary(format!(
                "unexpected character '{}'",
                ch.escape_default()
            )));
        }
        bits += 1;
    }

    if bits % 8 != 0 {
        return Err(Error::MalformedBinary(format!(
            "{} bits do not form whole bytes",
            bits
        )));
    }
    Ok(())
}

fn check_unicode_escape(raw: &str) -> crate::Result<()> {
    if is_valid_unicode_escape(raw) {
        Ok(())
    } else {
        Err(Error::MalformedUnicodeEscape)
    }
}

fn contains_escape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] == b'\\' && bytes[i + 1] == b'u' {
            let rest = &bytes[i + 2..];
            if rest.len() >= 4 && rest[..4].iter().all(u8::is_ascii_hexdigit) {
                return true;
            }
            if rest.first() == Some(&b'{') {
                let digits = rest[1..]
                    .iter()
                    .take_while(|b| b.is_ascii_hexdigit())
                    .count();
                if digits > 0 && rest.get(1 + digits) == Some(&b'}') {
                    return true;
                }
            }
        }
        i += 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn kind_of(raw: &str, source: Encoding) -> Option<ErrorKind> {
        validate(raw, source).error.map(|e| e.kind())
    }

    #[test]
    fn test_hex_grammar() {
        assert!(is_valid_hex("48 65"));
        assert!(is_valid_hex("48656C6c6F"));
        assert!(is_valid_hex("d83d\tde00\n"));
        assert!(!is_valid_hex("4"));
        assert!(!is_valid_hex("zz"));
        assert!(!is_valid_hex("0x48"));
    }

    #[test]
    fn test_binary_grammar() {
        assert!(is_valid_binary("01001000 01100101"));
        assert!(is_valid_binary("0100100001100101"));
        assert!(!is_valid_binary("0100100"));
        assert!(!is_valid_binary("01001002"));
    }

    #[test]
    fn test_unicode_escape_grammar() {
        assert!(is_valid_unicode_escape("\\u0041"));
        assert!(is_valid_unicode_escape("say \\u{1F600}!"));
        assert!(is_valid_unicode_escape(""));
        assert!(!is_valid_unicode_escape("\\u004"));
        assert!(!is_valid_unicode_escape("\\u{}"));
        assert!(!is_valid_unicode_escape("\\u{12"));
        assert!(!is_valid_unicode_escape("plain text"));
    }

    #[test]
    fn test_empty_input() {
        for source in Encoding::ALL {
            assert_eq!(kind_of("", source), Some(ErrorKind::EmptyInput));
            assert_eq!(kind_of(" \t\n", source), Some(ErrorKind::EmptyInput));
        }
    }

    #[test]
    fn test_input_too_large() {
        let big = "a".repeat(MAX_INPUT_CHARS + 1);
        assert_eq!(kind_of(&big, Encoding::Utf8), Some(ErrorKind::InputTooLarge));

        let at_limit = "a".repeat(MAX_INPUT_CHARS);
        assert!(validate(&at_limit, Encoding::Utf8).ok);
    }

    #[test]
    fn test_multibyte_input_counts_chars() {
        // 3 bytes per char, but still within the character limit
        let wide = "日".repeat(MAX_INPUT_CHARS / 2);
        assert!(validate(&wide, Encoding::Utf8).ok);
    }

    #[test]
    fn test_format_errors() {
        assert_eq!(kind_of("4", Encoding::Hex), Some(ErrorKind::MalformedHex));
        assert_eq!(
            kind_of("0100100", Encoding::Binary),
            Some(ErrorKind::MalformedBinary)
        );
        assert_eq!(
            kind_of("hello", Encoding::UnicodeEscape),
            Some(ErrorKind::MalformedUnicodeEscape)
        );
    }

    #[test]
    fn test_text_formats_accept_anything() {
        for source in [
            Encoding::Utf8,
            Encoding::Utf16,
            Encoding::Ascii,
            Encoding::Iso8859_1,
        ] {
            let result = validate("zz \\u{ 日本", source);
            assert!(result.ok);
            assert!(result.into_result().is_ok());
        }
    }
}
