//! Rendering of a scalar sequence into a target representation
//!
//! ASCII and ISO-8859-1 targets are lossy and substitute `?` for anything
//! they cannot hold. Hex and UTF-16 targets split astral scalars into a
//! surrogate pair so their output decodes back to the same text.

use tracing::trace;

use crate::{Encoding, Result, ScalarSequence};

/// Character substituted by lossy targets
pub const REPLACEMENT: char = '?';

/// Split a scalar above `0xFFFF` into its high and low surrogates
pub fn split_surrogates(scalar: u32) -> (u16, u16) {
    let offset = scalar - 0x10000;
    let high = (offset / 0x400) as u16 + 0xD800;
    let low = (offset % 0x400) as u16 + 0xDC00;
    (high, low)
}

/// Render `scalars` in the `target` representation
pub fn encode(scalars: &ScalarSequence, target: Encoding) -> Result<String> {
    let output = match target {
        Encoding::Utf8 => scalars.to_string(),
        Encoding::Ascii => encode_lossy(scalars, 0x7F),
        Encoding::Iso8859_1 => encode_lossy(scalars, 0xFF),
        Encoding::Hex => encode_hex(scalars),
        Encoding::Binary => encode_binary(scalars),
        Encoding::UnicodeEscape => encode_unicode_escape(scalars),
        Encoding::Utf16 => encode_utf16(scalars),
    };

    trace!(%target, bytes = output.len(), "rendered output");
    Ok(output)
}

fn encode_lossy(scalars: &ScalarSequence, max: u32) -> String {
    scalars
        .iter()
        .map(|&ch| if u32::from(ch) <= max { ch } else { REPLACEMENT })
        .collect()
}

fn encode_hex(scalars: &ScalarSequence) -> String {
    let mut groups = Vec::with_capacity(scalars.len());

    for &ch in scalars {
        let scalar = u32::from(ch);
        if scalar > 0xFFFF {
            let (high, low) = split_surrogates(scalar);
            groups.push(format!("{:04x}", high));
            groups.push(format!("{:04x}", low));
        } else if scalar > 0xFF {
            groups.push(format!("{:04x}", scalar));
        } else {
            groups.push(format!("{:02x}", scalar));
        }
    }

    groups.join(" ")
}

fn encode_binary(scalars: &ScalarSequence) -> String {
    scalars
        .to_utf8_bytes()
        .iter()
        .map(|b| format!("{:08b}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn encode_unicode_escape(scalars: &ScalarSequence) -> String {
    let mut output = String::with_capacity(scalars.len() * 6);

    for &ch in scalars {
        let scalar = u32::from(ch);
        if scalar <= 0x7F {
            output.push(ch);
        } else if scalar <= 0xFFFF {
            output.push_str(&format!("\\u{:04X}", scalar));
        } else {
            output.push_str(&format!("\\u{{{:X}}}", scalar));
        }
    }

    output
}

fn encode_utf16(scalars: &ScalarSequence) -> String {
    scalars
        .utf16_units()
        .map(|unit| format!("\\u{:04X}", unit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(text: &str, target: Encoding) -> String {
        encode(&ScalarSequence::from_text(text), target).unwrap()
    }

    #[test]
    fn test_utf8_identity() {
        assert_eq!(render("héllo 😀", Encoding::Utf8), "héllo 😀");
    }

    #[test]
    fn test_lossy_ascii() {
        assert_eq!(render("héllo", Encoding::Ascii), "h?llo");
        assert_eq!(render("\u{7F}\u{80}", Encoding::Ascii), "\u{7F}?");
    }

    #[test]
    fn test_lossy_latin1() {
        assert_eq!(render("日本語", Encoding::Iso8859_1), "???");
        assert_eq!(render("café", Encoding::Iso8859_1), "café");
        assert_eq!(render("😀", Encoding::Iso8859_1), "?");
    }

    #[test]
    fn test_hex() {
        assert_eq!(render("Hello", Encoding::Hex), "48 65 6c 6c 6f");
        assert_eq!(render("é日", Encoding::Hex), "e9 65e5");
        assert_eq!(render("\u{0100}", Encoding::Hex), "0100");
    }

    #[test]
    fn test_hex_surrogate_pair() {
        assert_eq!(render("A😀", Encoding::Hex), "41 d83d de00");
    }

    #[test]
    fn test_split_surrogates() {
        assert_eq!(split_surrogates(0x1F600), (0xD83D, 0xDE00));
        assert_eq!(split_surrogates(0x10000), (0xD800, 0xDC00));
        assert_eq!(split_surrogates(0x10FFFF), (0xDBFF, 0xDFFF));
    }

    #[test]
    fn test_binary() {
        assert_eq!(render("He", Encoding::Binary), "01001000 01100101");
        assert_eq!(render("é", Encoding::Binary), "11000011 10101001");
    }

    #[test]
    fn test_unicode_escape() {
        assert_eq!(render("Aé日", Encoding::UnicodeEscape), "A\\u00E9\\u65E5");
        assert_eq!(render("😀", Encoding::UnicodeEscape), "\\u{1F600}");
    }

    #[test]
    fn test_utf16_escapes() {
        assert_eq!(render("A", Encoding::Utf16), "\\u0041");
        assert_eq!(render("日", Encoding::Utf16), "\\u65E5");
        assert_eq!(render("😀", Encoding::Utf16), "\\uD83D\\uDE00");
    }

    #[test]
    fn test_empty_sequence() {
        for target in Encoding::ALL {
            assert_eq!(encode(&ScalarSequence::new(), target).unwrap(), "");
        }
    }
}
