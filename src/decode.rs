//! Decoding of raw input into the canonical scalar sequence
//!
//! Each source format works at its own granularity: hex groups and `\uXXXX`
//! escapes are UTF-16 code units, binary groups are UTF-8 bytes, and
//! `\u{X}` escapes are whole scalar values. Everything is normalized to a
//! [`ScalarSequence`] here, so surrogate pairs never leak past this module.

use tracing::trace;

use crate::{Encoding, Error, Result, ScalarSequence};

const HIGH_SURROGATES: std::ops::RangeInclusive<u16> = 0xD800..=0xDBFF;
const LOW_SURROGATES: std::ops::RangeInclusive<u16> = 0xDC00..=0xDFFF;

/// Decode `raw` written in `source` into scalar values
///
/// Expects input that already passed [`crate::validate`]; malformed groups
/// are still reported as errors rather than panicking.
pub fn decode(raw: &str, source: Encoding) -> Result<ScalarSequence> {
    match source {
        Encoding::Utf8 | Encoding::Utf16 | Encoding::Ascii | Encoding::Iso8859_1 => {
            Ok(ScalarSequence::from_text(raw))
        }
        Encoding::Hex => decode_hex(raw),
        Encoding::Binary => decode_binary(raw),
        Encoding::UnicodeEscape => decode_unicode_escape(raw),
    }
}

/// Combine a high and low surrogate into the scalar they encode
pub fn combine_surrogates(high: u16, low: u16) -> u32 {
    (u32::from(high) - 0xD800) * 0x400 + (u32::from(low) - 0xDC00) + 0x10000
}

/// Resolve `unit` (and its successor, for a high surrogate) into a scalar
///
/// Returns the scalar and the number of units consumed.
fn scalar_from_units(unit: u16, next: Option<u16>, position: usize) -> Result<(char, usize)> {
    if HIGH_SURROGATES.contains(&unit) {
        return match next {
            Some(low) if LOW_SURROGATES.contains(&low) => {
                let value = combine_surrogates(unit, low);
                char::from_u32(value)
                    .map(|ch| (ch, 2))
                    .ok_or(Error::InvalidScalar { value, position })
            }
            _ => Err(Error::UnpairedSurrogate { unit, position }),
        };
    }

    if LOW_SURROGATES.contains(&unit) {
        return Err(Error::UnpairedSurrogate { unit, position });
    }

    let value = u32::from(unit);
    char::from_u32(value)
        .map(|ch| (ch, 1))
        .ok_or(Error::InvalidScalar { value, position })
}

/// Split hex input into the groups the encoder emits
///
/// A whitespace separated token of exactly 2 or 4 digits is one code unit.
/// Any other token is an unseparated or broken-up run of digits: it is
/// joined with the tokens that follow until the run has an even length,
/// and the run is then read two digits at a time. Spacing therefore never
/// splits a byte: `"4 8"` and `"48"` are the same group.
fn hex_groups(raw: &str) -> Result<Vec<String>> {
    let mut groups = Vec::new();
    let mut run = String::new();

    for token in raw.split_whitespace() {
        let unit_sized = token.len() == 2 || token.len() == 4;
        if unit_sized && run.len() % 2 == 0 {
            flush_run(&mut run, &mut groups)?;
            groups.push(token.to_string());
        } else {
            run.push_str(token);
        }
    }

    flush_run(&mut run, &mut groups)?;
    Ok(groups)
}

fn flush_run(run: &mut String, groups: &mut Vec<String>) -> Result<()> {
    if run.is_empty() {
        return Ok(());
    }

    if !run.is_ascii() || run.len() % 2 != 0 {
        return Err(Error::InvalidCodeUnit {
            group: std::mem::take(run),
            position: groups.len(),
        });
    }

    // ASCII only, so every index is a char boundary
    groups.extend((0..run.len()).step_by(2).map(|i| run[i..i + 2].to_string()));
    run.clear();
    Ok(())
}

fn decode_hex(raw: &str) -> Result<ScalarSequence> {
    let groups = hex_groups(raw)?;

    let units = groups
        .iter()
        .enumerate()
        .map(|(position, group)| parse_hex_unit(group, position))
        .collect::<Result<Vec<u16>>>()?;

    trace!(groups = units.len(), "parsed hex code units");

    let mut scalars = ScalarSequence::with_capacity(units.len());
    let mut i = 0;
    while i < units.len() {
        let (ch, consumed) = scalar_from_units(units[i], units.get(i + 1).copied(), i)?;
        scalars.push(ch);
        i += consumed;
    }

    Ok(scalars)
}

fn parse_hex_unit(group: &str, position: usize) -> Result<u16> {
    let invalid = || Error::InvalidCodeUnit {
        group: group.to_string(),
        position,
    };

    // from_str_radix tolerates a leading sign, the hex grammar does not
    if group.is_empty() || !group.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    u16::from_str_radix(group, 16).map_err(|_| invalid())
}

fn decode_binary(raw: &str) -> Result<ScalarSequence> {
    let bits: Vec<char> = raw.chars().filter(|c| !c.is_whitespace()).collect();

    let mut bytes = Vec::with_capacity(bits.len() / 8);
    for (position, chunk) in bits.chunks(8).enumerate() {
        let byte = parse_bit_group(chunk).ok_or_else(|| Error::InvalidCodeUnit {
            group: chunk.iter().collect(),
            position,
        })?;
        bytes.push(byte);
    }

    trace!(bytes = bytes.len(), "parsed binary groups");

    let text = std::str::from_utf8(&bytes).map_err(|e| Error::InvalidUtf8 {
        position: e.valid_up_to(),
    })?;

    Ok(ScalarSequence::from_text(text))
}

fn parse_bit_group(bits: &[char]) -> Option<u8> {
    if bits.len() != 8 {
        return None;
    }

    bits.iter().try_fold(0u8, |acc, &bit| match bit {
        '0' => Some(acc << 1),
        '1' => Some((acc << 1) | 1),
        _ => None,
    })
}

/// One escape found at the start of the remaining input
#[derive(Clone, Copy)]
enum Escape<'a> {
    /// `\uXXXX`: one UTF-16 code unit
    Unit(&'a str),
    /// `\u{X+}`: one scalar value
    Scalar(&'a str),
}

impl Escape<'_> {
    fn digits(&self) -> &str {
        match self {
            Escape::Unit(digits) | Escape::Scalar(digits) => digits,
        }
    }
}

/// Match an escape at the start of `s`, returning it and its byte length
fn leading_escape(s: &str) -> Option<(Escape<'_>, usize)> {
    let rest = s.strip_prefix("\\u")?;
    let bytes = rest.as_bytes();

    if bytes.len() >= 4 && bytes[..4].iter().all(u8::is_ascii_hexdigit) {
        return Some((Escape::Unit(&rest[..4]), 6));
    }

    let inner = rest.strip_prefix('{')?;
    let digits = inner.bytes().take_while(u8::is_ascii_hexdigit).count();
    if digits > 0 && inner[digits..].starts_with('}') {
        return Some((Escape::Scalar(&inner[..digits]), digits + 4));
    }

    None
}

fn decode_unicode_escape(raw: &str) -> Result<ScalarSequence> {
    let mut scalars = ScalarSequence::with_capacity(raw.len());
    let mut rest = raw;
    let mut position = 0usize;

    while let Some(ch) = rest.chars().next() {
        let Some((escape, len)) = leading_escape(rest) else {
            scalars.push(ch);
            rest = &rest[ch.len_utf8()..];
            continue;
        };

        let invalid = || Error::InvalidCodeUnit {
            group: escape.digits().to_string(),
            position,
        };

        match escape {
            Escape::Unit(digits) => {
                let unit = u16::from_str_radix(digits, 16).map_err(|_| invalid())?;

                // A high surrogate only pairs with an immediately following \uXXXX
                let next = match leading_escape(&rest[len..]) {
                    Some((Escape::Unit(next_digits), next_len)) => {
                        u16::from_str_radix(next_digits, 16)
                            .ok()
                            .map(|unit| (unit, next_len))
                    }
                    _ => None,
                };

                let (scalar, consumed) =
                    scalar_from_units(unit, next.map(|(unit, _)| unit), position)?;
                scalars.push(scalar);

                let mut advance = len;
                if consumed == 2 {
                    advance += next.map_or(0, |(_, next_len)| next_len);
                }
                rest = &rest[advance..];
                position += consumed;
            }
            Escape::Scalar(digits) => {
                let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
                let scalar =
                    char::from_u32(value).ok_or(Error::InvalidScalar { value, position })?;
                scalars.push(scalar);
                rest = &rest[len..];
                position += 1;
            }
        }
    }

    trace!(scalars = scalars.len(), escapes = position, "decoded escapes");

    Ok(scalars)
}
