//! Canonical intermediate form shared by the decoder and encoder.

use std::fmt;

/// An ordered sequence of Unicode scalar values
///
/// Backed by `char`, so a lone surrogate can never be stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScalarSequence(Vec<char>);

impl ScalarSequence {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sequence with room for `capacity` scalars
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Take the scalar values of already decoded text
    pub fn from_text(text: &str) -> Self {
        text.chars().collect()
    }

    /// Append one scalar
    pub fn push(&mut self, scalar: char) {
        self.0.push(scalar);
    }

    /// Number of scalar values
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the sequence holds no scalars
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the scalar values
    pub fn iter(&self) -> std::slice::Iter<'_, char> {
        self.0.iter()
    }

    /// View the scalars as a slice
    pub fn as_slice(&self) -> &[char] {
        &self.0
    }

    /// Encode the scalars as UTF-8 bytes
    pub fn to_utf8_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.0.len());
        let mut buf = [0u8; 4];
        for ch in &self.0 {
            bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
        bytes
    }

    /// Iterate over the UTF-16 code units of the scalars
    pub fn utf16_units(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.iter().flat_map(|ch| {
            let mut buf = [0u16; 2];
            let len = ch.encode_utf16(&mut buf).len();
            buf.into_iter().take(len)
        })
    }
}

impl FromIterator<char> for ScalarSequence {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ScalarSequence {
    type Item = &'a char;
    type IntoIter = std::slice::Iter<'a, char>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ScalarSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        for &ch in &self.0 {
            f.write_char(ch)?;
        }
        Ok(())
    }
}
