//! Text encodings and character accounting.
//!
//! Scanning is byte oriented: delimiters such as `<`, `>` and `=` are matched
//! as single bytes. Positions handed to callers are character offsets, where a
//! character is one Unicode scalar value of the decoded text. [`TextEncoding`]
//! bridges the two for any ASCII-compatible encoding `encoding_rs` knows.

use std::borrow::Cow;
use std::fmt;

use encoding_rs::Encoding;

/// A character encoding for document bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding(&'static Encoding);

impl TextEncoding {
    /// UTF-8, the encoding of every `&str`.
    #[must_use]
    pub fn utf8() -> Self {
        Self(encoding_rs::UTF_8)
    }

    /// Wrap an `encoding_rs` encoding.
    #[must_use]
    pub const fn from_encoding(encoding: &'static Encoding) -> Self {
        Self(encoding)
    }

    /// Look up an encoding by its WHATWG label, e.g. `"latin1"` or `"Shift_JIS"`.
    #[must_use]
    pub fn for_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.trim().as_bytes()).map(Self)
    }

    /// Canonical name of the encoding, e.g. `UTF-8` or `windows-1252`.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.0.name()
    }

    /// The underlying `encoding_rs` encoding.
    #[must_use]
    pub const fn encoding(self) -> &'static Encoding {
        self.0
    }

    /// Whether ASCII bytes always stand for ASCII characters in this encoding.
    ///
    /// Byte-level scanning only works when this holds; UTF-16 and
    /// ISO-2022-JP are the notable exceptions.
    #[must_use]
    pub fn is_ascii_compatible(self) -> bool {
        self.0.is_ascii_compatible()
    }

    /// Number of characters encoded by `bytes`.
    ///
    /// Always equal to `self.decode(bytes).chars().count()`, so malformed
    /// sequences count once per replacement character.
    #[must_use]
    pub fn char_count(self, bytes: &[u8]) -> usize {
        if self.0 == encoding_rs::UTF_8
            && let Ok(text) = std::str::from_utf8(bytes)
        {
            text.chars().count()
        } else if self.0.is_single_byte() {
            bytes.len()
        } else {
            self.decode(bytes).chars().count()
        }
    }

    /// Whether `bytes` decode without replacement characters.
    ///
    /// A slice that ends in the middle of a multi-byte character is not well
    /// formed.
    #[must_use]
    pub fn is_well_formed(self, bytes: &[u8]) -> bool {
        if self.0 == encoding_rs::UTF_8 {
            std::str::from_utf8(bytes).is_ok()
        } else {
            self.0
                .decode_without_bom_handling_and_without_replacement(bytes)
                .is_some()
        }
    }

    /// Decode `bytes`, borrowing when they are already valid UTF-8.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Cow<'_, str> {
        self.0.decode_without_bom_handling(bytes).0
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::utf8()
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
