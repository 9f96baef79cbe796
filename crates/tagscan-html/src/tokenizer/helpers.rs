//! Helper types and predicates for the tokenizer.
//!
//! This module contains the byte-level machinery the recognizers are built on:
//! - The scan window (a private copy of the bytes being scanned, with cursors)
//! - Character classes for tag names, attribute names and values
//! - Lookahead ("the next few bytes are") and run-length scanning

use std::ops::Range;

use tagscan_common::TextEncoding;

// =============================================================================
// Character Classes
// =============================================================================

/// Space, tab, carriage return or line feed.
#[must_use]
pub const fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

/// ASCII letter or digit.
#[must_use]
pub const fn is_alnum(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
}

/// Byte allowed in an attribute name: alphanumerics and `:`, `-`, `_`, `.`.
#[must_use]
pub const fn is_attribute_name_byte(byte: u8) -> bool {
    is_alnum(byte) || matches!(byte, b':' | b'-' | b'_' | b'.')
}

/// Byte allowed in a tag name. Anything goes until whitespace, `/` or `>`.
#[must_use]
pub const fn is_tag_name_byte(byte: u8) -> bool {
    !is_whitespace(byte) && byte != b'/' && byte != b'>'
}

/// Byte allowed in an unquoted attribute value. `/` is allowed so that
/// unquoted URLs survive.
#[must_use]
pub const fn is_unquoted_value_byte(byte: u8) -> bool {
    !is_whitespace(byte) && byte != b'>'
}

/// Byte allowed in the name of a closing tag inside raw text.
#[must_use]
pub const fn is_rawtext_tag_name_byte(byte: u8) -> bool {
    is_alnum(byte) || byte == b':'
}

// =============================================================================
// Scan Window
// =============================================================================

/// A `<` found by [`ScanWindow::match_tag_start`] while scanning raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagStartMatch {
    /// Bytes covered by `<`, an optional `/` and the name.
    pub length: usize,
    /// Whether a `/` followed the `<`.
    pub is_closing: bool,
    /// Position of the name, relative to the cursor.
    pub name: Range<usize>,
}

/// The bytes currently being scanned.
///
/// The tokenizer copies the caller's bytes in, so the caller's buffer may be
/// dropped or grown while the window is alive. `base` and `char_base` place the
/// window inside a larger document; every position the window reports is
/// absolute.
#[derive(Debug, Clone)]
pub struct ScanWindow {
    bytes: Vec<u8>,
    cursor: usize,
    char_cursor: usize,
    base: usize,
    char_base: usize,
    encoding: TextEncoding,
}

impl ScanWindow {
    /// An empty UTF-8 window at offset zero.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(&[], TextEncoding::utf8(), 0, 0)
    }

    /// Copy `bytes` into a new window starting at the given absolute offsets.
    #[must_use]
    pub fn new(bytes: &[u8], encoding: TextEncoding, base: usize, char_base: usize) -> Self {
        Self {
            bytes: bytes.to_vec(),
            cursor: 0,
            char_cursor: 0,
            base,
            char_base,
            encoding,
        }
    }

    /// The encoding the window's bytes are in.
    #[must_use]
    pub const fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Absolute byte offset of the cursor.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.base + self.cursor
    }

    /// Absolute character offset of the cursor.
    #[must_use]
    pub const fn char_position(&self) -> usize {
        self.char_base + self.char_cursor
    }

    /// Whether the cursor has reached the end of the window.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.bytes.len()
    }

    /// Number of bytes left to scan.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.cursor)
    }

    /// The unscanned bytes.
    #[must_use]
    pub fn rest(&self) -> &[u8] {
        self.bytes.get(self.cursor..).unwrap_or_default()
    }

    /// The byte at the cursor.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.cursor).copied()
    }

    /// Whether the byte at the cursor is `byte`.
    #[must_use]
    pub fn at_byte(&self, byte: u8) -> bool {
        self.peek() == Some(byte)
    }

    /// Whether the byte at the cursor is a single or double quote.
    #[must_use]
    pub fn at_quote(&self) -> bool {
        matches!(self.peek(), Some(b'\'' | b'"'))
    }

    /// "If the next few bytes are..."
    #[must_use]
    pub fn starts_with(&self, literal: &[u8]) -> bool {
        self.rest().starts_with(literal)
    }

    /// Like [`starts_with`](Self::starts_with), ASCII case-insensitive.
    #[must_use]
    pub fn starts_with_ignore_ascii_case(&self, literal: &[u8]) -> bool {
        self.rest()
            .get(..literal.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(literal))
    }

    /// Length of the longest run at the cursor whose bytes satisfy `accept`.
    #[must_use]
    pub fn run_length(&self, accept: impl Fn(u8) -> bool) -> usize {
        self.rest().iter().take_while(|&&byte| accept(byte)).count()
    }

    /// Offset from the cursor of the first occurrence of `needle`.
    #[must_use]
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() {
            return Some(0);
        }
        self.rest()
            .windows(needle.len())
            .position(|window| window == needle)
    }

    /// Match `<`, an optional `/` and a run of name bytes at the cursor.
    ///
    /// The name may be empty, and the window may end anywhere after the `<`.
    #[must_use]
    pub fn match_tag_start(&self) -> Option<TagStartMatch> {
        let rest = self.rest();
        if rest.first() != Some(&b'<') {
            return None;
        }
        let is_closing = rest.get(1) == Some(&b'/');
        let name_start = if is_closing { 2 } else { 1 };
        let name_length = rest
            .get(name_start..)
            .unwrap_or_default()
            .iter()
            .take_while(|&&byte| is_rawtext_tag_name_byte(byte))
            .count();
        Some(TagStartMatch {
            length: name_start + name_length,
            is_closing,
            name: name_start..name_start + name_length,
        })
    }

    /// The `length` bytes at the cursor.
    #[must_use]
    pub fn slice(&self, length: usize) -> &[u8] {
        let end = (self.cursor + length).min(self.bytes.len());
        self.bytes.get(self.cursor..end).unwrap_or_default()
    }

    /// Number of characters in the `length` bytes at the cursor.
    #[must_use]
    pub fn char_count(&self, length: usize) -> usize {
        self.encoding.char_count(self.slice(length))
    }

    /// Move both cursors forward.
    pub fn advance(&mut self, length: usize, char_length: usize) {
        debug_assert!(length <= self.remaining(), "advanced past end of window");
        self.cursor = (self.cursor + length).min(self.bytes.len());
        self.char_cursor += char_length;
    }
}

impl Default for ScanWindow {
    fn default() -> Self {
        Self::empty()
    }
}
