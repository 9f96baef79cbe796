//! Byte-range references into the parser's document.

use std::ops::Range;

use crate::tokenizer::{Token, TokenKind};

/// A span of the document, remembered by position instead of by copy.
///
/// An unset reference has kind [`TokenKind::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenRef {
    /// Kind of the token(s) this span was built from.
    pub kind: TokenKind,
    /// Byte offset in the document.
    pub start: usize,
    /// Character offset in the document.
    pub char_start: usize,
    /// Length in bytes.
    pub length: usize,
    /// Line of the first byte, starting at 1.
    pub line_number: usize,
    /// Column of the first byte, starting at 0.
    pub column_number: usize,
}

impl TokenRef {
    /// Reference the bytes of `token`, which starts at the given line and column.
    #[must_use]
    pub const fn from_token(token: &Token, line_number: usize, column_number: usize) -> Self {
        Self {
            kind: token.kind,
            start: token.start,
            char_start: token.char_start,
            length: token.length,
            line_number,
            column_number,
        }
    }

    /// Whether the reference points anywhere.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        !matches!(self.kind, TokenKind::None)
    }

    /// Forget the span.
    pub const fn clear(&mut self) {
        self.kind = TokenKind::None;
    }

    /// Byte offset one past the end.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.length
    }

    /// The byte range, if set.
    #[must_use]
    pub const fn range(&self) -> Option<Range<usize>> {
        if self.is_set() {
            Some(self.start..self.end())
        } else {
            None
        }
    }

    /// Grow this span by `next` when it is the same kind and starts exactly
    /// where this one ends; otherwise start over from `next`.
    ///
    /// A value or comment arriving as many tokens thus ends up as one span.
    pub fn extend_or_replace(&mut self, next: &Self) {
        if self.is_set() && self.kind == next.kind && self.end() == next.start {
            self.length += next.length;
        } else {
            *self = *next;
        }
    }
}
