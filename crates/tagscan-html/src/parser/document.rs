//! The append-only document buffer.

use std::borrow::Cow;
use std::ops::Range;

use tagscan_common::TextEncoding;

use super::error::DocumentError;
use super::reference::TokenRef;

/// Every byte the parser has been given, with position bookkeeping.
///
/// Content is only ever appended. The encoding is fixed by the first
/// non-empty append.
#[derive(Debug, Clone)]
pub struct Document {
    data: Vec<u8>,
    encoding: Option<TextEncoding>,
    char_length: usize,
    line_number: usize,
    column_number: usize,
}

impl Document {
    /// An empty document at line 1, column 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            encoding: None,
            char_length: 0,
            line_number: 1,
            column_number: 0,
        }
    }

    /// The raw bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Length in characters.
    #[must_use]
    pub const fn char_length(&self) -> usize {
        self.char_length
    }

    /// The encoding, once the first chunk has been appended.
    #[must_use]
    pub const fn encoding(&self) -> Option<TextEncoding> {
        self.encoding
    }

    /// Line of the next unprocessed byte, starting at 1.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.line_number
    }

    /// Column of the next unprocessed byte, starting at 0.
    #[must_use]
    pub const fn column_number(&self) -> usize {
        self.column_number
    }

    /// The whole document as text.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        self.decode(&self.data)
    }

    /// The text of `reference`, or `None` if it is unset.
    #[must_use]
    pub fn text_of(&self, reference: &TokenRef) -> Option<Cow<'_, str>> {
        let range = reference.range()?;
        self.data.get(range).map(|bytes| self.decode(bytes))
    }

    fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        self.encoding.unwrap_or_default().decode(bytes)
    }

    /// Append `bytes`, fixing the document encoding if this is the first chunk.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnsupportedEncoding`] for encodings that are
    /// not ASCII compatible, [`DocumentError::EncodingMismatch`] when
    /// `encoding` differs from the document's, and
    /// [`DocumentError::MalformedChunk`] when `bytes` do not decode cleanly.
    /// Nothing is appended on error.
    pub fn append(&mut self, bytes: &[u8], encoding: TextEncoding) -> Result<(), DocumentError> {
        if !encoding.is_ascii_compatible() {
            return Err(DocumentError::UnsupportedEncoding {
                encoding: encoding.name(),
            });
        }
        if let Some(document) = self.encoding
            && document != encoding
        {
            return Err(DocumentError::EncodingMismatch {
                chunk: encoding.name(),
                document: document.name(),
            });
        }
        if !encoding.is_well_formed(bytes) {
            return Err(DocumentError::MalformedChunk {
                encoding: encoding.name(),
            });
        }

        self.encoding = Some(encoding);
        self.data.extend_from_slice(bytes);
        self.char_length += encoding.char_count(bytes);
        Ok(())
    }

    /// Move the line/column position over the bytes in `range`.
    ///
    /// Every `\n` starts a new line at column 0; the characters after the last
    /// one are added to the column.
    pub fn advance_position(&mut self, range: Range<usize>) {
        let encoding = self.encoding.unwrap_or_default();
        let mut segment = self.data.get(range).unwrap_or_default();
        while let Some(newline) = segment.iter().position(|&byte| byte == b'\n') {
            self.line_number += 1;
            self.column_number = 0;
            segment = segment.get(newline + 1..).unwrap_or_default();
        }
        let columns = encoding.char_count(segment);
        self.column_number += columns;
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
