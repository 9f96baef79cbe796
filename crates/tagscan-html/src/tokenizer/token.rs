use std::ops::Range;

use serde::Serialize;
use strum_macros::{Display, EnumString};

/// Lexical category of a token.
///
/// The `snake_case` names used by `Display` and `FromStr` (`tag_start`,
/// `attribute_quoted_value_end`, ...) are a stable vocabulary shared with
/// anything that consumes token streams by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// No token yet; also marks an unset token reference.
    #[default]
    None,
    /// Character data between tags, or the body of a comment, CDATA section
    /// or raw-text element.
    Text,
    /// A run of spaces, tabs, carriage returns and line feeds inside a tag.
    Whitespace,
    /// `<!--`
    CommentStart,
    /// `-->`
    CommentEnd,
    /// The name of a tag, possibly split over several tokens.
    TagName,
    /// The `<` opening a tag.
    TagStart,
    /// The `>` closing a tag.
    TagEnd,
    /// An attribute name.
    AttributeName,
    /// The opening quote of a quoted attribute value.
    AttributeQuotedValueStart,
    /// Text inside a quoted attribute value.
    AttributeQuotedValue,
    /// The closing quote of a quoted attribute value.
    AttributeQuotedValueEnd,
    /// An attribute value without quotes.
    AttributeUnquotedValue,
    /// `<![CDATA[`
    CdataStart,
    /// `]]>`
    CdataEnd,
    /// `/`, either before a closing tag name or before `>`.
    Solidus,
    /// `=` between an attribute name and its value.
    Equal,
    /// Bytes the tokenizer could not classify; always the rest of the input.
    Malformed,
}

/// A token event emitted by the tokenizer.
///
/// Offsets are absolute: they include the base offset of the scan window, so
/// a parser scanning only the tail of a document still reports positions
/// relative to the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token {
    /// The lexical category.
    pub kind: TokenKind,
    /// Byte offset of the first byte.
    pub start: usize,
    /// Character offset of the first character.
    pub char_start: usize,
    /// Length in bytes.
    pub length: usize,
    /// Length in characters.
    pub char_length: usize,
}

impl Token {
    /// Byte offset one past the last byte.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.length
    }

    /// Character offset one past the last character.
    #[must_use]
    pub const fn char_end(&self) -> usize {
        self.char_start + self.char_length
    }

    /// Byte range covered by this token.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}
