use std::borrow::Cow;

use serde::Serialize;
use strum_macros::Display;
use tagscan_common::TextEncoding;

use super::document::Document;
use super::error::{DocumentError, ParseIssue};
use super::grammar::{Grammar, GrammarState};
use super::reference::TokenRef;
use crate::tokenizer::{TokenKind, Tokenizer, TokenizerConfig, TokenizerContext};

/// Parser settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserConfig {
    /// Settings for the owned tokenizer.
    pub tokenizer: TokenizerConfig,
    /// Also report every grammar error through the warning channel.
    pub report_errors: bool,
}

impl ParserConfig {
    /// Set the tokenizer settings.
    #[must_use]
    pub const fn with_tokenizer(mut self, tokenizer: TokenizerConfig) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Turn warning-channel error reporting on or off.
    #[must_use]
    pub const fn with_report_errors(mut self, report_errors: bool) -> Self {
        self.report_errors = report_errors;
        self
    }
}

/// Where the grammar is, as reported by [`Parser::context`].
///
/// The `snake_case` display names are the stable state vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ParserContext {
    /// Outside any tag.
    None,
    /// Outside any tag, inside the body of a raw-text element.
    Rawtext,
    /// After `<`, waiting for `/` or the tag name.
    SolidusOrTagName,
    /// Reading the tag name.
    TagName,
    /// Inside a tag, between attributes.
    Tag,
    /// Reading an attribute name.
    AttributeName,
    /// After an attribute name and whitespace.
    AfterAttributeName,
    /// After `=`, waiting for the value.
    AfterEqual,
    /// Inside a quoted attribute value.
    QuotedValue,
    /// After the closing quote of a value.
    SpaceAfterAttribute,
    /// Inside an unquoted attribute value.
    UnquotedValue,
    /// After `/` inside a tag.
    TagEnd,
    /// Inside a comment.
    Comment,
    /// Inside a CDATA section.
    Cdata,
}

impl ParserContext {
    fn resolve(state: GrammarState, in_rawtext: bool) -> Self {
        match state {
            GrammarState::None if in_rawtext => Self::Rawtext,
            GrammarState::None => Self::None,
            GrammarState::SolidusOrTagName => Self::SolidusOrTagName,
            GrammarState::TagName => Self::TagName,
            GrammarState::Tag => Self::Tag,
            GrammarState::AttributeName => Self::AttributeName,
            GrammarState::AttributeWhitespaceOrEqual => Self::AfterAttributeName,
            GrammarState::AttributeWhitespaceOrValue => Self::AfterEqual,
            GrammarState::AttributeQuotedValue => Self::QuotedValue,
            GrammarState::SpaceAfterAttribute => Self::SpaceAfterAttribute,
            GrammarState::AttributeUnquotedValue => Self::UnquotedValue,
            GrammarState::TagEnd => Self::TagEnd,
            GrammarState::Comment => Self::Comment,
            GrammarState::Cdata => Self::Cdata,
        }
    }
}

/// A piece of input and the encoding its bytes are in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    bytes: &'a [u8],
    encoding: TextEncoding,
}

impl<'a> Chunk<'a> {
    /// Wrap `bytes` encoded as `encoding`.
    #[must_use]
    pub const fn new(bytes: &'a [u8], encoding: TextEncoding) -> Self {
        Self { bytes, encoding }
    }

    /// The raw bytes.
    #[must_use]
    pub const fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The encoding of the bytes.
    #[must_use]
    pub const fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Whether there are no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl<'a> From<&'a str> for Chunk<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text.as_bytes(), TextEncoding::utf8())
    }
}

impl<'a> From<&'a String> for Chunk<'a> {
    fn from(text: &'a String) -> Self {
        Self::from(text.as_str())
    }
}

/// What the parser callback receives for each token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParsedToken {
    /// The lexical category.
    pub kind: TokenKind,
    /// Character offset of the first character in the document.
    pub char_start: usize,
    /// Character offset one past the last character.
    pub char_end: usize,
    /// Line where the token starts.
    pub line_number: usize,
    /// Column where the token starts.
    pub column_number: usize,
}

/// Read-only view of the parser state.
///
/// Handed to the [`Parser::parse_with`] callback after the grammar has
/// processed the token and before the position moves past it.
#[derive(Debug, Clone, Copy)]
pub struct ParserView<'a> {
    tokenizer: &'a Tokenizer,
    document: &'a Document,
    grammar: &'a Grammar,
}

impl<'a> ParserView<'a> {
    /// Everything appended so far, as text.
    #[must_use]
    pub fn document(&self) -> Cow<'a, str> {
        self.document.text()
    }

    /// Everything appended so far, as bytes.
    #[must_use]
    pub fn document_bytes(&self) -> &'a [u8] {
        self.document.bytes()
    }

    /// Document length in characters.
    #[must_use]
    pub const fn document_length(&self) -> usize {
        self.document.char_length()
    }

    /// The document encoding, once something has been appended.
    #[must_use]
    pub const fn encoding(&self) -> Option<TextEncoding> {
        self.document.encoding()
    }

    /// Current line, starting at 1.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.document.line_number()
    }

    /// Current column in characters, starting at 0.
    #[must_use]
    pub const fn column_number(&self) -> usize {
        self.document.column_number()
    }

    /// The grammar state.
    #[must_use]
    pub fn context(&self) -> ParserContext {
        ParserContext::resolve(self.grammar.state, self.tokenizer.in_rawtext())
    }

    /// The tokenizer's active context.
    #[must_use]
    pub fn tokenizer_context(&self) -> TokenizerContext {
        self.tokenizer.context()
    }

    /// The current (or most recent) tag name.
    #[must_use]
    pub fn tag_name(&self) -> Option<Cow<'a, str>> {
        self.document.text_of(&self.grammar.tag.name)
    }

    /// Whether the current (or most recent) tag is a closing tag.
    #[must_use]
    pub const fn is_closing_tag(&self) -> bool {
        self.tokenizer.is_closing_tag()
    }

    /// Whether the most recent tag ended with `/>`.
    #[must_use]
    pub const fn is_self_closing_tag(&self) -> bool {
        self.grammar.tag.self_closing
    }

    /// The current (or most recent) attribute name.
    #[must_use]
    pub fn attribute_name(&self) -> Option<Cow<'a, str>> {
        self.document.text_of(&self.grammar.attribute.name)
    }

    /// The current (or most recent) attribute value, without quotes.
    #[must_use]
    pub fn attribute_value(&self) -> Option<Cow<'a, str>> {
        self.document.text_of(&self.grammar.attribute.value)
    }

    /// Whether the current attribute value is quoted.
    #[must_use]
    pub const fn is_attribute_quoted(&self) -> bool {
        self.grammar.attribute.is_quoted
    }

    /// The quote around the current attribute value, if it is quoted.
    #[must_use]
    pub fn quote_character(&self) -> Option<char> {
        if !self.grammar.attribute.is_quoted {
            return None;
        }
        self.tokenizer.attribute_quote().map(char::from)
    }

    /// Body of the current (or most recent) comment.
    #[must_use]
    pub fn comment_text(&self) -> Option<Cow<'a, str>> {
        self.document.text_of(&self.grammar.comment)
    }

    /// Body of the current (or most recent) CDATA section.
    #[must_use]
    pub fn cdata_text(&self) -> Option<Cow<'a, str>> {
        self.document.text_of(&self.grammar.cdata)
    }

    /// Body text of the current (or most recent) raw-text element.
    #[must_use]
    pub fn rawtext_text(&self) -> Option<Cow<'a, str>> {
        self.document.text_of(&self.grammar.rawtext)
    }

    /// Number of grammar errors so far.
    #[must_use]
    pub fn errors_count(&self) -> usize {
        self.grammar.errors.len()
    }

    /// Grammar errors in the order they occurred.
    #[must_use]
    pub fn errors(&self) -> &'a [ParseIssue] {
        &self.grammar.errors
    }
}

/// Incremental HTML grammar scanner.
///
/// Input is fed in chunks with [`Parser::parse`]. After each token the
/// parser knows which part of the grammar it is in and the text of the
/// current tag name, attribute, comment, CDATA section or raw-text body.
/// It does not build a tree.
///
/// ```
/// use tagscan_html::{Parser, ParserContext};
///
/// let mut parser = Parser::new();
/// assert!(parser.parse("<a href='x").unwrap());
/// assert_eq!(parser.context(), ParserContext::QuotedValue);
/// assert!(parser.parse("'>").unwrap());
/// assert_eq!(parser.attribute_value().as_deref(), Some("x"));
/// assert_eq!(parser.context(), ParserContext::None);
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    tokenizer: Tokenizer,
    document: Document,
    grammar: Grammar,
}

impl Parser {
    /// Create a parser with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Create a parser.
    #[must_use]
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            tokenizer: Tokenizer::with_config(config.tokenizer),
            document: Document::new(),
            grammar: Grammar::new(config.report_errors),
        }
    }

    /// Append `chunk` to the document and scan it.
    ///
    /// Returns `Ok(false)` without doing anything when the chunk is empty.
    ///
    /// # Errors
    ///
    /// Fails when the chunk's encoding cannot be appended to the document;
    /// see [`Document::append`].
    ///
    /// # Panics
    ///
    /// Panics if the tokenizer emits a token the grammar holds to be
    /// impossible in its current state.
    pub fn parse<'c>(&mut self, chunk: impl Into<Chunk<'c>>) -> Result<bool, DocumentError> {
        self.parse_with(chunk, |_, _| {})
    }

    /// Like [`Parser::parse`], calling `on_token` after the grammar has
    /// processed each token.
    ///
    /// # Errors
    ///
    /// Fails when the chunk's encoding cannot be appended to the document;
    /// see [`Document::append`].
    ///
    /// # Panics
    ///
    /// Panics if the tokenizer emits a token the grammar holds to be
    /// impossible in its current state.
    pub fn parse_with<'c, F>(
        &mut self,
        chunk: impl Into<Chunk<'c>>,
        mut on_token: F,
    ) -> Result<bool, DocumentError>
    where
        F: FnMut(&ParserView<'_>, &ParsedToken),
    {
        let chunk = chunk.into();
        if chunk.is_empty() {
            return Ok(false);
        }

        let Self {
            tokenizer,
            document,
            grammar,
        } = self;

        let base = document.len();
        let char_base = document.char_length();
        document.append(chunk.bytes(), chunk.encoding())?;

        tokenizer.set_scan_window(chunk.bytes(), chunk.encoding(), base, char_base);
        tokenizer.scan_all(|tokenizer, token| {
            let line_number = document.line_number();
            let column_number = document.column_number();
            let reference = TokenRef::from_token(&token, line_number, column_number);
            grammar.handle(&reference, tokenizer.in_rawtext());

            let parsed = ParsedToken {
                kind: token.kind,
                char_start: token.char_start,
                char_end: token.char_end(),
                line_number,
                column_number,
            };
            let view = ParserView {
                tokenizer,
                document: &*document,
                grammar: &*grammar,
            };
            on_token(&view, &parsed);

            document.advance_position(token.range());
        });
        tokenizer.clear_scan_window();
        Ok(true)
    }

    /// Append `chunk` to the document without scanning it.
    ///
    /// The line and column move past the chunk; the grammar and tokenizer do
    /// not notice it. Used to splice in template code the HTML grammar should
    /// not see.
    ///
    /// # Errors
    ///
    /// Fails when the chunk's encoding cannot be appended to the document;
    /// see [`Document::append`].
    pub fn append_placeholder<'c>(
        &mut self,
        chunk: impl Into<Chunk<'c>>,
    ) -> Result<bool, DocumentError> {
        let chunk = chunk.into();
        if chunk.is_empty() {
            return Ok(false);
        }
        let start = self.document.len();
        self.document.append(chunk.bytes(), chunk.encoding())?;
        let end = self.document.len();
        self.document.advance_position(start..end);
        Ok(true)
    }

    /// A read-only view of the current state.
    #[must_use]
    pub const fn view(&self) -> ParserView<'_> {
        ParserView {
            tokenizer: &self.tokenizer,
            document: &self.document,
            grammar: &self.grammar,
        }
    }

    /// The owned tokenizer.
    #[must_use]
    pub const fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// The document buffer.
    #[must_use]
    pub const fn document_buffer(&self) -> &Document {
        &self.document
    }

    /// See [`ParserView::document`].
    #[must_use]
    pub fn document(&self) -> Cow<'_, str> {
        self.view().document()
    }

    /// See [`ParserView::document_length`].
    #[must_use]
    pub const fn document_length(&self) -> usize {
        self.document.char_length()
    }

    /// See [`ParserView::line_number`].
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.document.line_number()
    }

    /// See [`ParserView::column_number`].
    #[must_use]
    pub const fn column_number(&self) -> usize {
        self.document.column_number()
    }

    /// See [`ParserView::context`].
    #[must_use]
    pub fn context(&self) -> ParserContext {
        self.view().context()
    }

    /// See [`ParserView::tag_name`].
    #[must_use]
    pub fn tag_name(&self) -> Option<Cow<'_, str>> {
        self.view().tag_name()
    }

    /// See [`ParserView::is_closing_tag`].
    #[must_use]
    pub const fn is_closing_tag(&self) -> bool {
        self.tokenizer.is_closing_tag()
    }

    /// See [`ParserView::is_self_closing_tag`].
    #[must_use]
    pub const fn is_self_closing_tag(&self) -> bool {
        self.grammar.tag.self_closing
    }

    /// See [`ParserView::attribute_name`].
    #[must_use]
    pub fn attribute_name(&self) -> Option<Cow<'_, str>> {
        self.view().attribute_name()
    }

    /// See [`ParserView::attribute_value`].
    #[must_use]
    pub fn attribute_value(&self) -> Option<Cow<'_, str>> {
        self.view().attribute_value()
    }

    /// See [`ParserView::is_attribute_quoted`].
    #[must_use]
    pub const fn is_attribute_quoted(&self) -> bool {
        self.grammar.attribute.is_quoted
    }

    /// See [`ParserView::quote_character`].
    #[must_use]
    pub fn quote_character(&self) -> Option<char> {
        self.view().quote_character()
    }

    /// See [`ParserView::comment_text`].
    #[must_use]
    pub fn comment_text(&self) -> Option<Cow<'_, str>> {
        self.view().comment_text()
    }

    /// See [`ParserView::cdata_text`].
    #[must_use]
    pub fn cdata_text(&self) -> Option<Cow<'_, str>> {
        self.view().cdata_text()
    }

    /// See [`ParserView::rawtext_text`].
    #[must_use]
    pub fn rawtext_text(&self) -> Option<Cow<'_, str>> {
        self.view().rawtext_text()
    }

    /// See [`ParserView::errors_count`].
    #[must_use]
    pub fn errors_count(&self) -> usize {
        self.grammar.errors.len()
    }

    /// See [`ParserView::errors`].
    #[must_use]
    pub fn errors(&self) -> &[ParseIssue] {
        &self.grammar.errors
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
