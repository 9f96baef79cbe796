//! The byte-level tokenizer.
//!
//! [`Tokenizer`] scans one window of bytes at a time and reports tokens with
//! byte and character offsets counted from the base the window was given. The context stack, the current
//! tag name and the last token survive between windows, so input can arrive
//! in arbitrary chunks. Input no recognizer accepts ends the window as a
//! single [`TokenKind::Malformed`] token.

use tagscan_common::TextEncoding;
use tagscan_common::warning::warn_once;

use super::context::{
    ContextStack, DEFAULT_MAX_CONTEXT_DEPTH, TokenizerContext, rawtext_context_for,
};
use super::helpers::{
    ScanWindow, is_attribute_name_byte, is_tag_name_byte, is_unquoted_value_byte, is_whitespace,
};
use super::token::{Token, TokenKind};

const COMMENT_START: &[u8] = b"<!--";
const COMMENT_END: &[u8] = b"-->";
const DOCTYPE: &[u8] = b"<!DOCTYPE";
const CDATA_START: &[u8] = b"<![CDATA[";
const CDATA_END: &[u8] = b"]]>";

/// Tokenizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Maximum number of contexts on the context stack, the HTML context
    /// included. A recognizer that would exceed it stops the scan and the
    /// rest of the input becomes a single malformed token.
    pub max_context_depth: usize,
}

impl TokenizerConfig {
    /// Set the context stack depth limit.
    #[must_use]
    pub const fn with_max_context_depth(mut self, depth: usize) -> Self {
        self.max_context_depth = depth;
        self
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            max_context_depth: DEFAULT_MAX_CONTEXT_DEPTH,
        }
    }
}

/// Incremental HTML tokenizer.
///
/// The tokenizer scans a window of bytes and reports each token through a
/// callback. Its context stack, current tag name and closing-tag flag survive
/// between windows, so a document can be fed in pieces: a tag split across two
/// windows continues where it left off.
///
/// The callback sees the tokenizer as it was when the token was recognized,
/// before the cursors move past it.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    contexts: ContextStack,
    scan: ScanWindow,
    /// Name of the tag being scanned, or of the last one; matched against
    /// closing tags in raw-text contexts.
    current_tag: Vec<u8>,
    is_closing_tag: bool,
    /// The quote that opened the current quoted attribute value.
    attribute_quote: Option<u8>,
    last_token: TokenKind,
    config: TokenizerConfig,
}

impl Tokenizer {
    /// Create a tokenizer in the HTML context with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TokenizerConfig::default())
    }

    /// Create a tokenizer in the HTML context.
    #[must_use]
    pub fn with_config(config: TokenizerConfig) -> Self {
        Self {
            contexts: ContextStack::new(config.max_context_depth),
            scan: ScanWindow::empty(),
            current_tag: Vec::new(),
            is_closing_tag: false,
            attribute_quote: None,
            last_token: TokenKind::None,
            config,
        }
    }

    /// Return to the HTML context and forget all scan state.
    pub fn reset(&mut self) {
        self.contexts.reset();
        self.scan = ScanWindow::empty();
        self.current_tag.clear();
        self.is_closing_tag = false;
        self.attribute_quote = None;
        self.last_token = TokenKind::None;
    }

    /// Point the tokenizer at a copy of `bytes`.
    ///
    /// `base` and `char_base` are the absolute byte and character offsets of
    /// `bytes[0]`; token positions are reported relative to them.
    pub fn set_scan_window(
        &mut self,
        bytes: &[u8],
        encoding: TextEncoding,
        base: usize,
        char_base: usize,
    ) {
        self.scan = ScanWindow::new(bytes, encoding, base, char_base);
    }

    /// Release the scan window. Contexts and tag state are kept.
    pub fn clear_scan_window(&mut self) {
        self.scan = ScanWindow::empty();
    }

    /// Tokenize `text` as the next piece of input.
    ///
    /// Positions in the reported tokens start at zero for every call, but the
    /// context carries over: calling this with `"<scr"` and then `"ipt>"`
    /// scans one tag.
    pub fn tokenize(&mut self, text: &str, mut on_token: impl FnMut(Token)) {
        self.set_scan_window(text.as_bytes(), TextEncoding::utf8(), 0, 0);
        self.scan_all(|_, token| on_token(token));
        self.clear_scan_window();
    }

    /// Scan the whole window.
    ///
    /// Recognizers run until the window is exhausted or none of them can make
    /// progress. In the latter case the rest of the window is reported as one
    /// [`TokenKind::Malformed`] token; scanning never fails.
    pub fn scan_all<F>(&mut self, mut on_token: F)
    where
        F: FnMut(&Self, Token),
    {
        while !self.scan.is_at_end() && self.scan_once(&mut on_token) {}

        if !self.scan.is_at_end() {
            warn_once(
                "Tokenizer",
                &format!("malformed input in {} context", self.contexts.current()),
                format_args!("byte {}", self.scan.position()),
            );
            let remaining = self.scan.remaining();
            self.emit(&mut on_token, TokenKind::Malformed, remaining);
        }
    }

    /// The active context.
    #[must_use]
    pub fn context(&self) -> TokenizerContext {
        self.contexts.current()
    }

    /// The whole context stack, bottom first.
    #[must_use]
    pub fn contexts(&self) -> &[TokenizerContext] {
        self.contexts.as_slice()
    }

    /// Whether the active context is RCDATA, RAWTEXT, script data or PLAINTEXT.
    #[must_use]
    pub fn in_rawtext(&self) -> bool {
        self.context().is_rawtext_family()
    }

    /// Bytes of the current (or most recent) tag name.
    #[must_use]
    pub fn current_tag_name(&self) -> &[u8] {
        &self.current_tag
    }

    /// Whether the current (or most recent) tag started with `</`.
    #[must_use]
    pub const fn is_closing_tag(&self) -> bool {
        self.is_closing_tag
    }

    /// The quote byte that opened the most recent quoted attribute value.
    #[must_use]
    pub const fn attribute_quote(&self) -> Option<u8> {
        self.attribute_quote
    }

    /// Kind of the last token emitted.
    #[must_use]
    pub const fn last_token(&self) -> TokenKind {
        self.last_token
    }

    /// The settings this tokenizer was built with.
    #[must_use]
    pub const fn config(&self) -> TokenizerConfig {
        self.config
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Context Transitions
// =============================================================================

impl Tokenizer {
    /// Check there is room to enter `context`, reporting when there is not.
    fn can_enter(&self, context: TokenizerContext) -> bool {
        if self.contexts.can_push() {
            return true;
        }
        warn_once(
            "Tokenizer",
            &format!(
                "context stack full ({} entries) entering {context}",
                self.contexts.max_depth()
            ),
            format_args!("byte {}", self.scan.position()),
        );
        false
    }

    /// Push `context`. Callers check [`Self::can_enter`] first.
    fn enter(&mut self, context: TokenizerContext) {
        #[cfg(feature = "scan-trace")]
        eprintln!(
            "[SCAN] enter {context} over {} at byte {}",
            self.contexts.current(),
            self.scan.position()
        );
        self.contexts.push(context);
    }

    /// Pop back to the enclosing context.
    fn leave(&mut self) {
        #[cfg(feature = "scan-trace")]
        let left = self.contexts.current();
        let _ = self.contexts.pop();
        #[cfg(feature = "scan-trace")]
        eprintln!(
            "[SCAN] leave {left} for {} at byte {}",
            self.contexts.current(),
            self.scan.position()
        );
    }

    /// Replace the active context.
    fn switch_to(&mut self, context: TokenizerContext) {
        #[cfg(feature = "scan-trace")]
        eprintln!(
            "[SCAN] switch {} -> {context} at byte {}",
            self.contexts.current(),
            self.scan.position()
        );
        self.contexts.replace_top(context);
    }
}

// =============================================================================
// Token Emission
// =============================================================================

impl Tokenizer {
    /// Report the next `length` bytes as a `kind` token, then move past them.
    fn emit<F>(&mut self, on_token: &mut F, kind: TokenKind, length: usize)
    where
        F: FnMut(&Self, Token),
    {
        let token = Token {
            kind,
            start: self.scan.position(),
            char_start: self.scan.char_position(),
            length,
            char_length: self.scan.char_count(length),
        };
        self.last_token = kind;
        on_token(self, token);
        self.scan.advance(token.length, token.char_length);
    }
}

// =============================================================================
// Recognizers
// =============================================================================

impl Tokenizer {
    /// Run the recognizer for the active context once.
    ///
    /// Returns false when nothing at the cursor can be recognized.
    fn scan_once<F>(&mut self, on_token: &mut F) -> bool
    where
        F: FnMut(&Self, Token),
    {
        match self.contexts.current() {
            TokenizerContext::Html => self.scan_html(on_token),
            TokenizerContext::OpenTag => self.scan_open_tag(on_token),
            TokenizerContext::SolidusOrTagName => self.scan_solidus_or_tag_name(on_token),
            TokenizerContext::TagName => self.scan_tag_name(on_token),
            TokenizerContext::AttributeName => self.scan_attribute_name(on_token),
            TokenizerContext::AttributeValue => self.scan_attribute_value(on_token),
            TokenizerContext::AttributeQuoted => self.scan_attribute_quoted(on_token),
            TokenizerContext::AttributeUnquoted => self.scan_attribute_unquoted(on_token),
            TokenizerContext::Comment => {
                self.scan_until_closer(on_token, COMMENT_END, TokenKind::CommentEnd)
            }
            TokenizerContext::Cdata => {
                self.scan_until_closer(on_token, CDATA_END, TokenKind::CdataEnd)
            }
            // Character references are not decoded, so these three behave alike.
            TokenizerContext::Rcdata
            | TokenizerContext::Rawtext
            | TokenizerContext::ScriptData => self.scan_rawtext(on_token),
            TokenizerContext::Plaintext => {
                let remaining = self.scan.remaining();
                self.emit(on_token, TokenKind::Text, remaining);
                true
            }
        }
    }

    fn scan_html<F>(&mut self, on_token: &mut F) -> bool
    where
        F: FnMut(&Self, Token),
    {
        if self.scan.at_byte(b'<') {
            if !self.can_enter(TokenizerContext::OpenTag) {
                return false;
            }
            self.enter(TokenizerContext::OpenTag);
            return true;
        }

        let length = self.scan.run_length(|byte| byte != b'<');
        if length == 0 {
            return false;
        }
        self.emit(on_token, TokenKind::Text, length);
        true
    }

    fn scan_open_tag<F>(&mut self, on_token: &mut F) -> bool
    where
        F: FnMut(&Self, Token),
    {
        if self.scan.starts_with(COMMENT_START) {
            self.emit(on_token, TokenKind::CommentStart, COMMENT_START.len());
            self.switch_to(TokenizerContext::Comment);
            return true;
        }

        if self.scan.starts_with_ignore_ascii_case(DOCTYPE) {
            if !self.can_enter(TokenizerContext::TagName) {
                return false;
            }
            self.emit(on_token, TokenKind::TagStart, 1);
            // "!DOCTYPE" is reported as the tag name, in the case it was written.
            let name_length = DOCTYPE.len() - 1;
            self.current_tag.clear();
            self.current_tag.extend_from_slice(self.scan.slice(name_length));
            self.is_closing_tag = false;
            self.emit(on_token, TokenKind::TagName, name_length);
            self.enter(TokenizerContext::TagName);
            return true;
        }

        if self.scan.starts_with_ignore_ascii_case(CDATA_START) {
            self.emit(on_token, TokenKind::CdataStart, CDATA_START.len());
            self.switch_to(TokenizerContext::Cdata);
            return true;
        }

        let Some(byte) = self.scan.peek() else {
            return false;
        };

        match byte {
            b'<' => {
                if !self.can_enter(TokenizerContext::SolidusOrTagName) {
                    return false;
                }
                self.emit(on_token, TokenKind::TagStart, 1);
                self.enter(TokenizerContext::SolidusOrTagName);
            }
            _ if is_whitespace(byte) => {
                let length = self.scan.run_length(is_whitespace);
                self.emit(on_token, TokenKind::Whitespace, length);
            }
            _ if is_attribute_name_byte(byte) => {
                if !self.can_enter(TokenizerContext::AttributeName) {
                    return false;
                }
                let length = self.scan.run_length(is_attribute_name_byte);
                self.emit(on_token, TokenKind::AttributeName, length);
                self.enter(TokenizerContext::AttributeName);
            }
            b'\'' | b'"' => {
                // The value context emits the quote itself.
                if !self.can_enter(TokenizerContext::AttributeValue) {
                    return false;
                }
                self.enter(TokenizerContext::AttributeValue);
            }
            b'=' => {
                if !self.can_enter(TokenizerContext::AttributeValue) {
                    return false;
                }
                self.emit(on_token, TokenKind::Equal, 1);
                self.enter(TokenizerContext::AttributeValue);
            }
            b'/' => self.emit(on_token, TokenKind::Solidus, 1),
            b'>' => {
                self.emit(on_token, TokenKind::TagEnd, 1);
                self.leave();
                if !self.is_closing_tag
                    && let Some(rawtext) = rawtext_context_for(&self.current_tag)
                {
                    self.enter(rawtext);
                }
            }
            _ => return false,
        }
        true
    }

    fn scan_solidus_or_tag_name<F>(&mut self, on_token: &mut F) -> bool
    where
        F: FnMut(&Self, Token),
    {
        self.current_tag.clear();
        if self.scan.at_byte(b'/') {
            self.is_closing_tag = true;
            self.emit(on_token, TokenKind::Solidus, 1);
        } else {
            self.is_closing_tag = false;
        }
        self.switch_to(TokenizerContext::TagName);
        true
    }

    fn scan_tag_name<F>(&mut self, on_token: &mut F) -> bool
    where
        F: FnMut(&Self, Token),
    {
        let length = self.scan.run_length(is_tag_name_byte);
        if length == 0 {
            self.leave();
            return true;
        }
        self.current_tag.extend_from_slice(self.scan.slice(length));
        self.emit(on_token, TokenKind::TagName, length);
        true
    }

    fn scan_attribute_name<F>(&mut self, on_token: &mut F) -> bool
    where
        F: FnMut(&Self, Token),
    {
        let length = self.scan.run_length(is_attribute_name_byte);
        if length == 0 {
            self.leave();
        } else {
            self.emit(on_token, TokenKind::AttributeName, length);
        }
        true
    }

    fn scan_attribute_value<F>(&mut self, on_token: &mut F) -> bool
    where
        F: FnMut(&Self, Token),
    {
        let whitespace = self.scan.run_length(is_whitespace);
        if whitespace > 0 {
            self.emit(on_token, TokenKind::Whitespace, whitespace);
        } else if self.scan.at_quote() {
            self.attribute_quote = self.scan.peek();
            self.emit(on_token, TokenKind::AttributeQuotedValueStart, 1);
            self.switch_to(TokenizerContext::AttributeQuoted);
        } else {
            self.switch_to(TokenizerContext::AttributeUnquoted);
        }
        true
    }

    fn scan_attribute_unquoted<F>(&mut self, on_token: &mut F) -> bool
    where
        F: FnMut(&Self, Token),
    {
        let length = self.scan.run_length(is_unquoted_value_byte);
        if length == 0 {
            self.leave();
        } else {
            self.emit(on_token, TokenKind::AttributeUnquotedValue, length);
        }
        true
    }

    fn scan_attribute_quoted<F>(&mut self, on_token: &mut F) -> bool
    where
        F: FnMut(&Self, Token),
    {
        let Some(quote) = self.attribute_quote else {
            return false;
        };

        if self.scan.at_byte(quote) {
            self.emit(on_token, TokenKind::AttributeQuotedValueEnd, 1);
            self.leave();
            return true;
        }

        let length = self.scan.run_length(|byte| byte != quote);
        if length == 0 {
            return false;
        }
        self.emit(on_token, TokenKind::AttributeQuotedValue, length);
        true
    }

    /// Comment and CDATA bodies: text up to `closer`, then the closer itself.
    fn scan_until_closer<F>(&mut self, on_token: &mut F, closer: &[u8], end: TokenKind) -> bool
    where
        F: FnMut(&Self, Token),
    {
        if let Some(offset) = self.scan.find(closer) {
            if offset > 0 {
                self.emit(on_token, TokenKind::Text, offset);
            }
            self.emit(on_token, end, closer.len());
            self.leave();
        } else {
            let remaining = self.scan.remaining();
            self.emit(on_token, TokenKind::Text, remaining);
        }
        true
    }

    /// RCDATA, RAWTEXT and script data: everything is text until the closing
    /// tag of the element that opened the context.
    fn scan_rawtext<F>(&mut self, on_token: &mut F) -> bool
    where
        F: FnMut(&Self, Token),
    {
        if let Some(tag) = self.scan.match_tag_start() {
            let name = self.scan.slice(tag.length).get(tag.name.clone());
            let closes_element = tag.is_closing
                && name.is_some_and(|name| name.eq_ignore_ascii_case(&self.current_tag));
            if closes_element {
                // Leave the `</name` for the HTML context to scan as a tag.
                self.leave();
            } else {
                self.emit(on_token, TokenKind::Text, tag.length);
            }
            return true;
        }

        let length = self.scan.run_length(|byte| byte != b'<');
        if length == 0 {
            return false;
        }
        self.emit(on_token, TokenKind::Text, length);
        true
    }
}
