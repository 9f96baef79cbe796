//! Tokenizer contexts and the bounded context stack.

use strum_macros::Display;

/// Default limit for [`ContextStack`] depth.
pub const DEFAULT_MAX_CONTEXT_DEPTH: usize = 1000;

/// Elements whose content is RCDATA.
pub const RCDATA_ELEMENTS: &[&str] = &["title", "textarea"];

/// Elements whose content is RAWTEXT.
pub const RAWTEXT_ELEMENTS: &[&str] = &["style", "xmp", "iframe", "noembed", "noframes", "listing"];

/// Elements whose content is script data.
pub const SCRIPT_DATA_ELEMENTS: &[&str] = &["script"];

/// Elements whose content is plain text up to the end of input.
pub const PLAINTEXT_ELEMENTS: &[&str] = &["plaintext"];

/// The lexical mode the tokenizer is scanning in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenizerContext {
    /// Character data between tags.
    Html,
    /// Inside `<...>`, between the tag name and the closing `>`.
    OpenTag,
    /// Right after `<`, deciding between `/` and a tag name.
    SolidusOrTagName,
    /// Scanning a tag name.
    TagName,
    /// Scanning an attribute name.
    AttributeName,
    /// After `=` or at an opening quote, before the value.
    AttributeValue,
    /// Inside a quoted attribute value.
    AttributeQuoted,
    /// Inside an unquoted attribute value.
    AttributeUnquoted,
    /// Inside `<!-- ... -->`.
    Comment,
    /// Inside `<![CDATA[ ... ]]>`.
    Cdata,
    /// Content of `title` and `textarea`.
    Rcdata,
    /// Content of `style`, `xmp`, `iframe`, `noembed`, `noframes` and `listing`.
    Rawtext,
    /// Content of `script`.
    ScriptData,
    /// Content of `plaintext`, which runs to the end of input.
    Plaintext,
}

impl TokenizerContext {
    /// Whether this is one of the contexts entered after a raw-text element's
    /// start tag.
    #[must_use]
    pub const fn is_rawtext_family(self) -> bool {
        matches!(
            self,
            Self::Rcdata | Self::Rawtext | Self::ScriptData | Self::Plaintext
        )
    }
}

/// The raw-text context that follows a start tag named `tag_name`, if any.
///
/// Matching is ASCII case-insensitive.
#[must_use]
pub fn rawtext_context_for(tag_name: &[u8]) -> Option<TokenizerContext> {
    let listed = |table: &[&str]| {
        table
            .iter()
            .any(|name| name.as_bytes().eq_ignore_ascii_case(tag_name))
    };

    if listed(RCDATA_ELEMENTS) {
        Some(TokenizerContext::Rcdata)
    } else if listed(RAWTEXT_ELEMENTS) {
        Some(TokenizerContext::Rawtext)
    } else if listed(SCRIPT_DATA_ELEMENTS) {
        Some(TokenizerContext::ScriptData)
    } else if listed(PLAINTEXT_ELEMENTS) {
        Some(TokenizerContext::Plaintext)
    } else {
        None
    }
}

/// Stack of tokenizer contexts with a depth limit.
///
/// The bottom entry is always [`TokenizerContext::Html`] and is never popped
/// or replaced, so the stack is never empty.
#[derive(Debug, Clone)]
pub struct ContextStack {
    stack: Vec<TokenizerContext>,
    max_depth: usize,
}

impl ContextStack {
    /// Create a stack holding only the HTML context.
    ///
    /// `max_depth` counts the HTML context; values below 1 are treated as 1.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            stack: vec![TokenizerContext::Html],
            max_depth: max_depth.max(1),
        }
    }

    /// The active context.
    #[must_use]
    pub fn current(&self) -> TokenizerContext {
        self.stack.last().copied().unwrap_or(TokenizerContext::Html)
    }

    /// Number of contexts on the stack, including the HTML context.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The configured depth limit.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether one more context fits.
    #[must_use]
    pub fn can_push(&self) -> bool {
        self.stack.len() < self.max_depth
    }

    /// All contexts, bottom first.
    #[must_use]
    pub fn as_slice(&self) -> &[TokenizerContext] {
        &self.stack
    }

    /// Push `context`. Callers check [`can_push`](Self::can_push) first.
    pub fn push(&mut self, context: TokenizerContext) {
        debug_assert!(self.can_push(), "context stack overflow");
        self.stack.push(context);
    }

    /// Pop the active context, leaving the HTML context in place.
    pub fn pop(&mut self) -> Option<TokenizerContext> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    /// Replace the active context without changing the depth.
    pub fn replace_top(&mut self, context: TokenizerContext) {
        match self.stack.as_mut_slice() {
            [_, .., top] => *top = context,
            _ => self.stack.push(context),
        }
    }

    /// Drop everything above the HTML context.
    pub fn reset(&mut self) {
        self.stack.truncate(1);
    }
}

impl Default for ContextStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONTEXT_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rawtext_tables() {
        assert_eq!(rawtext_context_for(b"title"), Some(TokenizerContext::Rcdata));
        assert_eq!(rawtext_context_for(b"TextArea"), Some(TokenizerContext::Rcdata));
        assert_eq!(rawtext_context_for(b"STYLE"), Some(TokenizerContext::Rawtext));
        assert_eq!(rawtext_context_for(b"listing"), Some(TokenizerContext::Rawtext));
        assert_eq!(rawtext_context_for(b"script"), Some(TokenizerContext::ScriptData));
        assert_eq!(rawtext_context_for(b"plaintext"), Some(TokenizerContext::Plaintext));
        assert_eq!(rawtext_context_for(b"div"), None);
        assert_eq!(rawtext_context_for(b"scripts"), None);
        assert_eq!(rawtext_context_for(b""), None);
    }

    #[test]
    fn test_rawtext_family() {
        assert!(TokenizerContext::Plaintext.is_rawtext_family());
        assert!(TokenizerContext::ScriptData.is_rawtext_family());
        assert!(!TokenizerContext::Comment.is_rawtext_family());
        assert!(!TokenizerContext::Html.is_rawtext_family());
    }

    #[test]
    fn test_html_context_is_never_popped() {
        let mut stack = ContextStack::default();
        stack.push(TokenizerContext::OpenTag);
        assert_eq!(stack.pop(), Some(TokenizerContext::OpenTag));
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.current(), TokenizerContext::Html);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_replace_top_keeps_depth() {
        let mut stack = ContextStack::default();
        stack.push(TokenizerContext::OpenTag);
        stack.push(TokenizerContext::SolidusOrTagName);
        stack.replace_top(TokenizerContext::TagName);
        assert_eq!(stack.depth(), 3);
        assert_eq!(stack.current(), TokenizerContext::TagName);
    }

    #[test]
    fn test_depth_limit() {
        let mut stack = ContextStack::new(2);
        assert!(stack.can_push());
        stack.push(TokenizerContext::OpenTag);
        assert!(!stack.can_push());
        stack.reset();
        assert_eq!(stack.as_slice(), &[TokenizerContext::Html]);
        assert_eq!(ContextStack::new(0).max_depth(), 1);
    }
}
