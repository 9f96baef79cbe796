//! The grammar state machine driven by tokenizer output.
//!
//! Each state has a handler that either absorbs the token, moves to another
//! state, or records an issue and moves to a recovery state. A handler that
//! wants the same token processed again in its new state returns
//! [`Flow::Again`]; [`Grammar::handle`] loops until the token is consumed, so
//! chains of recoveries never deepen the call stack.

use tagscan_common::warning::warn_once;

use super::error::ParseIssue;
use super::reference::TokenRef;
use crate::tokenizer::TokenKind;

/// Grammar states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum GrammarState {
    #[default]
    None,
    SolidusOrTagName,
    TagName,
    Tag,
    AttributeName,
    AttributeWhitespaceOrEqual,
    AttributeWhitespaceOrValue,
    AttributeQuotedValue,
    SpaceAfterAttribute,
    AttributeUnquotedValue,
    TagEnd,
    Comment,
    Cdata,
}

/// What to do with the current token after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// The token has been consumed.
    Done,
    /// Process the same token again in the new state.
    Again,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TagFields {
    pub(crate) name: TokenRef,
    pub(crate) self_closing: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct AttributeFields {
    pub(crate) name: TokenRef,
    pub(crate) value: TokenRef,
    pub(crate) is_quoted: bool,
}

impl AttributeFields {
    const fn reset(&mut self, is_quoted: bool) {
        self.name.clear();
        self.value.clear();
        self.is_quoted = is_quoted;
    }
}

/// Grammar state plus everything accumulated while walking it.
#[derive(Debug, Clone, Default)]
pub(crate) struct Grammar {
    pub(crate) state: GrammarState,
    pub(crate) tag: TagFields,
    pub(crate) attribute: AttributeFields,
    pub(crate) comment: TokenRef,
    pub(crate) cdata: TokenRef,
    pub(crate) rawtext: TokenRef,
    pub(crate) errors: Vec<ParseIssue>,
    report_errors: bool,
}

impl Grammar {
    pub(crate) fn new(report_errors: bool) -> Self {
        Self {
            report_errors,
            ..Self::default()
        }
    }

    /// Feed one token through the state machine.
    ///
    /// `in_rawtext` tells whether the tokenizer is inside a raw-text element,
    /// which changes how the `None` state treats text.
    pub(crate) fn handle(&mut self, token: &TokenRef, in_rawtext: bool) {
        while self.dispatch(token, in_rawtext) == Flow::Again {}
    }

    fn dispatch(&mut self, token: &TokenRef, in_rawtext: bool) -> Flow {
        match self.state {
            GrammarState::None if in_rawtext => self.parse_rawtext(token),
            GrammarState::None => self.parse_none(token),
            GrammarState::SolidusOrTagName => self.parse_solidus_or_tag_name(token),
            GrammarState::TagName => self.parse_tag_name(token),
            GrammarState::Tag => self.parse_tag(token),
            GrammarState::AttributeName => self.parse_attribute_name(token),
            GrammarState::AttributeWhitespaceOrEqual => {
                self.parse_attribute_whitespace_or_equal(token)
            }
            GrammarState::AttributeWhitespaceOrValue => {
                self.parse_attribute_whitespace_or_value(token)
            }
            GrammarState::AttributeQuotedValue => self.parse_attribute_quoted_value(token),
            GrammarState::SpaceAfterAttribute => self.parse_space_after_attribute(token),
            GrammarState::AttributeUnquotedValue => self.parse_attribute_unquoted_value(token),
            GrammarState::TagEnd => self.parse_tag_end(token),
            GrammarState::Comment => self.parse_comment(token),
            GrammarState::Cdata => self.parse_cdata(token),
        }
    }

    /// Record an issue at `token`'s position.
    fn add_error(&mut self, token: &TokenRef, message: &str) {
        let issue = ParseIssue {
            message: message.to_string(),
            position: token.start,
            char_position: token.char_start,
            line_number: token.line_number,
            column_number: token.column_number,
        };
        if self.report_errors {
            warn_once(
                "Parser",
                &issue.message,
                format_args!("{}:{}", issue.line_number, issue.column_number),
            );
        }
        self.errors.push(issue);
    }

    /// Record an issue and retry the token as part of the tag.
    fn recover_in_tag(&mut self, token: &TokenRef, message: &str) -> Flow {
        self.add_error(token, message);
        self.state = GrammarState::Tag;
        Flow::Again
    }
}

// =============================================================================
// Outside Tags
// =============================================================================

impl Grammar {
    fn parse_none(&mut self, token: &TokenRef) -> Flow {
        match token.kind {
            TokenKind::TagStart => {
                self.tag.self_closing = false;
                self.tag.name.clear();
                self.state = GrammarState::SolidusOrTagName;
            }
            TokenKind::CommentStart => {
                self.comment.clear();
                self.state = GrammarState::Comment;
            }
            TokenKind::CdataStart => {
                self.cdata.clear();
                self.state = GrammarState::Cdata;
            }
            _ => {}
        }
        Flow::Done
    }

    fn parse_rawtext(&mut self, token: &TokenRef) -> Flow {
        if token.kind == TokenKind::Text {
            self.rawtext.extend_or_replace(token);
            return Flow::Done;
        }
        self.state = GrammarState::None;
        self.parse_none(token)
    }

    fn parse_comment(&mut self, token: &TokenRef) -> Flow {
        match token.kind {
            TokenKind::CommentEnd => self.state = GrammarState::None,
            TokenKind::Text => self.comment.extend_or_replace(token),
            _ => {}
        }
        Flow::Done
    }

    fn parse_cdata(&mut self, token: &TokenRef) -> Flow {
        match token.kind {
            TokenKind::CdataEnd => self.state = GrammarState::None,
            TokenKind::Text => self.cdata.extend_or_replace(token),
            _ => {}
        }
        Flow::Done
    }
}

// =============================================================================
// Tag Names
// =============================================================================

impl Grammar {
    fn parse_solidus_or_tag_name(&mut self, token: &TokenRef) -> Flow {
        match token.kind {
            // The closing-tag flag lives in the tokenizer; the solidus itself
            // carries nothing more.
            TokenKind::Solidus => {
                self.state = GrammarState::TagName;
                Flow::Done
            }
            TokenKind::TagName => {
                self.state = GrammarState::TagName;
                Flow::Again
            }
            _ => self.recover_in_tag(token, "expected '/' or tag name"),
        }
    }

    fn parse_tag_name(&mut self, token: &TokenRef) -> Flow {
        match token.kind {
            TokenKind::TagName => self.tag.name.extend_or_replace(token),
            TokenKind::Whitespace => self.state = GrammarState::Tag,
            TokenKind::TagEnd => self.state = GrammarState::None,
            TokenKind::Solidus => {
                self.state = GrammarState::Tag;
                return Flow::Again;
            }
            // The tokenizer only ends a tag name at whitespace, '/' or '>'.
            kind => panic!("expected whitespace, '/' or '>' after tag name, got {kind}"),
        }
        Flow::Done
    }

    fn parse_tag(&mut self, token: &TokenRef) -> Flow {
        match token.kind {
            TokenKind::TagEnd => self.state = GrammarState::None,
            TokenKind::Whitespace => {}
            TokenKind::Solidus => self.state = GrammarState::TagEnd,
            TokenKind::AttributeName => {
                self.attribute.reset(false);
                self.state = GrammarState::AttributeName;
                return Flow::Again;
            }
            TokenKind::AttributeQuotedValueStart => {
                self.attribute.reset(true);
                self.state = GrammarState::AttributeQuotedValue;
            }
            _ => self.add_error(token, "expected whitespace, '>', attribute name or value"),
        }
        Flow::Done
    }

    fn parse_tag_end(&mut self, token: &TokenRef) -> Flow {
        if token.kind == TokenKind::TagEnd {
            self.tag.self_closing = true;
            self.state = GrammarState::None;
            return Flow::Done;
        }
        self.recover_in_tag(token, "expected '>' after '/'")
    }
}

// =============================================================================
// Attributes
// =============================================================================

impl Grammar {
    fn parse_attribute_name(&mut self, token: &TokenRef) -> Flow {
        match token.kind {
            TokenKind::AttributeName => {
                self.attribute.name.extend_or_replace(token);
                Flow::Done
            }
            TokenKind::TagEnd | TokenKind::Solidus => {
                self.state = GrammarState::Tag;
                Flow::Again
            }
            TokenKind::Whitespace => {
                self.state = GrammarState::AttributeWhitespaceOrEqual;
                Flow::Again
            }
            TokenKind::Equal => {
                self.state = GrammarState::AttributeWhitespaceOrValue;
                Flow::Done
            }
            _ => self.recover_in_tag(token, "expected whitespace, '>' or '=' after attribute name"),
        }
    }

    fn parse_attribute_whitespace_or_equal(&mut self, token: &TokenRef) -> Flow {
        match token.kind {
            TokenKind::Whitespace => Flow::Done,
            // A new attribute, or the end of the tag.
            TokenKind::TagEnd
            | TokenKind::Solidus
            | TokenKind::AttributeName
            | TokenKind::AttributeQuotedValueStart => {
                self.state = GrammarState::Tag;
                Flow::Again
            }
            TokenKind::Equal => {
                self.state = GrammarState::AttributeWhitespaceOrValue;
                Flow::Done
            }
            _ => self.recover_in_tag(token, "expected '/', '>', \", ' or '=' after attribute name"),
        }
    }

    fn parse_attribute_whitespace_or_value(&mut self, token: &TokenRef) -> Flow {
        match token.kind {
            TokenKind::Whitespace => Flow::Done,
            TokenKind::AttributeQuotedValueStart => {
                self.attribute.is_quoted = true;
                self.state = GrammarState::AttributeQuotedValue;
                Flow::Done
            }
            TokenKind::AttributeUnquotedValue => {
                self.state = GrammarState::AttributeUnquotedValue;
                Flow::Again
            }
            _ => self.recover_in_tag(token, "expected attribute value after '='"),
        }
    }

    fn parse_attribute_quoted_value(&mut self, token: &TokenRef) -> Flow {
        match token.kind {
            TokenKind::AttributeQuotedValue => self.attribute.value.extend_or_replace(token),
            TokenKind::AttributeQuotedValueEnd => self.state = GrammarState::SpaceAfterAttribute,
            // The tokenizer stays in the quoted value until the closing quote.
            kind => panic!("expected end-quote after quoted value, got {kind}"),
        }
        Flow::Done
    }

    fn parse_space_after_attribute(&mut self, token: &TokenRef) -> Flow {
        match token.kind {
            TokenKind::Whitespace => {
                self.state = GrammarState::Tag;
                Flow::Done
            }
            TokenKind::TagEnd | TokenKind::Solidus => {
                self.state = GrammarState::Tag;
                Flow::Again
            }
            _ => self.recover_in_tag(token, "expected space after attribute value"),
        }
    }

    fn parse_attribute_unquoted_value(&mut self, token: &TokenRef) -> Flow {
        match token.kind {
            TokenKind::AttributeUnquotedValue => self.attribute.value.extend_or_replace(token),
            TokenKind::Whitespace => self.state = GrammarState::Tag,
            TokenKind::TagEnd | TokenKind::Solidus => {
                self.state = GrammarState::Tag;
                return Flow::Again;
            }
            // The tokenizer only ends an unquoted value at whitespace or '>'.
            kind => panic!("expected space or end-of-tag after unquoted value, got {kind}"),
        }
        Flow::Done
    }
}
