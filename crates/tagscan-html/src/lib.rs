//! Incremental HTML tokenizer and grammar scanner.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tokenizer** ([`tokenizer`])
//!   - A context stack covering tags, attributes, comments and CDATA sections
//!   - Raw-text handling for RCDATA, RAWTEXT, script data and PLAINTEXT elements
//!   - Byte and character offsets on every token
//!
//! - **Parser** ([`parser`])
//!   - A grammar state machine fed by the tokenizer, with error recovery
//!   - An append-only document with line/column tracking
//!   - Placeholders: text appended to the document but hidden from the grammar
//!
//! Input may arrive in any number of chunks. State carries over between
//! chunks, so a tag split across two of them is scanned as one tag.
//!
//! # Not Implemented
//!
//! - Tree construction
//! - Character reference decoding
//! - Encodings that are not ASCII compatible, such as UTF-16

/// Grammar layer and document buffer.
pub mod parser;
/// Byte-level tokenizer.
pub mod tokenizer;

pub use parser::{
    Chunk, DocumentError, ParseIssue, ParsedToken, Parser, ParserConfig, ParserContext, ParserView,
};
pub use tagscan_common::TextEncoding;
pub use tokenizer::{Token, TokenKind, Tokenizer, TokenizerConfig, TokenizerContext};
