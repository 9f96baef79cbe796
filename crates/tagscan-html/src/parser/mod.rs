//! Grammar layer: tracks where tokens sit in HTML syntax.
//!
//! The [`Parser`] owns a [`Tokenizer`](crate::tokenizer::Tokenizer) and a
//! [`Document`]. Each chunk handed to it is appended to the document and
//! scanned; every token moves the grammar state machine and updates the
//! line/column position.

/// The parser front: configuration, chunks, views.
pub mod core;
/// The append-only document buffer.
pub mod document;
/// Grammar issues and chunk rejection errors.
pub mod error;
mod grammar;
/// Byte-range references into the document.
pub mod reference;

pub use self::core::{Chunk, ParsedToken, Parser, ParserConfig, ParserContext, ParserView};
pub use document::Document;
pub use error::{DocumentError, ParseIssue};
pub use reference::TokenRef;
