//! HTML tokenizer module.
//!
//! A byte-level scanner driven by a stack of lexical contexts. It recognizes
//! tags, attributes, comments, CDATA sections and the raw-text content of
//! elements like `<script>`, and reports each token with byte and character
//! positions.

/// Tokenizer contexts, the context stack and raw-text element tables.
pub mod context;
/// Tokenizer state machine implementation.
pub mod core;
/// Scan window and character-class helpers.
pub mod helpers;
/// Token types produced by the tokenizer.
pub mod token;

pub use context::{TokenizerContext, rawtext_context_for};
pub use self::core::{Tokenizer, TokenizerConfig};
pub use token::{Token, TokenKind};
