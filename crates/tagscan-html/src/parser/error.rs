use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A recoverable grammar error.
///
/// Issues are recorded in the order they occur and never change afterwards.
/// Positions are those of the token that triggered the issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseIssue {
    /// What the grammar expected instead.
    pub message: String,
    /// Byte offset in the document.
    pub position: usize,
    /// Character offset in the document.
    pub char_position: usize,
    /// Line, starting at 1.
    pub line_number: usize,
    /// Column in characters, starting at 0.
    pub column_number: usize,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.line_number, self.column_number, self.message
        )
    }
}

/// Errors that reject a chunk before it reaches the document.
///
/// The document is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The chunk's encoding differs from the one fixed by the first chunk.
    #[error("cannot append {chunk} string to {document} document")]
    EncodingMismatch {
        /// Encoding of the rejected chunk.
        chunk: &'static str,
        /// Encoding of the document.
        document: &'static str,
    },

    /// The chunk's encoding cannot be scanned byte by byte.
    #[error("cannot scan {encoding} text: encoding is not ASCII compatible")]
    UnsupportedEncoding {
        /// Name of the rejected encoding.
        encoding: &'static str,
    },

    /// The chunk has bytes that are invalid in its encoding, or ends in the
    /// middle of a character.
    #[error("chunk is not well-formed {encoding}")]
    MalformedChunk {
        /// Encoding of the rejected chunk.
        encoding: &'static str,
    },
}
