//! Common utilities for the tagscan crates.
//!
//! This crate provides shared infrastructure used by the scanner and its tools:
//! - **Warning System** - deduplicated, colored terminal diagnostics
//! - **Text Encoding** - byte/character accounting over `encoding_rs` encodings

pub mod encoding;
pub mod warning;

pub use encoding::TextEncoding;
