//! Shared functionality
//!
//! This crate supplies the input side of the cssyntax pipeline: decoding and
//! preprocessing of the raw bytes, the code point stream the tokenizer reads from,
//! source locations and the fatal error type.
//!

pub mod byte_stream;
pub mod errors;
