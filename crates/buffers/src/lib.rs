//! Binary buffer primitives for the binarytf codec: a growable [`Writer`]
//! and a bounds-checked [`Reader`].

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;

use thiserror::Error;

/// Errors raised by bounds-checked buffer reads.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// A read required more bytes than the buffer holds. `expected` is the
    /// size of the read that failed.
    #[error("unexpected end of buffer, expected {expected} more byte(s)")]
    EndOfBuffer { expected: usize },
    /// The requested bytes are not a valid UTF-8 sequence.
    #[error("invalid utf-8 sequence")]
    InvalidUtf8,
}
