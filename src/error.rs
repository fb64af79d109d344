//! Error types shared across the crate.

use thiserror::Error;

/// Error variants for succinct bit structure operations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// An index argument lies outside the structure's declared domain.
    #[error("index out of range: {0}")]
    OutOfRange(usize),

    /// A constructor received inconsistent or invalid arguments.
    #[error("bad argument: {0}")]
    BadArgument(&'static str),

    /// A write operation was invoked on a read-only view.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

/// A specialized Result type for succinct bit structure operations.
pub type Result<T> = core::result::Result<T, Error>;
