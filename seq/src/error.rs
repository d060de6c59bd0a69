//! Error types for the fallible accessors.
//!
//! Most operations on sequences are total: out of range updates return the
//! sequence unchanged and slice bounds are clamped. The `try_` variants
//! report out of range indices instead.

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("index {index} is out of bounds for a sequence of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
