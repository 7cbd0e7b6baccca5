//! Error types for map access and cursor misuse

use thiserror::Error;

/// Why a cursor was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorFault {
    #[error("cursor is past the end")]
    AtEnd,

    #[error("cursor is already at the first entry")]
    BeforeFirst,

    #[error("map is empty")]
    EmptyMap,

    #[error("entry was erased")]
    Stale,

    #[error("cursor belongs to another map")]
    ForeignMap,
}

/// Ordered map errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("key not found")]
    KeyNotFound,

    #[error("invalid iterator: {0}")]
    InvalidIterator(CursorFault),
}

/// Result type for ordered map operations
pub type Result<T> = std::result::Result<T, Error>;

/// A broken structural property reported by `OrderedMap::validate`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("root is red")]
    RedRoot,

    #[error("red node at depth {depth} has a red child")]
    RedRed { depth: usize },

    #[error("black height differs: {left} on the left, {right} on the right")]
    BlackHeight { left: usize, right: usize },

    #[error("in-order keys are not strictly ascending at position {position}")]
    Order { position: usize },

    #[error("parent link of node at depth {depth} is inconsistent")]
    ParentLink { depth: usize },

    #[error("recorded length {recorded} but {reachable} reachable nodes")]
    Count { recorded: usize, reachable: usize },
}

#[cfg(test)]
mod tests {
    use super::{CursorFault, Error};

    #[test]
    fn messages() {
        assert_eq!(Error::KeyNotFound.to_string(), "key not found");
        assert_eq!(
            Error::InvalidIterator(CursorFault::ForeignMap).to_string(),
            "invalid iterator: cursor belongs to another map"
        );
    }
}
