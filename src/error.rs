//! Error taxonomy shared by both collections.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, CollectionError>;

/// Every failure a collection operation or cursor can surface.
///
/// Errors are always returned to the immediate caller; no operation
/// retries or swallows one internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    /// Index outside `[0, len)` (or `[0, len]` for insertion points).
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A range whose start lies after its end.
    #[error("invalid range: start {start} is greater than end {end}")]
    InvalidRange { start: usize, end: usize },

    /// The structure was mutated behind a cursor's back.
    #[error("concurrent modification: cursor saw version {expected}, structure is at {found}")]
    ConcurrentModification { expected: u64, found: u64 },

    /// A cursor was handed a collection other than the one that created it.
    #[error("cursor belongs to a different collection")]
    WrongCollection,

    /// `remove` without a preceding successful advance, or twice in a row.
    #[error("cursor has no current element")]
    IllegalState,

    /// Cursor moved past either end.
    #[error("no such element")]
    NoSuchElement,

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// A structural invariant was found broken. Never expected.
    #[error("internal consistency violation: {0}")]
    InternalConsistency(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::CollectionError;

    #[test]
    fn messages_name_the_offending_values() {
        let e = CollectionError::IndexOutOfBounds { index: 7, len: 3 };
        assert_eq!(e.to_string(), "index 7 out of bounds for length 3");

        let e = CollectionError::ConcurrentModification {
            expected: 1,
            found: 4,
        };
        assert!(e.to_string().contains("version 1"));
        assert!(e.to_string().contains("at 4"));

        assert_eq!(
            CollectionError::WrongCollection.to_string(),
            "cursor belongs to a different collection"
        );
    }
}
