use thiserror::Error;

/// Errors returned by the fallible [`Omt`](crate::Omt) operations.
///
/// Search misses are not errors: the comparator searches report them through
/// their return types (`None`, or the `Err(index)` insertion point), in the
/// style of [`slice::binary_search`](https://doc.rust-lang.org/std/primitive.slice.html#method.binary_search).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// A comparator-guided insert found an element comparing equal to the
    /// probe. The sequence was not modified.
    #[error("an element comparing equal is already present")]
    KeyExists,

    /// A positional argument was out of range. The sequence was not modified.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The offending position.
        index: usize,
        /// The sequence length at the time of the call.
        len: usize,
    },
}
