//! Result and Error types for voltools-utils

/// Type alias for `Result<T, utils::Error>`
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for `voltools_utils`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Nothing to take a minimum or maximum of
    EmptySlice,

    /// A `NaN` or infinite value at the given position
    NonFiniteValue(usize),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::EmptySlice => write!(f, "slice contains no values"),
            Self::NonFiniteValue(i) => write!(f, "non-finite value at index {i}"),
        }
    }
}

impl std::error::Error for Error {}
