use std::fmt;

/// Errors returned by path operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    /// A buffer could not be grown.
    OutOfMemory,
    /// The operation does not apply to the current path state (no open or
    /// closed path, a Bezier where none is allowed, a cosmetic pen).
    CannotComplete,
    /// A caller-supplied argument is malformed or undersized.
    InvalidParameter,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::CannotComplete => write!(f, "operation cannot complete in the current state"),
            Self::InvalidParameter => write!(f, "invalid parameter"),
        }
    }
}

impl std::error::Error for PathError {}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PathError>;
