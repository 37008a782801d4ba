//! Error types for marshaling operations.
//!
//! Nothing here retries or recovers: every variant is either a caller
//! precondition that was not upheld or an allocator failure bubbled up
//! untouched.

use thiserror::Error;

/// Error type for marshaling operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteropError {
    /// The native allocator returned null
    #[error("allocation of {size} bytes failed")]
    AllocationFailed { size: usize },

    /// Element count times element width overflows the addressable range
    #[error("array of {count} elements of {width} bytes overflows usize")]
    SizeOverflow { count: usize, width: usize },

    /// Char constructor input does not fit a single byte
    #[error("char value {0:?} does not fit a single byte")]
    InvalidChar(char),

    /// Positional index past the end of the region
    #[error("index {index} out of bounds for {len} elements")]
    OutOfBounds { index: usize, len: usize },

    /// Byte extent larger than one of the regions involved
    #[error("extent of {requested} bytes exceeds region of {available} bytes")]
    SizeExceedsRegion { requested: usize, available: usize },

    /// Field name not present in the record layout
    #[error("unknown field `{0}`")]
    UnknownField(String),

    /// No null terminator inside the allocated region
    #[error("no null terminator within {0} bytes")]
    MissingTerminator(usize),

    /// Char data is not valid UTF-8
    #[error("invalid UTF-8 in char data: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Descriptor string does not follow the C-like grammar
    #[error("malformed descriptor `{0}`")]
    MalformedDescriptor(String),

    /// Operation requires a region of a different shape
    #[error("descriptor mismatch: {0}")]
    DescriptorMismatch(&'static str),
}

/// Result type for marshaling operations
pub type InteropResult<T> = Result<T, InteropError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InteropError::AllocationFailed { size: 64 };
        assert!(err.to_string().contains("64"));

        let err = InteropError::OutOfBounds { index: 5, len: 3 };
        assert!(err.to_string().contains("5"));
        assert!(err.to_string().contains("3"));

        let err = InteropError::UnknownField("nope".to_string());
        assert!(err.to_string().contains("nope"));
    }
}
