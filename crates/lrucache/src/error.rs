//! Error types for lrucache

use std::collections::TryReserveError;
use std::fmt;

/// Result type alias for lrucache construction
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a cache
///
/// Steady-state `put`/`get` never fail: a miss is reported as `None`.
#[derive(Debug)]
pub enum Error {
    /// Capacity must be greater than 0
    ZeroCapacity,

    /// Storage for the frames, slot records or recency handles could not be reserved
    Alloc(TryReserveError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ZeroCapacity => write!(f, "Capacity must be greater than 0"),
            Error::Alloc(e) => write!(f, "Allocation failed: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Alloc(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TryReserveError> for Error {
    fn from(err: TryReserveError) -> Self {
        Error::Alloc(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_zero_capacity() {
        assert_eq!(Error::ZeroCapacity.to_string(), "Capacity must be greater than 0");
    }

    #[test]
    fn test_alloc_source() {
        let err = Vec::<u64>::new().try_reserve_exact(usize::MAX).unwrap_err();
        let err = Error::from(err);

        assert!(err.to_string().starts_with("Allocation failed"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
