//------------ LshForestError -------------------------------------------

use std::fmt;

/// Possible errors returned by methods on an [`LshForest`](crate::LshForest).
#[derive(Debug)]
pub enum LshForestError {
    /// The constructor was called with `l > d`, or with `d == 0` or
    /// `l == 0`.
    InvalidParameter(String),
    /// An operation that requires raw signature lookup (querying by id,
    /// linear scan, ...) was called on an index constructed with
    /// `StoreConfig::Disabled`.
    StoreDisabled,
    /// A signature passed to `insert`/`batch_insert`/a query method did
    /// not have exactly `d` words.
    DimensionMismatch { expected: u32, actual: usize },
    /// A file-backed signature store or a persistence dump failed an I/O
    /// operation.
    Io(std::io::Error),
    /// A persistence dump could not be encoded or decoded.
    Serialization(bincode::Error),
}

impl std::error::Error for LshForestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LshForestError::Io(e) => Some(e),
            LshForestError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for LshForestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LshForestError::InvalidParameter(msg) => {
                write!(f, "Error: invalid parameter: {msg}")
            }
            LshForestError::StoreDisabled => write!(
                f,
                "Error: this LshForest was not instantiated with a \
                signature store."
            ),
            LshForestError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Error: expected a signature of length {expected}, \
                    got {actual}."
                )
            }
            LshForestError::Io(e) => write!(f, "Error: I/O failure: {e}"),
            LshForestError::Serialization(e) => {
                write!(f, "Error: (de)serialization failure: {e}")
            }
        }
    }
}

impl From<std::io::Error> for LshForestError {
    fn from(e: std::io::Error) -> Self {
        LshForestError::Io(e)
    }
}

impl From<bincode::Error> for LshForestError {
    fn from(e: bincode::Error) -> Self {
        LshForestError::Serialization(e)
    }
}
