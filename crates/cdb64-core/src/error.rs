//! Error types for cdb64.

use std::fmt;
use std::io;

/// The main error type for cdb64 operations.
///
/// A missing key is never an error; lookups report it as `Ok(None)`.
#[derive(Debug)]
pub enum Error {
    /// I/O error from the underlying medium
    Io(io::Error),

    /// The file is truncated or its header, tables or records are malformed
    Corruption(String),

    /// Invalid operation, such as writing to a finalized writer
    InvalidOperation(String),

    /// A previous attempt to finalize the writer failed
    Finalize(String),
}

impl Error {
    /// Maps a short read to [`Error::Corruption`], everything else to [`Error::Io`].
    pub fn from_read(err: io::Error, what: &str, offset: u64) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::Corruption(format!("truncated {} at offset {}", what, offset))
        } else {
            Error::Io(err)
        }
    }

    /// Returns true if this error reports a malformed file.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::Corruption(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Corruption(msg) => write!(f, "Corrupt database: {}", msg),
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
            Error::Finalize(msg) => write!(f, "Finalize failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

/// A specialized `Result` type for cdb64 operations.
pub type Result<T> = std::result::Result<T, Error>;
