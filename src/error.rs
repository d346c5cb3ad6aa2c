//! Error taxonomy for the imaging facade.
//!
//! Validation failures are raised before any engine call is made, so a failed
//! operation never leaves an image half-transformed. Engine failures are
//! normalized from [`EngineError`] into the variants below.

use crate::imaging::EngineError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Unrecognized image format")]
    UnrecognizedFormat,
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Save failed: {0}")]
    SaveFailure(String),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Io(e) => Error::Io(e),
            EngineError::Decode(msg) => Error::Decode(msg),
            EngineError::Encode(msg) | EngineError::Unsupported(msg) => Error::Encode(msg),
            EngineError::Filter(msg) => Error::InvalidArgument(msg),
        }
    }
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_into_taxonomy() {
        assert!(matches!(
            Error::from(EngineError::Decode("bad header".into())),
            Error::Decode(m) if m == "bad header"
        ));
        assert!(matches!(
            Error::from(EngineError::Unsupported("format xyz".into())),
            Error::Encode(_)
        ));
        assert!(matches!(
            Error::from(EngineError::Filter("unknown op".into())),
            Error::InvalidArgument(_)
        ));
    }

    #[test]
    fn messages_name_the_path() {
        let err = Error::FileNotFound(PathBuf::from("/nope/photo.jpg"));
        assert_eq!(err.to_string(), "File not found: /nope/photo.jpg");
    }
}
