//! Error types for the asset system.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur during asset operations.
///
/// None of these are fatal: a missing or malformed asset degrades the
/// requesting feature, it does not bring the engine down. The facade logs
/// the error and hands the caller an empty result.
#[derive(Debug)]
pub enum AssetError {
    /// The asset name resolved to nothing on any search path or loaded barn.
    NotFound {
        /// The sanitized asset name that was requested.
        name: String,
    },

    /// Reading bytes from disk failed.
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// A barn's directory table could not be read.
    MalformedBarn {
        /// The barn file name.
        barn: String,
        /// Description of what went wrong.
        message: String,
    },

    /// The type-specific constructor rejected the raw bytes.
    Construction {
        /// The asset being constructed.
        name: String,
        /// Description of the parse/decode failure.
        message: String,
    },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::NotFound { name } => {
                write!(f, "asset not found: {}", name)
            }
            AssetError::Io { path, source } => {
                write!(f, "IO error reading '{}': {}", path.display(), source)
            }
            AssetError::MalformedBarn { barn, message } => {
                write!(f, "malformed barn '{}': {}", barn, message)
            }
            AssetError::Construction { name, message } => {
                write!(f, "failed to construct '{}': {}", name, message)
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;
