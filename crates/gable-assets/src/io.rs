//! Raw buffer loading: loose files first, then loaded barns.

use std::path::{Path, PathBuf};

use crate::barn::BarnRegistry;
use crate::error::{AssetError, AssetResult};
use crate::key::AssetKey;
use crate::search::SearchPaths;

/// Where a raw buffer came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferSource {
    /// Read from a loose file on a search path.
    LooseFile(PathBuf),
    /// Extracted from a loaded barn, identified by barn name.
    Barn(String),
}

/// A transient byte buffer plus its provenance.
///
/// Buffers are handed to the type constructor and dropped; they are never
/// cached themselves.
#[derive(Debug)]
pub struct RawBuffer {
    pub bytes: Vec<u8>,
    pub source: BufferSource,
}

/// Read a whole file, mapping IO failures to [`AssetError`].
pub fn read_file(path: &Path) -> AssetResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AssetError::NotFound {
                name: path.display().to_string(),
            }
        } else {
            AssetError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Produce the raw bytes for an asset name.
///
/// Loose files always shadow archived assets of the same name; this is what
/// makes override/patch workflows possible. Barns are consulted in load
/// order only when no search path has the file.
pub fn load_raw(name: &str, search: &SearchPaths, barns: &BarnRegistry) -> AssetResult<RawBuffer> {
    if let Some(path) = search.resolve(name) {
        let bytes = read_file(&path)?;
        return Ok(RawBuffer {
            bytes,
            source: BufferSource::LooseFile(path),
        });
    }

    let key = AssetKey::new(name);
    if let Some(barn) = barns.find_containing(&key) {
        let bytes = barn.extract(&key)?;
        return Ok(RawBuffer {
            bytes,
            source: BufferSource::Barn(barn.name().to_string()),
        });
    }

    Err(AssetError::NotFound {
        name: name.to_string(),
    })
}
