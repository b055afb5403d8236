//! Barn bundles: single files holding a directory of named byte blobs.
//!
//! On-disk layout, all integers little-endian:
//!
//! ```text
//! magic   b"BRN1"
//! count   u32
//! entry*  u16 name_len, name (UTF-8), u8 compression,
//!         u32 offset, u32 stored_size, u32 uncompressed_size
//! blobs   raw or brotli-compressed bytes at the recorded offsets
//! ```
//!
//! A barn owns its directory metadata only; extraction re-reads the file and
//! yields a fresh buffer per call, so unloading a barn never invalidates
//! assets that were already constructed from it.

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use gable_core::alloc::HashMap;

use crate::error::{AssetError, AssetResult};
use crate::key::AssetKey;

const BARN_MAGIC: [u8; 4] = *b"BRN1";

/// Fixed bytes per directory entry, excluding the name itself.
const ENTRY_FIXED_SIZE: usize = 2 + 1 + 4 + 4 + 4;

/// How a blob is stored inside a barn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Stored verbatim.
    Store,
    /// Brotli-compressed.
    Brotli,
}

impl Compression {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Compression::Store),
            1 => Some(Compression::Brotli),
            _ => None,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Compression::Store => 0,
            Compression::Brotli => 1,
        }
    }
}

/// Directory metadata sufficient to extract one blob.
#[derive(Debug, Clone)]
pub struct BarnEntry {
    /// The contained asset's name as written into the barn.
    pub name: String,
    /// Storage method for the blob.
    pub compression: Compression,
    offset: u32,
    stored_size: u32,
    uncompressed_size: u32,
}

impl BarnEntry {
    /// Size of the blob after extraction.
    pub fn uncompressed_size(&self) -> u32 {
        self.uncompressed_size
    }
}

/// A loaded barn bundle: its directory table plus the path to re-read blobs.
#[derive(Debug)]
pub struct BarnFile {
    name: String,
    key: AssetKey,
    path: PathBuf,
    directory: HashMap<AssetKey, BarnEntry>,
}

impl BarnFile {
    /// Open a barn and read its directory table.
    ///
    /// Fails with [`AssetError::MalformedBarn`] if the header or any entry is
    /// unreadable; nothing is registered in that case.
    pub fn open(name: &str, path: &Path) -> AssetResult<Self> {
        let file = File::open(path).map_err(|e| AssetError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file_len = file
            .metadata()
            .map_err(|e| AssetError::Io {
                path: path.to_path_buf(),
                source: e,
            })?
            .len();
        let mut reader = BufReader::new(file);

        let malformed = |message: String| AssetError::MalformedBarn {
            barn: name.to_string(),
            message,
        };

        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|_| malformed("missing header".into()))?;
        if magic != BARN_MAGIC {
            return Err(malformed("bad magic".into()));
        }

        let count = read_u32(&mut reader).map_err(|_| malformed("truncated header".into()))?;

        let mut directory: HashMap<AssetKey, BarnEntry> = HashMap::new();
        for index in 0..count {
            let truncated = |_| malformed(format!("truncated directory at entry {}", index));

            let name_len = read_u16(&mut reader).map_err(truncated)? as usize;
            let mut name_bytes = vec![0u8; name_len];
            reader.read_exact(&mut name_bytes).map_err(truncated)?;
            let entry_name = String::from_utf8(name_bytes)
                .map_err(|_| malformed(format!("entry {} name is not UTF-8", index)))?;

            let compression_byte = read_u8(&mut reader).map_err(truncated)?;
            let compression = Compression::from_u8(compression_byte).ok_or_else(|| {
                malformed(format!(
                    "entry '{}' has unknown compression {}",
                    entry_name, compression_byte
                ))
            })?;
            let offset = read_u32(&mut reader).map_err(truncated)?;
            let stored_size = read_u32(&mut reader).map_err(truncated)?;
            let uncompressed_size = read_u32(&mut reader).map_err(truncated)?;

            if u64::from(offset) + u64::from(stored_size) > file_len {
                return Err(malformed(format!(
                    "entry '{}' extends past end of file",
                    entry_name
                )));
            }

            // The catalog tolerates duplicate names; the first entry wins.
            let entry_key = AssetKey::new(&entry_name);
            directory.entry(entry_key).or_insert(BarnEntry {
                name: entry_name,
                compression,
                offset,
                stored_size,
                uncompressed_size,
            });
        }

        tracing::info!(
            "opened barn '{}' with {} entries ({})",
            name,
            directory.len(),
            path.display()
        );

        Ok(Self {
            name: name.to_string(),
            key: AssetKey::new(name),
            path: path.to_path_buf(),
            directory,
        })
    }

    /// The name this barn was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The case-folded registry key for this barn.
    pub fn key(&self) -> &AssetKey {
        &self.key
    }

    /// Whether the barn's directory contains the given asset.
    pub fn contains(&self, key: &AssetKey) -> bool {
        self.directory.contains_key(key)
    }

    /// Look up the directory entry for an asset.
    pub fn entry(&self, key: &AssetKey) -> Option<&BarnEntry> {
        self.directory.get(key)
    }

    /// Iterate over the directory entries, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &BarnEntry> {
        self.directory.values()
    }

    /// Number of entries in the directory.
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    /// Extract the bytes for a contained asset into a fresh buffer.
    pub fn extract(&self, key: &AssetKey) -> AssetResult<Vec<u8>> {
        let entry = self.directory.get(key).ok_or_else(|| AssetError::NotFound {
            name: key.as_str().to_string(),
        })?;

        let mut file = File::open(&self.path).map_err(|e| AssetError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        file.seek(SeekFrom::Start(u64::from(entry.offset)))
            .map_err(|e| AssetError::Io {
                path: self.path.clone(),
                source: e,
            })?;

        let mut stored = vec![0u8; entry.stored_size as usize];
        file.read_exact(&mut stored).map_err(|e| AssetError::Io {
            path: self.path.clone(),
            source: e,
        })?;

        match entry.compression {
            Compression::Store => Ok(stored),
            Compression::Brotli => {
                let mut decompressed = Vec::with_capacity(entry.uncompressed_size as usize);
                brotli::BrotliDecompress(&mut Cursor::new(&stored), &mut decompressed).map_err(
                    |e| AssetError::MalformedBarn {
                        barn: self.name.clone(),
                        message: format!("brotli decode of '{}' failed: {}", entry.name, e),
                    },
                )?;
                if decompressed.len() != entry.uncompressed_size as usize {
                    return Err(AssetError::MalformedBarn {
                        barn: self.name.clone(),
                        message: format!(
                            "'{}' decompressed to {} bytes, directory says {}",
                            entry.name,
                            decompressed.len(),
                            entry.uncompressed_size
                        ),
                    });
                }
                Ok(decompressed)
            }
        }
    }
}

/// Tracks loaded barns in load order.
///
/// Name search scans barns oldest-first and stops at the first match: when
/// two loaded barns contain the same asset name, the earliest-loaded barn is
/// authoritative.
#[derive(Debug, Default)]
pub struct BarnRegistry {
    barns: Vec<BarnFile>,
}

impl BarnRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a barn is registered under the given name.
    pub fn is_loaded(&self, name: &str) -> bool {
        let key = AssetKey::new(name);
        self.barns.iter().any(|b| *b.key() == key)
    }

    /// Open the barn at `path` and register it under `name`.
    ///
    /// Loading a barn that is already registered is a no-op, not an error.
    /// On failure the registry is unchanged.
    pub fn load(&mut self, name: &str, path: &Path) -> AssetResult<()> {
        if self.is_loaded(name) {
            tracing::debug!("barn '{}' already loaded, ignoring", name);
            return Ok(());
        }
        let barn = BarnFile::open(name, path)?;
        self.barns.push(barn);
        Ok(())
    }

    /// Remove a barn from consideration.
    ///
    /// Assets already constructed from it stay valid; the cache is decoupled
    /// from the barn's lifetime once bytes have been extracted.
    pub fn unload(&mut self, name: &str) -> bool {
        let key = AssetKey::new(name);
        let before = self.barns.len();
        self.barns.retain(|b| *b.key() != key);
        before != self.barns.len()
    }

    /// Get a registered barn by name.
    pub fn get(&self, name: &str) -> Option<&BarnFile> {
        let key = AssetKey::new(name);
        self.barns.iter().find(|b| *b.key() == key)
    }

    /// First loaded barn containing the given asset, if any.
    pub fn find_containing(&self, key: &AssetKey) -> Option<&BarnFile> {
        self.barns.iter().find(|b| b.contains(key))
    }

    /// The loaded barns, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &BarnFile> {
        self.barns.iter()
    }

    /// Number of loaded barns.
    pub fn len(&self) -> usize {
        self.barns.len()
    }

    /// Whether no barns are loaded.
    pub fn is_empty(&self) -> bool {
        self.barns.is_empty()
    }
}

/// Assembles a barn file, mainly for export tooling and tests.
#[derive(Debug, Default)]
pub struct BarnBuilder {
    entries: Vec<(String, Compression, Vec<u8>)>,
}

impl BarnBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a blob stored verbatim.
    pub fn add(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.entries.push((name.into(), Compression::Store, bytes));
        self
    }

    /// Add a blob stored brotli-compressed.
    pub fn add_compressed(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.entries.push((name.into(), Compression::Brotli, bytes));
        self
    }

    /// Write the barn to disk.
    pub fn write_to(self, path: &Path) -> AssetResult<()> {
        let io_err = |e| AssetError::Io {
            path: path.to_path_buf(),
            source: e,
        };

        let oversized = |message: String| AssetError::MalformedBarn {
            barn: path.display().to_string(),
            message,
        };

        // Compress up front so the directory can record stored sizes.
        let mut blobs: Vec<(String, Compression, u32, Vec<u8>)> = Vec::new();
        for (name, compression, bytes) in self.entries {
            if name.len() > u16::MAX as usize {
                return Err(oversized(format!(
                    "entry name of {} bytes exceeds the directory limit",
                    name.len()
                )));
            }
            if bytes.len() > u32::MAX as usize {
                return Err(oversized(format!(
                    "entry '{}' of {} bytes exceeds the blob size limit",
                    name,
                    bytes.len()
                )));
            }
            let uncompressed_size = bytes.len() as u32;
            let stored = match compression {
                Compression::Store => bytes,
                Compression::Brotli => {
                    let mut compressed = Vec::new();
                    let params = brotli::enc::BrotliEncoderParams {
                        quality: 9,
                        ..Default::default()
                    };
                    brotli::BrotliCompress(&mut Cursor::new(&bytes), &mut compressed, &params)
                        .map_err(io_err)?;
                    compressed
                }
            };
            if stored.len() > u32::MAX as usize {
                return Err(oversized(format!(
                    "entry '{}' stored as {} bytes, exceeding the blob size limit",
                    name,
                    stored.len()
                )));
            }
            blobs.push((name, compression, uncompressed_size, stored));
        }

        let directory_size: usize = 8 + blobs
            .iter()
            .map(|(name, _, _, _)| ENTRY_FIXED_SIZE + name.len())
            .sum::<usize>();

        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(&BARN_MAGIC).map_err(io_err)?;
        writer
            .write_all(&(blobs.len() as u32).to_le_bytes())
            .map_err(io_err)?;

        let mut offset = directory_size as u32;
        for (name, compression, uncompressed_size, stored) in &blobs {
            writer
                .write_all(&(name.len() as u16).to_le_bytes())
                .map_err(io_err)?;
            writer.write_all(name.as_bytes()).map_err(io_err)?;
            writer.write_all(&[compression.as_u8()]).map_err(io_err)?;
            writer.write_all(&offset.to_le_bytes()).map_err(io_err)?;
            writer
                .write_all(&(stored.len() as u32).to_le_bytes())
                .map_err(io_err)?;
            writer
                .write_all(&uncompressed_size.to_le_bytes())
                .map_err(io_err)?;
            offset += stored.len() as u32;
        }

        for (_, _, _, stored) in &blobs {
            writer.write_all(stored).map_err(io_err)?;
        }
        writer.flush().map_err(io_err)?;
        Ok(())
    }
}

fn read_u8<R: Read>(reader: &mut R) -> std::io::Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u16<R: Read>(reader: &mut R) -> std::io::Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(reader: &mut R) -> std::io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn barn_path(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        dir.path().join(name)
    }

    #[test]
    fn test_round_trip_store_and_brotli() {
        let dir = tempfile::tempdir().unwrap();
        let path = barn_path(&dir, "core.brn");

        let big = vec![7u8; 64 * 1024];
        BarnBuilder::new()
            .add("hello.txt", b"hello barn".to_vec())
            .add_compressed("big.dat", big.clone())
            .write_to(&path)
            .unwrap();

        let barn = BarnFile::open("core.brn", &path).unwrap();
        assert_eq!(barn.len(), 2);

        let hello = barn.extract(&AssetKey::new("hello.txt")).unwrap();
        assert_eq!(hello, b"hello barn");

        let entry = barn.entry(&AssetKey::new("big.dat")).unwrap();
        assert_eq!(entry.compression, Compression::Brotli);
        assert_eq!(entry.uncompressed_size() as usize, big.len());
        assert_eq!(barn.extract(&AssetKey::new("BIG.DAT")).unwrap(), big);
    }

    #[test]
    fn test_directory_lookup_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = barn_path(&dir, "mixed.brn");
        BarnBuilder::new()
            .add("Scene01.SIF", b"sif".to_vec())
            .write_to(&path)
            .unwrap();

        let barn = BarnFile::open("mixed.brn", &path).unwrap();
        assert!(barn.contains(&AssetKey::new("scene01.sif")));
        assert!(barn.contains(&AssetKey::new("SCENE01.sif")));
    }

    #[test]
    fn test_duplicate_directory_entries_first_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = barn_path(&dir, "dup.brn");
        BarnBuilder::new()
            .add("twice.txt", b"first".to_vec())
            .add("Twice.txt", b"second".to_vec())
            .write_to(&path)
            .unwrap();

        let barn = BarnFile::open("dup.brn", &path).unwrap();
        assert_eq!(barn.len(), 1);
        assert_eq!(barn.extract(&AssetKey::new("twice.txt")).unwrap(), b"first");
    }

    #[test]
    fn test_builder_rejects_oversized_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = barn_path(&dir, "big.brn");

        let name = "n".repeat(u16::MAX as usize + 1);
        let err = BarnBuilder::new()
            .add(name, b"x".to_vec())
            .write_to(&path)
            .unwrap_err();
        assert!(matches!(err, AssetError::MalformedBarn { .. }));
        // Nothing half-written is left behind.
        assert!(!path.exists());
    }

    #[test]
    fn test_bad_magic_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = barn_path(&dir, "bad.brn");
        fs::write(&path, b"NOPE\x00\x00\x00\x00").unwrap();

        let err = BarnFile::open("bad.brn", &path).unwrap_err();
        assert!(matches!(err, AssetError::MalformedBarn { .. }));
    }

    #[test]
    fn test_truncated_directory_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = barn_path(&dir, "short.brn");
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&BARN_MAGIC);
        bytes.extend_from_slice(&5u32.to_le_bytes());
        bytes.extend_from_slice(&3u16.to_le_bytes());
        fs::write(&path, bytes).unwrap();

        let err = BarnFile::open("short.brn", &path).unwrap_err();
        assert!(matches!(err, AssetError::MalformedBarn { .. }));
    }

    #[test]
    fn test_entry_past_end_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = barn_path(&dir, "liar.brn");
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&BARN_MAGIC);
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.push(b'x');
        bytes.push(0); // store
        bytes.extend_from_slice(&0u32.to_le_bytes()); // offset
        bytes.extend_from_slice(&9999u32.to_le_bytes()); // stored size
        bytes.extend_from_slice(&9999u32.to_le_bytes());
        fs::write(&path, bytes).unwrap();

        let err = BarnFile::open("liar.brn", &path).unwrap_err();
        assert!(matches!(err, AssetError::MalformedBarn { .. }));
    }

    #[test]
    fn test_registry_duplicate_load_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = barn_path(&dir, "core.brn");
        BarnBuilder::new()
            .add("a.txt", b"a".to_vec())
            .write_to(&path)
            .unwrap();

        let mut registry = BarnRegistry::new();
        registry.load("core.brn", &path).unwrap();
        registry.load("CORE.BRN", &path).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_failed_load_leaves_registry_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = barn_path(&dir, "bad.brn");
        fs::write(&path, b"garbage").unwrap();

        let mut registry = BarnRegistry::new();
        assert!(registry.load("bad.brn", &path).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_earliest_barn_wins() {
        let dir = tempfile::tempdir().unwrap();
        let first = barn_path(&dir, "first.brn");
        let second = barn_path(&dir, "second.brn");
        BarnBuilder::new()
            .add("shared.txt", b"from first".to_vec())
            .write_to(&first)
            .unwrap();
        BarnBuilder::new()
            .add("shared.txt", b"from second".to_vec())
            .write_to(&second)
            .unwrap();

        let mut registry = BarnRegistry::new();
        registry.load("first.brn", &first).unwrap();
        registry.load("second.brn", &second).unwrap();

        let key = AssetKey::new("shared.txt");
        let barn = registry.find_containing(&key).unwrap();
        assert_eq!(barn.name(), "first.brn");
        assert_eq!(barn.extract(&key).unwrap(), b"from first");
    }

    #[test]
    fn test_unload_removes_barn() {
        let dir = tempfile::tempdir().unwrap();
        let path = barn_path(&dir, "core.brn");
        BarnBuilder::new()
            .add("a.txt", b"a".to_vec())
            .write_to(&path)
            .unwrap();

        let mut registry = BarnRegistry::new();
        registry.load("core.brn", &path).unwrap();
        assert!(registry.unload("core.brn"));
        assert!(!registry.unload("core.brn"));
        assert!(registry.find_containing(&AssetKey::new("a.txt")).is_none());
    }
}
