//! The asset manager facade.
//!
//! Owns the search paths, the barn registry, and every per-type cache.
//! There is no process-wide instance: construct one explicitly, configure
//! search paths and barns, then hand out `&AssetManager` to whatever needs
//! to load. Dropping the manager releases every cached asset.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::asset::{Asset, AssetScope, ConstructAsset, LoadContext, PopulateAsset};
use crate::barn::BarnRegistry;
use crate::builtin::{RawAsset, TextAsset};
use crate::cache::AssetCaches;
use crate::error::{AssetError, AssetResult};
use crate::io::{self, RawBuffer};
use crate::key::{AssetKey, sanitize_name};
use crate::search::SearchPaths;

/// Extension appended to barn names that omit one.
const BARN_EXTENSION: &str = "brn";

/// Facade composing search paths, barns, and per-type caches.
///
/// Single-threaded by design: loads perform blocking IO and some asset
/// constructors must run on the thread owning the graphics context. The
/// internal `RefCell`s make the manager deliberately `!Sync`, and borrows
/// are never held across constructor calls, so constructors are free to
/// load dependent assets re-entrantly.
pub struct AssetManager {
    search: SearchPaths,
    barns: RefCell<BarnRegistry>,
    caches: AssetCaches,
}

impl Default for AssetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetManager {
    /// Create a manager with no search paths and no barns.
    pub fn new() -> Self {
        Self {
            search: SearchPaths::new(),
            barns: RefCell::new(BarnRegistry::new()),
            caches: AssetCaches::new(),
        }
    }

    /// Append a directory to the search path list, lowest priority.
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search.add(path);
    }

    /// The configured search paths.
    pub fn search_paths(&self) -> &SearchPaths {
        &self.search
    }

    // ------------------------------------------------------------------
    // Barns
    // ------------------------------------------------------------------

    /// Locate a barn on the search paths and register it.
    ///
    /// Returns `false` (with a logged diagnostic) when the barn cannot be
    /// found or its directory is malformed; loading an already-loaded barn
    /// is a successful no-op.
    pub fn load_barn(&self, name: &str) -> bool {
        let file_name = sanitize_name(name, BARN_EXTENSION);
        if self.barns.borrow().is_loaded(&file_name) {
            tracing::debug!("barn '{}' already loaded, ignoring", file_name);
            return true;
        }
        let Some(path) = self.search.resolve(&file_name) else {
            tracing::warn!("barn '{}' not found on any search path", file_name);
            return false;
        };
        match self.barns.borrow_mut().load(&file_name, &path) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("failed to load barn '{}': {}", file_name, e);
                false
            }
        }
    }

    /// Drop a barn from the registry.
    ///
    /// Cached assets that were constructed from it remain valid.
    pub fn unload_barn(&self, name: &str) {
        let file_name = sanitize_name(name, BARN_EXTENSION);
        if !self.barns.borrow_mut().unload(&file_name) {
            tracing::warn!("barn '{}' was not loaded", file_name);
        }
    }

    /// Whether a barn is currently registered.
    pub fn is_barn_loaded(&self, name: &str) -> bool {
        let file_name = sanitize_name(name, BARN_EXTENSION);
        self.barns.borrow().is_loaded(&file_name)
    }

    /// Extract an asset's raw bytes and write them verbatim to `out_dir`.
    ///
    /// Export/debug path: nothing is constructed and nothing is cached.
    /// Resolution uses the same precedence as loading (loose file first,
    /// then earliest containing barn).
    pub fn write_asset_to_file(&self, asset_name: &str, out_dir: &Path) -> AssetResult<PathBuf> {
        let name = asset_name.trim();
        let raw = {
            let barns = self.barns.borrow();
            io::load_raw(name, &self.search, &barns)?
        };
        write_bytes(out_dir, name, &raw.bytes)
    }

    /// Write every barn-contained asset whose name contains `pattern`
    /// (case-insensitive) to `out_dir`. Returns how many files were written.
    pub fn write_all_assets_matching(&self, pattern: &str, out_dir: &Path) -> AssetResult<usize> {
        let needle = pattern.trim().to_lowercase();
        let barns = self.barns.borrow();

        let mut written = 0;
        for barn in barns.iter() {
            for entry in barn.entries() {
                if !entry.name.to_lowercase().contains(&needle) {
                    continue;
                }
                let key = AssetKey::new(&entry.name);
                match barn
                    .extract(&key)
                    .and_then(|bytes| write_bytes(out_dir, &entry.name, &bytes))
                {
                    Ok(_) => written += 1,
                    Err(e) => {
                        tracing::warn!("skipping '{}' from '{}': {}", entry.name, barn.name(), e);
                    }
                }
            }
        }
        Ok(written)
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Get or load an asset with single-phase construction.
    ///
    /// Returns `None` on any failure, with a logged diagnostic; nothing is
    /// cached on failure, so a later retry can succeed (for example after
    /// another barn is loaded). A cache hit ignores the requested scope.
    pub fn load<T: ConstructAsset>(&self, name: &str, scope: AssetScope) -> Option<Rc<T>> {
        let display = sanitize_name(name, T::EXTENSION);
        let key = AssetKey::new(&display);
        let cache = self.caches.get_or_create::<T>();

        if let Some(hit) = cache.lookup(&key) {
            return Some(hit);
        }

        let raw = self.load_raw_logged::<T>(&display)?;
        let ctx = LoadContext {
            name: &display,
            scope,
            bytes: &raw.bytes,
            assets: self,
        };
        match T::construct(ctx) {
            Ok(asset) => Some(cache.insert(key, &display, scope, Rc::new(asset))),
            Err(e) => {
                tracing::error!("{}", e);
                None
            }
        }
    }

    /// Get or load an asset with two-phase construction.
    ///
    /// The placeholder from `allocate` is cache-visible before `populate`
    /// runs, so a re-entrant load of the same name from inside `populate`
    /// returns the same instance instead of recursing. If `populate` fails
    /// the placeholder is removed and `None` is returned.
    pub fn load_two_phase<T: PopulateAsset>(&self, name: &str, scope: AssetScope) -> Option<Rc<T>> {
        let display = sanitize_name(name, T::EXTENSION);
        let key = AssetKey::new(&display);
        let cache = self.caches.get_or_create::<T>();

        if let Some(hit) = cache.lookup(&key) {
            return Some(hit);
        }

        let raw = self.load_raw_logged::<T>(&display)?;

        let fresh = Rc::new(T::allocate(&display, scope));
        let cached = cache.insert(key.clone(), &display, scope, Rc::clone(&fresh));
        if !Rc::ptr_eq(&cached, &fresh) {
            // Someone inserted this key while we were allocating.
            return Some(cached);
        }

        let ctx = LoadContext {
            name: &display,
            scope,
            bytes: &raw.bytes,
            assets: self,
        };
        match fresh.populate(ctx) {
            Ok(()) => Some(fresh),
            Err(e) => {
                cache.remove(&key);
                tracing::error!("{}", e);
                None
            }
        }
    }

    /// Probe the cache without loading.
    pub fn lookup<T: Asset>(&self, name: &str) -> Option<Rc<T>> {
        let display = sanitize_name(name, T::EXTENSION);
        let key = AssetKey::new(&display);
        self.caches.get::<T>()?.lookup(&key)
    }

    /// Load a UTF-8 text asset.
    pub fn load_text(&self, name: &str, scope: AssetScope) -> Option<Rc<TextAsset>> {
        self.load::<TextAsset>(name, scope)
    }

    /// Load an asset as verbatim bytes.
    pub fn load_data(&self, name: &str, scope: AssetScope) -> Option<Rc<RawAsset>> {
        self.load::<RawAsset>(name, scope)
    }

    /// Evict every cached asset tagged with `scope`, across all types.
    pub fn unload_assets(&self, scope: AssetScope) {
        let count = self.caches.evict_all(scope);
        tracing::info!("unloaded {} assets with scope {:?}", count, scope);
    }

    /// Resolve raw bytes for `display_name`, logging a miss at warn level.
    fn load_raw_logged<T: Asset>(&self, display_name: &str) -> Option<RawBuffer> {
        let result = {
            let barns = self.barns.borrow();
            io::load_raw(display_name, &self.search, &barns)
        };
        match result {
            Ok(raw) => {
                tracing::debug!("{} '{}' resolved from {:?}", T::type_name(), display_name, raw.source);
                Some(raw)
            }
            Err(e @ AssetError::NotFound { .. }) => {
                tracing::warn!("{} '{}': {}", T::type_name(), display_name, e);
                None
            }
            Err(e) => {
                tracing::error!("{} '{}': {}", T::type_name(), display_name, e);
                None
            }
        }
    }
}

fn write_bytes(out_dir: &Path, file_name: &str, bytes: &[u8]) -> AssetResult<PathBuf> {
    std::fs::create_dir_all(out_dir).map_err(|e| AssetError::Io {
        path: out_dir.to_path_buf(),
        source: e,
    })?;
    let out_path = out_dir.join(file_name);
    std::fs::write(&out_path, bytes).map_err(|e| AssetError::Io {
        path: out_path.clone(),
        source: e,
    })?;
    Ok(out_path)
}
