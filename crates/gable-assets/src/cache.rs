//! Per-type asset caches and the type-erased cache registry.
//!
//! One [`AssetCache`] exists per asset type, all held in [`AssetCaches`]
//! keyed by `TypeId`. Maps live behind `RefCell` with borrows held only
//! across map operations; construction always runs outside any borrow and
//! insertion is double-checked, which is what makes re-entrant loads from
//! inside constructors safe.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

use gable_core::alloc::HashMap;

use crate::asset::{Asset, AssetScope};
use crate::key::AssetKey;

/// A cached asset plus the metadata eviction needs.
struct CacheEntry<T> {
    /// Display name as sanitized from the first request.
    name: String,
    /// Fixed at first load; later requests under other scopes do not move it.
    scope: AssetScope,
    asset: Rc<T>,
}

/// Case-insensitive name → asset map for a single asset type.
pub struct AssetCache<T: Asset> {
    entries: RefCell<HashMap<AssetKey, CacheEntry<T>>>,
}

impl<T: Asset> Default for AssetCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Asset> AssetCache<T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Read-only probe; never loads.
    pub fn lookup(&self, key: &AssetKey) -> Option<Rc<T>> {
        self.entries
            .borrow()
            .get(key)
            .map(|entry| Rc::clone(&entry.asset))
    }

    /// The scope an entry was first loaded under.
    pub fn scope_of(&self, key: &AssetKey) -> Option<AssetScope> {
        self.entries.borrow().get(key).map(|entry| entry.scope)
    }

    /// Insert an asset, double-checked: if another entry landed under this
    /// key while the asset was being constructed, the earlier entry wins and
    /// is returned instead.
    pub fn insert(&self, key: AssetKey, name: &str, scope: AssetScope, asset: Rc<T>) -> Rc<T> {
        let mut entries = self.entries.borrow_mut();
        if let Some(existing) = entries.get(&key) {
            return Rc::clone(&existing.asset);
        }
        let entry = CacheEntry {
            name: name.to_string(),
            scope,
            asset: Rc::clone(&asset),
        };
        entries.insert(key, entry);
        asset
    }

    /// Remove a single entry (used to roll back a failed two-phase load).
    pub fn remove(&self, key: &AssetKey) -> Option<Rc<T>> {
        self.entries.borrow_mut().remove(key).map(|e| e.asset)
    }

    /// Drop every entry tagged with the given scope, returning the count.
    pub fn evict(&self, scope: AssetScope) -> usize {
        // Move evicted entries out of the borrow before dropping them, in
        // case an asset's Drop impl reaches back into the manager.
        let evicted: Vec<CacheEntry<T>> = {
            let mut entries = self.entries.borrow_mut();
            let keys: Vec<AssetKey> = entries
                .iter()
                .filter(|(_, e)| e.scope == scope)
                .map(|(k, _)| k.clone())
                .collect();
            keys.into_iter()
                .filter_map(|k| entries.remove(&k))
                .collect()
        };
        let count = evicted.len();
        for entry in &evicted {
            tracing::debug!("evicting {} '{}'", T::type_name(), entry.name);
        }
        count
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// Type-erased view of an [`AssetCache`] for scope fan-out.
pub trait ErasedCache: 'static {
    /// Evict every entry with the given scope; returns the count.
    fn evict_scope(&self, scope: AssetScope) -> usize;

    /// Asset type name for diagnostics.
    fn cache_type_name(&self) -> &'static str;

    /// Upcast for downcast-on-read access.
    fn as_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Asset> ErasedCache for AssetCache<T> {
    fn evict_scope(&self, scope: AssetScope) -> usize {
        self.evict(scope)
    }

    fn cache_type_name(&self) -> &'static str {
        T::type_name()
    }

    fn as_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// Registry of all per-type caches, keyed by `TypeId`.
#[derive(Default)]
pub struct AssetCaches {
    caches: RefCell<HashMap<TypeId, Rc<dyn ErasedCache>>>,
}

impl AssetCaches {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cache for a type, creating it on first use.
    pub fn get_or_create<T: Asset>(&self) -> Rc<AssetCache<T>> {
        let erased = {
            let mut caches = self.caches.borrow_mut();
            Rc::clone(
                caches
                    .entry(TypeId::of::<T>())
                    .or_insert_with(|| Rc::new(AssetCache::<T>::new())),
            )
        };
        erased
            .as_any_rc()
            .downcast::<AssetCache<T>>()
            .expect("type mismatch in cache registry")
    }

    /// Get the cache for a type if one exists.
    pub fn get<T: Asset>(&self) -> Option<Rc<AssetCache<T>>> {
        let erased = Rc::clone(self.caches.borrow().get(&TypeId::of::<T>())?);
        erased.as_any_rc().downcast::<AssetCache<T>>().ok()
    }

    /// Evict the given scope from every cache; returns total entries dropped.
    pub fn evict_all(&self, scope: AssetScope) -> usize {
        // Clone the cache handles first so no registry borrow is held while
        // entries (and their Drop impls) run.
        let caches: Vec<Rc<dyn ErasedCache>> =
            self.caches.borrow().values().map(Rc::clone).collect();
        caches.iter().map(|c| c.evict_scope(scope)).sum()
    }
}
