//! Asset traits and the construction contract.
//!
//! Concrete decoders (texture pixels, model meshes, script bytecode) live
//! outside this crate; they plug in by implementing [`ConstructAsset`] or,
//! for types that can reference themselves while parsing, [`PopulateAsset`].

use crate::error::AssetResult;
use crate::manager::AssetManager;

/// Lifetime tag governing when a cached asset is bulk-evicted.
///
/// The scope is fixed at first load: a later request for the same name under
/// a different scope returns the cached instance and leaves the original
/// scope in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AssetScope {
    /// Lives until explicitly unloaded or the manager is dropped.
    #[default]
    Global,
    /// Bulk-evicted on scene transition via `unload_assets(AssetScope::Scene)`.
    Scene,
}

/// Base trait for anything the asset manager can cache.
pub trait Asset: 'static {
    /// Canonical file extension (without the dot) appended during name
    /// sanitization when the caller omits one. Empty means "never append".
    const EXTENSION: &'static str;

    /// Human-readable type name for diagnostics.
    fn type_name() -> &'static str;
}

/// Context handed to a constructor while an asset is being built.
pub struct LoadContext<'a> {
    /// The sanitized display name of the asset being constructed.
    pub name: &'a str,
    /// The scope the asset is being loaded under.
    pub scope: AssetScope,
    /// The raw bytes, extracted from a loose file or a barn.
    pub bytes: &'a [u8],
    /// The manager, so constructors can pull in dependent assets.
    pub assets: &'a AssetManager,
}

/// Single-phase construction: bytes in, asset out.
///
/// The result is cached only on success; a failure propagates and a later
/// retry may succeed (for example after another barn is loaded).
pub trait ConstructAsset: Asset + Sized {
    fn construct(ctx: LoadContext<'_>) -> AssetResult<Self>;
}

/// Two-phase construction for types whose parser may re-request the *same*
/// type by name (scripted and sequenced assets can reference themselves or
/// siblings).
///
/// `allocate` produces a cheap placeholder carrying identity but no content.
/// The cache inserts it *before* `populate` runs, so a re-entrant load of the
/// same name resolves to the placeholder instead of recursing. `populate`
/// fills the placeholder through the type's own interior mutability.
pub trait PopulateAsset: Asset + Sized {
    fn allocate(name: &str, scope: AssetScope) -> Self;
    fn populate(&self, ctx: LoadContext<'_>) -> AssetResult<()>;
}
