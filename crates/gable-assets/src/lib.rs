//! Asset resolution and caching for the Gable engine.
//!
//! Given a logical asset name, this crate finds the raw bytes (a loose file
//! on a search path, or a blob inside a loaded barn bundle), constructs a
//! typed asset exactly once via the [`ConstructAsset`]/[`PopulateAsset`]
//! contract, caches it case-insensitively by name, and evicts it later by
//! [`AssetScope`].
//!
//! ```no_run
//! use gable_assets::{AssetManager, AssetScope};
//!
//! let mut assets = AssetManager::new();
//! assets.add_search_path("data");
//! assets.load_barn("core");
//!
//! if let Some(readme) = assets.load_text("readme", AssetScope::Global) {
//!     println!("{}", readme.text);
//! }
//! assets.unload_assets(AssetScope::Scene);
//! ```

pub mod asset;
pub mod barn;
pub mod builtin;
pub mod cache;
pub mod error;
pub mod io;
pub mod key;
pub mod manager;
pub mod search;

pub use asset::{Asset, AssetScope, ConstructAsset, LoadContext, PopulateAsset};
pub use barn::{BarnBuilder, BarnEntry, BarnFile, BarnRegistry, Compression};
pub use builtin::{RawAsset, TextAsset};
pub use cache::{AssetCache, AssetCaches, ErasedCache};
pub use error::{AssetError, AssetResult};
pub use io::{BufferSource, RawBuffer};
pub use key::{AssetKey, sanitize_name};
pub use manager::AssetManager;
pub use search::SearchPaths;
