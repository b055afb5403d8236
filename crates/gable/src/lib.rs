//! Gable - a 3D adventure game engine
//!
//! This facade crate re-exports the engine's member crates:
//!
//! - **Core**: shared collections and logging setup
//! - **Assets**: search-path and barn-bundle asset resolution, typed
//!   caching, and scope-based eviction
//!
//! # Quick start
//!
//! ```no_run
//! use gable::assets::{AssetManager, AssetScope};
//!
//! gable::core::logging::init();
//!
//! let mut assets = AssetManager::new();
//! assets.add_search_path("data");
//! assets.load_barn("core");
//! let manifest = assets.load_text("manifest", AssetScope::Global);
//! ```

// Re-export core utilities
pub use gable_core as core;

// Re-export sub-crates based on features
#[cfg(feature = "assets")]
pub use gable_assets as assets;
#[cfg(feature = "assets")]
pub use gable_assets::{AssetManager, AssetScope};
