//! Built-in asset types with trivial decoders.
//!
//! Real decoders (textures, models, script bytecode) live in their own
//! crates; these two cover the common "just give me the file" cases and
//! serve as reference implementations of [`ConstructAsset`].

use crate::asset::{Asset, ConstructAsset, LoadContext};
use crate::error::{AssetError, AssetResult};

/// A UTF-8 text asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAsset {
    pub text: String,
}

impl Asset for TextAsset {
    const EXTENSION: &'static str = "txt";

    fn type_name() -> &'static str {
        "TextAsset"
    }
}

impl ConstructAsset for TextAsset {
    fn construct(ctx: LoadContext<'_>) -> AssetResult<Self> {
        let text = String::from_utf8(ctx.bytes.to_vec()).map_err(|e| AssetError::Construction {
            name: ctx.name.to_string(),
            message: format!("invalid UTF-8: {}", e),
        })?;
        Ok(Self { text })
    }
}

/// An asset kept as verbatim bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAsset {
    pub bytes: Vec<u8>,
}

impl Asset for RawAsset {
    const EXTENSION: &'static str = "dat";

    fn type_name() -> &'static str {
        "RawAsset"
    }
}

impl ConstructAsset for RawAsset {
    fn construct(ctx: LoadContext<'_>) -> AssetResult<Self> {
        Ok(Self {
            bytes: ctx.bytes.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetScope;
    use crate::manager::AssetManager;

    #[test]
    fn test_text_asset_rejects_invalid_utf8() {
        let assets = AssetManager::new();
        let ctx = LoadContext {
            name: "bad.txt",
            scope: AssetScope::Global,
            bytes: &[0xff, 0xfe, 0x00],
            assets: &assets,
        };
        assert!(matches!(
            TextAsset::construct(ctx),
            Err(AssetError::Construction { .. })
        ));
    }

    #[test]
    fn test_raw_asset_copies_bytes() {
        let assets = AssetManager::new();
        let ctx = LoadContext {
            name: "blob.dat",
            scope: AssetScope::Global,
            bytes: &[1, 2, 3],
            assets: &assets,
        };
        let raw = RawAsset::construct(ctx).unwrap();
        assert_eq!(raw.bytes, vec![1, 2, 3]);
    }
}
