//! Case-insensitive asset keys and name sanitization.
//!
//! Every cache, barn directory, and registry in this crate is keyed by
//! [`AssetKey`] so that `"Foo.Bar"` and `"foo.bar"` land in the same slot.

use std::borrow::Borrow;
use std::fmt;

/// A case-folded asset name, used as the key type for every name lookup.
///
/// The original spelling is not kept here; cache entries store the display
/// name separately for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetKey(String);

impl AssetKey {
    /// Build a key from a name: trims surrounding whitespace and lowercases.
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    /// The folded key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Borrow<str> for AssetKey {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for AssetKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Normalize a requested asset name: trim whitespace and, when the caller
/// omitted an extension entirely, append the type's canonical one.
///
/// `"Foo"` becomes `"Foo.ext"`; `"Foo.ext"` and `"Foo.other"` pass through
/// unchanged. The returned string is the display name; fold it with
/// [`AssetKey::new`] to get the cache key.
pub fn sanitize_name(name: &str, extension: &str) -> String {
    let trimmed = name.trim();
    if extension.is_empty() || trimmed.contains('.') {
        trimmed.to_string()
    } else {
        format!("{}.{}", trimmed, extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_case_folding() {
        assert_eq!(AssetKey::new("Foo.Bar"), AssetKey::new("foo.bar"));
        assert_eq!(AssetKey::new("  R25.SIF "), AssetKey::new("r25.sif"));
    }

    #[test]
    fn test_sanitize_appends_extension() {
        assert_eq!(sanitize_name("Foo", "tex"), "Foo.tex");
        assert_eq!(sanitize_name(" Foo ", "tex"), "Foo.tex");
    }

    #[test]
    fn test_sanitize_keeps_existing_extension() {
        assert_eq!(sanitize_name("Foo.tex", "tex"), "Foo.tex");
        assert_eq!(sanitize_name("Foo.other", "tex"), "Foo.other");
    }

    #[test]
    fn test_sanitize_no_canonical_extension() {
        assert_eq!(sanitize_name("Foo", ""), "Foo");
    }
}
