//! Optimized collection types for Gable.
//!
//! Re-exports hash collections backed by AHash, which is measurably faster
//! than SipHash for the short string keys the engine hashes constantly.

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_with_name_keys() {
        let mut sizes: HashMap<String, u64> = HashMap::new();
        sizes.insert("r25.sif".to_string(), 4096);
        sizes.insert("r25.sif".to_string(), 8192);

        assert_eq!(sizes.len(), 1);
        assert_eq!(sizes.get("r25.sif"), Some(&8192));
        assert!(sizes.get("r33.sif").is_none());
    }

    #[test]
    fn test_random_state_backs_std_collections() {
        // The re-exported hasher must plug into plain std maps too.
        let mut seen = std::collections::HashSet::with_hasher(RandomState::new());
        assert!(seen.insert("core.brn"));
        assert!(!seen.insert("core.brn"));

        let mut loaded = HashSet::new();
        loaded.insert("day1.brn");
        assert!(loaded.contains("day1.brn"));
    }
}
