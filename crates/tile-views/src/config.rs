//! Configuration for derived views.

use serde::{Deserialize, Serialize};

/// Bucket window averaged by [`AverageTileBucketView`](crate::AverageTileBucketView).
///
/// Both bounds are inclusive bucket indices. `end_compare` may exceed the
/// number of buckets in a bin, it is clipped per bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BucketWindowConfig {
    /// First bucket index to include.
    pub start_compare: i64,

    /// Last bucket index to include.
    pub end_compare: i64,
}

impl BucketWindowConfig {
    pub fn new(start_compare: i64, end_compare: i64) -> Self {
        Self {
            start_compare,
            end_compare,
        }
    }

    /// Load the window from environment variables.
    ///
    /// Reads `BUCKET_START_COMPARE` and `BUCKET_END_COMPARE`; unset or
    /// unparseable values keep the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("BUCKET_START_COMPARE") {
            if let Ok(start) = val.trim().parse() {
                config.start_compare = start;
            }
        }

        if let Some(val) = lookup("BUCKET_END_COMPARE") {
            if let Ok(end) = val.trim().parse() {
                config.end_compare = end;
            }
        }

        config
    }

    /// Whether the window can select any bucket at all.
    pub fn is_empty(&self) -> bool {
        self.end_compare < self.start_compare || self.end_compare < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_window() {
        let config = BucketWindowConfig::default();
        assert_eq!(config.start_compare, 0);
        assert_eq!(config.end_compare, 0);
        assert!(!config.is_empty());
    }

    #[test]
    fn test_from_lookup() {
        let config = BucketWindowConfig::from_lookup(lookup(&[
            ("BUCKET_START_COMPARE", "2"),
            ("BUCKET_END_COMPARE", " 30 "),
        ]));
        assert_eq!(config, BucketWindowConfig::new(2, 30));
    }

    #[test]
    fn test_from_lookup_ignores_garbage() {
        let config = BucketWindowConfig::from_lookup(lookup(&[
            ("BUCKET_START_COMPARE", "soon"),
            ("BUCKET_END_COMPARE", "7"),
        ]));
        assert_eq!(config, BucketWindowConfig::new(0, 7));
    }

    #[test]
    fn test_is_empty() {
        assert!(BucketWindowConfig::new(5, 2).is_empty());
        assert!(BucketWindowConfig::new(-3, -1).is_empty());
        assert!(!BucketWindowConfig::new(0, 100).is_empty());
    }
}
