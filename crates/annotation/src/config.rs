//! Filter configuration: how many annotations to serve per group.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AnnotationError, AnnotationResult};

/// Per-group annotation limits, read from a flat JSON object such as
/// `{"urgent": 10, "low": 2}`.
///
/// Counts must be non-negative integers; numeric strings like `"5"` are
/// accepted. Any other entry rejects the whole configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GroupCountConfig {
    counts: BTreeMap<String, usize>,
}

impl GroupCountConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the limit for a group.
    pub fn with_group(mut self, group: impl Into<String>, count: usize) -> Self {
        self.counts.insert(group.into(), count);
        self
    }

    /// Parse a configuration object.
    pub fn from_json(value: &Value) -> AnnotationResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            AnnotationError::invalid_config(format!("expected a JSON object, got {}", value))
        })?;

        let mut counts = BTreeMap::new();
        for (group, raw) in object {
            let count = parse_count(raw).ok_or_else(|| {
                warn!(group = %group, value = %raw, "Rejected filter configuration entry");
                AnnotationError::invalid_config(format!(
                    "count for group '{}' is not a non-negative integer: {}",
                    group, raw
                ))
            })?;
            counts.insert(group.clone(), count);
        }

        debug!(groups = counts.len(), "Parsed group count configuration");
        Ok(Self { counts })
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(s: &str) -> AnnotationResult<Self> {
        let value: Value = serde_json::from_str(s)
            .map_err(|e| AnnotationError::invalid_config(format!("malformed JSON: {}", e)))?;
        Self::from_json(&value)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> AnnotationResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Limit configured for a group.
    pub fn count(&self, group: &str) -> Option<usize> {
        self.counts.get(group).copied()
    }

    /// Groups and their limits, ordered by group name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(group, count)| (group.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

fn parse_count(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
