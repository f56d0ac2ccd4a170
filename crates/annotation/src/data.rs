//! Annotation records and the per-bin certificate lists that reference them.

use std::collections::BTreeMap;

use binning_common::DenseTileData;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tile of annotation bins; bins without annotations are `None`.
pub type AnnotationTile = DenseTileData<Option<AnnotationBin>>;

/// Reference to one version of an annotation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Certificate {
    /// Record identifier
    pub id: Uuid,
    /// Record version, milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Certificate {
    pub fn new(id: Uuid, timestamp: i64) -> Self {
        Self { id, timestamp }
    }
}

/// A point annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationData {
    pub uuid: Uuid,
    /// Position in data space
    pub x: f64,
    pub y: f64,
    /// Pyramid level the annotation was placed at
    pub level: u32,
    /// Group used for filtering, e.g. a priority
    pub group: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Free-form payload
    #[serde(default)]
    pub data: serde_json::Value,
}

impl AnnotationData {
    /// Create a new annotation stamped with the current time.
    pub fn new(x: f64, y: f64, level: u32, group: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            x,
            y,
            level,
            group: group.into(),
            timestamp: Utc::now().timestamp_millis(),
            data,
        }
    }

    /// Replace the timestamp, producing a new version of the record.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Reference to this version of the record.
    pub fn certificate(&self) -> Certificate {
        Certificate::new(self.uuid, self.timestamp)
    }
}

/// Certificates of one bin, grouped and sorted newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationBin {
    groups: BTreeMap<String, Vec<Certificate>>,
}

impl AnnotationBin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a certificate, replacing any older reference to the same record
    /// within the group.
    pub fn add(&mut self, group: &str, certificate: Certificate) {
        let entries = self.groups.entry(group.to_string()).or_default();
        entries.retain(|c| c.id != certificate.id);
        let position = entries.partition_point(|c| c.timestamp >= certificate.timestamp);
        entries.insert(position, certificate);
    }

    /// Remove every reference to the certificate's record. Returns whether
    /// anything was removed.
    pub fn remove(&mut self, certificate: &Certificate) -> bool {
        let mut removed = false;
        for entries in self.groups.values_mut() {
            let before = entries.len();
            entries.retain(|c| c.id != certificate.id);
            removed |= entries.len() != before;
        }
        self.groups.retain(|_, entries| !entries.is_empty());
        removed
    }

    /// Certificates of a group, newest first.
    pub fn certificates(&self, group: &str) -> &[Certificate] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of the groups present in the bin.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of certificates across groups.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}
