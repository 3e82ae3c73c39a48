//! Type and tag indexes
//!
//! [`TypeIndex`] maps a type to the services that satisfy it. Every service
//! is listed under its own type and under each ancestor, in one of two
//! tiers:
//!
//! - `primary`: eligible for autowiring and `get_by_type`
//! - `secondary`: excluded from autowiring, still found by type queries
//!
//! The index is built ahead of time and never computed per query.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::TypeHierarchy;
use crate::value::{normalize_type, TypeName};

/// Autowiring tier of a service under a given type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WiringTier {
    #[default]
    Primary,
    Secondary,
}

/// Candidate services for one type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WiringEntry {
    #[serde(default)]
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
}

impl WiringEntry {
    fn push(&mut self, name: &str, tier: WiringTier) {
        if self.primary.iter().chain(&self.secondary).any(|n| n == name) {
            return;
        }
        match tier {
            WiringTier::Primary => self.primary.push(name.to_string()),
            WiringTier::Secondary => self.secondary.push(name.to_string()),
        }
    }
}

type WiringMap = HashMap<TypeName, WiringEntry>;

/// Type → candidate service names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WiringMap", into = "WiringMap")]
pub struct TypeIndex {
    entries: WiringMap,
}

impl From<WiringMap> for TypeIndex {
    fn from(raw: WiringMap) -> Self {
        let mut index = TypeIndex::new();
        index.merge(TypeIndex { entries: raw });
        index
    }
}

impl From<TypeIndex> for WiringMap {
    fn from(index: TypeIndex) -> Self {
        index.entries
    }
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a service under a single type.
    pub fn insert(&mut self, type_name: &str, service: &str, tier: WiringTier) {
        self.entries
            .entry(normalize_type(type_name))
            .or_default()
            .push(service, tier);
    }

    /// Add a service under its type and every ancestor known to `hierarchy`.
    pub fn insert_with_ancestors(
        &mut self,
        hierarchy: &TypeHierarchy,
        type_name: &str,
        service: &str,
        tier: WiringTier,
    ) {
        for ty in hierarchy.with_ancestors(type_name) {
            self.insert(&ty, service, tier);
        }
    }

    /// Primary candidates, the only ones eligible for autowiring.
    pub fn autowired(&self, type_name: &str) -> &[String] {
        self.entries
            .get(&normalize_type(type_name))
            .map(|entry| entry.primary.as_slice())
            .unwrap_or(&[])
    }

    /// Secondary candidates.
    pub fn excluded(&self, type_name: &str) -> &[String] {
        self.entries
            .get(&normalize_type(type_name))
            .map(|entry| entry.secondary.as_slice())
            .unwrap_or(&[])
    }

    /// Primary followed by secondary candidates.
    pub fn candidates(&self, type_name: &str) -> Vec<String> {
        let mut names = self.autowired(type_name).to_vec();
        names.extend_from_slice(self.excluded(type_name));
        names
    }

    /// Merge another index; existing names keep their tier.
    pub fn merge(&mut self, other: TypeIndex) {
        for (type_name, entry) in other.entries {
            let target = self.entries.entry(normalize_type(&type_name)).or_default();
            for name in &entry.primary {
                target.push(name, WiringTier::Primary);
            }
            for name in &entry.secondary {
                target.push(name, WiringTier::Secondary);
            }
        }
    }

    pub fn type_count(&self) -> usize {
        self.entries.len()
    }
}

/// Tag → (service name → attribute).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagIndex {
    tags: HashMap<String, BTreeMap<String, serde_json::Value>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag a service with attribute `true`.
    pub fn tag(&mut self, tag: &str, service: &str) {
        self.tag_with(tag, service, serde_json::Value::Bool(true));
    }

    /// Tag a service with an arbitrary attribute.
    pub fn tag_with(&mut self, tag: &str, service: &str, attribute: serde_json::Value) {
        self.tags
            .entry(tag.to_string())
            .or_default()
            .insert(service.to_string(), attribute);
    }

    /// Services carrying the tag, ordered by name.
    pub fn find(&self, tag: &str) -> BTreeMap<String, serde_json::Value> {
        self.tags.get(tag).cloned().unwrap_or_default()
    }

    pub fn merge(&mut self, other: TagIndex) {
        for (tag, services) in other.tags {
            self.tags.entry(tag).or_default().extend(services);
        }
    }
}
