//! Explicit type hierarchy
//!
//! Subtype relationships are handed to the registry as plain data instead of
//! being discovered at runtime. Each type lists its direct supertypes
//! (parent types and implemented interfaces); queries walk the graph.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::value::{normalize_type, TypeName};

type SupertypeMap = BTreeMap<TypeName, BTreeSet<TypeName>>;

/// Type → direct supertypes.
///
/// Names read through serde are normalized like every other entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SupertypeMap", into = "SupertypeMap")]
pub struct TypeHierarchy {
    supertypes: SupertypeMap,
}

impl From<SupertypeMap> for TypeHierarchy {
    fn from(raw: SupertypeMap) -> Self {
        let mut hierarchy = TypeHierarchy::new();
        for (type_name, supertypes) in raw {
            hierarchy.declare(&type_name);
            for supertype in supertypes {
                hierarchy.extend(&type_name, &supertype);
            }
        }
        hierarchy
    }
}

impl From<TypeHierarchy> for SupertypeMap {
    fn from(hierarchy: TypeHierarchy) -> Self {
        hierarchy.supertypes
    }
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a type with no supertypes.
    pub fn declare(&mut self, type_name: &str) -> &mut Self {
        self.supertypes.entry(normalize_type(type_name)).or_default();
        self
    }

    /// Declare that `type_name` directly extends or implements `supertype`.
    pub fn extend(&mut self, type_name: &str, supertype: &str) -> &mut Self {
        let supertype = normalize_type(supertype);
        self.supertypes.entry(supertype.clone()).or_default();
        self.supertypes
            .entry(normalize_type(type_name))
            .or_default()
            .insert(supertype);
        self
    }

    /// Whether the hierarchy knows the type at all.
    pub fn contains(&self, type_name: &str) -> bool {
        self.supertypes.contains_key(&normalize_type(type_name))
    }

    /// All transitive supertypes of a type, excluding the type itself.
    pub fn ancestors(&self, type_name: &str) -> BTreeSet<TypeName> {
        let start = normalize_type(type_name);
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<&TypeName> = VecDeque::new();

        if let Some(direct) = self.supertypes.get(&start) {
            queue.extend(direct.iter());
        }
        while let Some(current) = queue.pop_front() {
            if current == &start || !seen.insert(current.clone()) {
                continue;
            }
            if let Some(next) = self.supertypes.get(current) {
                queue.extend(next.iter());
            }
        }
        seen
    }

    /// The type itself followed by all of its ancestors.
    pub fn with_ancestors(&self, type_name: &str) -> Vec<TypeName> {
        let mut all = vec![normalize_type(type_name)];
        all.extend(self.ancestors(type_name));
        all
    }

    /// Whether values of `type_name` may be used where `expected` is declared.
    pub fn is_subtype(&self, type_name: &str, expected: &str) -> bool {
        let expected = normalize_type(expected);
        normalize_type(type_name) == expected || self.ancestors(type_name).contains(&expected)
    }

    /// Merge another hierarchy into this one.
    pub fn merge(&mut self, other: TypeHierarchy) {
        for (type_name, supertypes) in other.supertypes {
            self.declare(&type_name);
            for supertype in supertypes {
                self.extend(&type_name, &supertype);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.supertypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.supertypes.is_empty()
    }
}
