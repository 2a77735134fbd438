use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::axis::{Axis, AxisMapping, GroupMappings};

/// Named groups and their axis mappings, keyed by group name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupTable {
    groups: BTreeMap<String, GroupMappings>,
}

// One unreadable group must not cost the rest of the table.
impl<'de> Deserialize<'de> for GroupTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let groups = raw
            .into_iter()
            .map(|(name, value)| {
                let mappings = serde_json::from_value(value).unwrap_or_else(|e| {
                    warn!("Group '{}' is malformed, loaded empty: {}", name, e);
                    GroupMappings::default()
                });
                (name, mappings)
            })
            .collect();
        Ok(Self { groups })
    }
}

/// What a reconcile against a peer's group list changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl GroupTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&GroupMappings> {
        self.groups.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut GroupMappings> {
        self.groups.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GroupMappings)> {
        self.groups.iter().map(|(name, mappings)| (name.as_str(), mappings))
    }

    /// Inserts or replaces a group.
    pub fn insert(&mut self, name: impl Into<String>, mappings: GroupMappings) {
        self.groups.insert(name.into(), mappings);
    }

    /// Adds an empty group. Returns `false` if the name is blank or taken.
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.groups.contains_key(name) {
            return false;
        }
        self.groups.insert(name.to_string(), GroupMappings::default());
        true
    }

    pub fn remove(&mut self, name: &str) -> Option<GroupMappings> {
        self.groups.remove(name)
    }

    /// Replaces one axis of an existing group.
    pub fn set_axis(&mut self, name: &str, axis: Axis, mapping: AxisMapping) -> bool {
        match self.groups.get_mut(name) {
            Some(group) => {
                *group.axis_mut(axis) = mapping;
                true
            }
            None => false,
        }
    }

    /// Makes the table's names match `peer_groups`: unknown names are removed,
    /// new names get empty mappings, and surviving groups are left untouched.
    pub fn reconcile<S: AsRef<str>>(&mut self, peer_groups: &[S]) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        self.groups.retain(|name, _| {
            let keep = peer_groups.iter().any(|g| g.as_ref() == name);
            if !keep {
                report.removed.push(name.clone());
            }
            keep
        });

        for name in peer_groups {
            let name = name.as_ref();
            if !self.groups.contains_key(name) {
                self.groups.insert(name.to_string(), GroupMappings::default());
                report.added.push(name.to_string());
            }
        }

        report
    }
}
