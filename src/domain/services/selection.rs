use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::models::guest::PartyMember;

/// Attendance checkboxes for one party, keyed by "First Last".
///
/// Keys are fixed when the party is loaded; `toggle` and `set` never add or drop keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selection {
    entries: BTreeMap<String, bool>,
}

impl Selection {
    /// Every member starts unchecked.
    pub fn for_members(members: &[PartyMember]) -> Self {
        Self {
            entries: members.iter().map(|m| (m.full_name(), false)).collect(),
        }
    }

    pub fn get(&self, full_name: &str) -> Option<bool> {
        self.entries.get(full_name).copied()
    }

    pub fn is_selected(&self, full_name: &str) -> bool {
        self.get(full_name).unwrap_or(false)
    }

    /// Flips one entry. Unknown names are ignored and reported as `None`.
    pub fn toggle(&mut self, full_name: &str) -> Option<bool> {
        let entry = self.entries.get_mut(full_name)?;
        *entry = !*entry;
        Some(*entry)
    }

    /// Returns false when the name is not part of the party.
    pub fn set(&mut self, full_name: &str, attending: bool) -> bool {
        match self.entries.get_mut(full_name) {
            Some(entry) => {
                *entry = attending;
                true
            }
            None => false,
        }
    }

    pub fn selected_count(&self) -> usize {
        self.entries.values().filter(|v| **v).count()
    }

    /// Names currently checked, in key order.
    pub fn selected_names(&self) -> Vec<String> {
        self.entries.iter().filter(|(_, v)| **v).map(|(k, _)| k.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &bool)> {
        self.entries.iter()
    }
}
