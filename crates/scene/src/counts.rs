use std::collections::BTreeMap;

use crate::entity::Entity;

/// Per-category and per-group entity counts over the whole dataset.
///
/// Computed once at load time. Counts deliberately ignore the active filter.
/// Empty categories and missing groups are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateCounts {
    categories: BTreeMap<String, usize>,
    groups: BTreeMap<String, usize>,
}

impl AggregateCounts {
    pub fn from_entities<'a>(entities: impl IntoIterator<Item = &'a Entity>) -> Self {
        let mut out = Self::default();
        for e in entities {
            if !e.category.is_empty() {
                *out.categories.entry(e.category.clone()).or_insert(0) += 1;
            }
            if let Some(group) = e.group.as_deref()
                && !group.is_empty()
            {
                *out.groups.entry(group.to_string()).or_insert(0) += 1;
            }
        }
        out
    }

    pub fn category_count(&self, category: &str) -> usize {
        self.categories.get(category).copied().unwrap_or(0)
    }

    pub fn group_count(&self, group: &str) -> usize {
        self.groups.get(group).copied().unwrap_or(0)
    }

    /// Categories in ascending name order with their counts.
    pub fn categories(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.categories.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Groups in ascending name order with their counts.
    pub fn groups(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.groups.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }
}
