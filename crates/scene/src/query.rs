use foundation::ids::EntityId;

use crate::entity::Entity;
use crate::filter::FilterState;
use crate::store::EntityStore;

/// Maximum number of entities in a derived subset.
pub const SUBSET_CAP: usize = 500;

/// Capped set of entities matching the active category/group filters.
///
/// Ordering contract:
/// - `ids` follow entity store order.
/// - Truncation keeps the first `SUBSET_CAP` matches in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedSubset {
    ids: Vec<EntityId>,
    total_matches: usize,
    any_filter_active: bool,
}

impl DerivedSubset {
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Distinguishes "no filter" from "filter matches nothing".
    pub fn any_filter_active(&self) -> bool {
        self.any_filter_active
    }

    /// Number of matches before the cap was applied.
    pub fn total_matches(&self) -> usize {
        self.total_matches
    }

    pub fn is_truncated(&self) -> bool {
        self.total_matches > self.ids.len()
    }

    /// Resolves the subset against the store it was computed from.
    pub fn entities<'a>(&'a self, store: &'a EntityStore) -> impl Iterator<Item = &'a Entity> + 'a {
        self.ids.iter().filter_map(|id| store.get(*id))
    }
}

/// Conjunction of the two optional equality checks; an unset filter matches
/// everything.
pub fn matches(entity: &Entity, category: Option<&str>, group: Option<&str>) -> bool {
    if let Some(c) = category
        && entity.category != c
    {
        return false;
    }
    if let Some(g) = group
        && entity.group.as_deref() != Some(g)
    {
        return false;
    }
    true
}

/// Recomputes the derived subset from scratch.
///
/// Pure function of its inputs. With no category and no group set the result
/// is empty regardless of store size.
pub fn recompute(store: &EntityStore, filter: &FilterState) -> DerivedSubset {
    if !filter.is_any_filter_active() {
        return DerivedSubset::default();
    }

    let (category, group) = (filter.category(), filter.group());
    let mut ids = Vec::new();
    let mut total_matches = 0usize;
    for entity in store.iter() {
        if !matches(entity, category, group) {
            continue;
        }
        total_matches += 1;
        if ids.len() < SUBSET_CAP {
            ids.push(entity.id);
        }
    }

    DerivedSubset {
        ids,
        total_matches,
        any_filter_active: true,
    }
}

#[cfg(test)]
mod tests {
    use super::{SUBSET_CAP, matches, recompute};
    use crate::entity::Entity;
    use crate::filter::FilterState;
    use crate::store::EntityStore;
    use foundation::{EntityId, LatLon};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn tree(id: u64, category: &str, group: Option<&str>) -> Entity {
        let e = Entity::new(EntityId(id), category, LatLon::new(37.76, -122.44));
        match group {
            Some(g) => e.with_group(g),
            None => e,
        }
    }

    #[test]
    fn oak_and_pine_scenario() {
        let store = EntityStore::from_entities(vec![
            tree(1, "Oak", Some("Downtown")),
            tree(2, "Pine", Some("Downtown")),
        ])
        .unwrap();
        let mut filter = FilterState::new();

        filter.set_category(Some("Oak".into()));
        let subset = recompute(&store, &filter);
        assert_eq!(subset.ids(), &[EntityId(1)]);
        assert!(subset.any_filter_active());

        filter.set_category(None);
        let subset = recompute(&store, &filter);
        assert!(subset.is_empty());
        assert!(!subset.any_filter_active());
    }

    #[test]
    fn group_filter_and_conjunction() {
        let store = EntityStore::from_entities(vec![
            tree(1, "Oak", Some("Downtown")),
            tree(2, "Oak", None),
            tree(3, "Pine", Some("Downtown")),
        ])
        .unwrap();
        let mut filter = FilterState::new();
        filter.set_group(Some("Downtown".into()));
        assert_eq!(recompute(&store, &filter).ids(), &[EntityId(1), EntityId(3)]);

        filter.set_category(Some("Oak".into()));
        assert_eq!(recompute(&store, &filter).ids(), &[EntityId(1)]);
    }

    #[test]
    fn unknown_category_yields_active_but_empty_subset() {
        let store = EntityStore::from_entities(vec![tree(1, "Oak", None)]).unwrap();
        let mut filter = FilterState::new();
        filter.set_category(Some("Baobab".into()));
        let subset = recompute(&store, &filter);
        assert!(subset.is_empty());
        assert!(subset.any_filter_active());
    }

    #[test]
    fn truncates_to_first_matches_in_store_order() {
        let entities: Vec<Entity> = (0..1200)
            .map(|i| tree(i, if i % 2 == 0 { "Oak" } else { "Pine" }, None))
            .collect();
        let store = EntityStore::from_entities(entities).unwrap();
        let mut filter = FilterState::new();
        filter.set_category(Some("Oak".into()));

        let subset = recompute(&store, &filter);
        assert_eq!(subset.len(), SUBSET_CAP);
        assert_eq!(subset.total_matches(), 600);
        assert!(subset.is_truncated());
        let expected: Vec<EntityId> = (0..SUBSET_CAP as u64).map(|i| EntityId(i * 2)).collect();
        assert_eq!(subset.ids(), expected.as_slice());
    }

    fn arb_store() -> impl Strategy<Value = EntityStore> {
        let category = prop::sample::select(vec!["Oak", "Pine", "Elm"]);
        let group = prop::option::of(prop::sample::select(vec!["Mission", "Sunset"]));
        prop::collection::vec((category, group), 0..80).prop_map(|rows| {
            let entities = rows
                .into_iter()
                .enumerate()
                .map(|(i, (c, g))| tree(i as u64, c, g))
                .collect();
            EntityStore::from_entities(entities).unwrap()
        })
    }

    fn arb_filter() -> impl Strategy<Value = FilterState> {
        let category = prop::option::of(prop::sample::select(vec!["Oak", "Pine", "Baobab"]));
        let group = prop::option::of(prop::sample::select(vec!["Mission", "Sunset", "Nowhere"]));
        (category, group).prop_map(|(c, g)| {
            let mut f = FilterState::new();
            f.set_category(c.map(str::to_string));
            f.set_group(g.map(str::to_string));
            f
        })
    }

    proptest! {
        #[test]
        fn subset_is_empty_when_no_filter_is_active(store in arb_store(), filter in arb_filter()) {
            let subset = recompute(&store, &filter);
            prop_assert_eq!(subset.any_filter_active(), filter.is_any_filter_active());
            if !filter.is_any_filter_active() {
                prop_assert!(subset.is_empty());
            }
        }

        #[test]
        fn subset_members_satisfy_filter(store in arb_store(), filter in arb_filter()) {
            let subset = recompute(&store, &filter);
            for e in subset.entities(&store) {
                prop_assert!(filter.category().is_none_or(|c| e.category == c));
                prop_assert!(filter.group().is_none_or(|g| e.group.as_deref() == Some(g)));
            }
        }

        #[test]
        fn subset_is_complete_below_cap(store in arb_store(), filter in arb_filter()) {
            let subset = recompute(&store, &filter);
            prop_assert!(subset.len() <= SUBSET_CAP);
            if filter.is_any_filter_active() {
                let expected: Vec<EntityId> = store
                    .iter()
                    .filter(|e| matches(e, filter.category(), filter.group()))
                    .map(|e| e.id)
                    .collect();
                prop_assert_eq!(subset.ids(), expected.as_slice());
            }
        }
    }
}
