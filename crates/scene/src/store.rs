use std::collections::HashMap;

use foundation::ids::EntityId;

use crate::counts::AggregateCounts;
use crate::entity::Entity;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate entity id {0}")]
    DuplicateId(EntityId),
}

/// Immutable in-memory dataset.
///
/// Built atomically from a full entity list; there is no way to add, update
/// or remove entities afterwards. Iteration follows load order.
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: Vec<Entity>,
    index: HashMap<EntityId, usize>,
    counts: AggregateCounts,
}

impl EntityStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entities(entities: Vec<Entity>) -> Result<Self, StoreError> {
        let mut index = HashMap::with_capacity(entities.len());
        for (idx, e) in entities.iter().enumerate() {
            if index.insert(e.id, idx).is_some() {
                return Err(StoreError::DuplicateId(e.id));
            }
        }
        let counts = AggregateCounts::from_entities(&entities);
        Ok(Self {
            entities,
            index,
            counts,
        })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|idx| &self.entities[*idx])
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn counts(&self) -> &AggregateCounts {
        &self.counts
    }
}
