use std::fmt;

/// Stable identifier of a dataset entity.
///
/// Ids come straight from the startup data file and are unique across the
/// entity store. They never change during (or across) sessions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

impl EntityId {
    pub fn new(n: u64) -> Self {
        EntityId(n)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
