use foundation::geo::LatLon;
use foundation::ids::EntityId;

/// Descriptive attributes the core never interprets.
///
/// Kept as ordered key/value pairs so the detail panel can render them in
/// source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    pub pairs: Vec<(String, String)>,
}

impl Properties {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// One point record of the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub category: String,
    pub group: Option<String>,
    pub position: LatLon,
    /// Passed verbatim to the renderer.
    pub color: String,
    pub properties: Properties,
}

impl Entity {
    pub fn new(id: EntityId, category: impl Into<String>, position: LatLon) -> Self {
        Self {
            id,
            category: category.into(),
            group: None,
            position,
            color: String::new(),
            properties: Properties::default(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }
}
