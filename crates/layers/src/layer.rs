use std::fmt;

/// Drawable layers the adapter owns on the surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerId {
    /// Full dataset, narrowed by a declarative filter.
    Base,
    /// Capped derived subset; visible only while a filter is active.
    Overlay,
    /// At most one entity: the selected one.
    Highlight,
    UserLocation,
    SearchMarker,
}

impl LayerId {
    pub const ALL: [LayerId; 5] = [
        LayerId::Base,
        LayerId::Overlay,
        LayerId::Highlight,
        LayerId::UserLocation,
        LayerId::SearchMarker,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayerId::Base => "tree-points",
            LayerId::Overlay => "filtered-trees",
            LayerId::Highlight => "highlighted-trees",
            LayerId::UserLocation => "user-location",
            LayerId::SearchMarker => "search-result",
        }
    }

    pub fn source(self) -> SourceId {
        match self {
            LayerId::Base | LayerId::Highlight => SourceId::Entities,
            LayerId::Overlay => SourceId::Overlay,
            LayerId::UserLocation => SourceId::UserLocation,
            LayerId::SearchMarker => SourceId::SearchMarker,
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Data sources backing the layers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceId {
    /// The whole dataset, pushed by `SurfaceAdapter::set_base_data` once loaded.
    Entities,
    Overlay,
    UserLocation,
    SearchMarker,
}

impl SourceId {
    pub fn name(self) -> &'static str {
        match self {
            SourceId::Entities => "trees",
            SourceId::Overlay => "filtered-trees",
            SourceId::UserLocation => "user-location",
            SourceId::SearchMarker => "search-result",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
