use std::collections::{BTreeMap, BTreeSet};

use foundation::ids::EntityId;
use scene::EntityStore;

use crate::expr::FilterExpr;
use crate::layer::{LayerId, SourceId};
use crate::surface::{CameraMove, Cursor, PointFeature, RenderSurface, SurfaceError};

/// Image the search-result marker layer draws with.
pub const SEARCH_MARKER_IMAGE: &str = "search-pin";

/// In-memory surface that records the last applied state.
///
/// Behaves like a real map engine where it matters to the core: it rejects
/// mutations until marked ready, and refuses marker data while the marker
/// image is still missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySurface {
    ready: bool,
    filters: BTreeMap<LayerId, Option<FilterExpr>>,
    sources: BTreeMap<SourceId, Vec<PointFeature>>,
    hidden: BTreeSet<LayerId>,
    camera: Option<CameraMove>,
    camera_moves: usize,
    cursor: Cursor,
    missing_images: BTreeSet<String>,
    mutations: usize,
}

impl MemorySurface {
    /// A surface that has not finished loading yet.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready() -> Self {
        Self {
            ready: true,
            ..Self::default()
        }
    }

    pub fn with_missing_image(mut self, name: impl Into<String>) -> Self {
        self.missing_images.insert(name.into());
        self
    }

    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub fn load_image(&mut self, name: &str) {
        self.missing_images.remove(name);
    }

    pub fn filter(&self, layer: LayerId) -> Option<&FilterExpr> {
        self.filters.get(&layer).and_then(|f| f.as_ref())
    }

    pub fn source(&self, source: SourceId) -> &[PointFeature] {
        self.sources.get(&source).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_visible(&self, layer: LayerId) -> bool {
        !self.hidden.contains(&layer)
    }

    pub fn camera(&self) -> Option<&CameraMove> {
        self.camera.as_ref()
    }

    pub fn camera_moves(&self) -> usize {
        self.camera_moves
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Number of successful mutations so far.
    pub fn mutations(&self) -> usize {
        self.mutations
    }

    /// Entity ids a layer currently draws.
    pub fn rendered(&self, layer: LayerId, store: &EntityStore) -> Vec<EntityId> {
        if !self.is_visible(layer) {
            return Vec::new();
        }
        match layer {
            LayerId::Base | LayerId::Highlight => {
                let filter = self.filter(layer);
                store
                    .iter()
                    .filter(|e| filter.is_none_or(|f| f.matches(e)))
                    .map(|e| e.id)
                    .collect()
            }
            other => self
                .source(other.source())
                .iter()
                .filter_map(|f| f.id)
                .collect(),
        }
    }

    fn check_ready(&self) -> Result<(), SurfaceError> {
        if self.ready {
            Ok(())
        } else {
            Err(SurfaceError::NotReady)
        }
    }
}

impl RenderSurface for MemorySurface {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn set_filter(
        &mut self,
        layer: LayerId,
        filter: Option<&FilterExpr>,
    ) -> Result<(), SurfaceError> {
        self.check_ready()?;
        self.filters.insert(layer, filter.cloned());
        self.mutations += 1;
        Ok(())
    }

    fn set_source_data(
        &mut self,
        source: SourceId,
        features: &[PointFeature],
    ) -> Result<(), SurfaceError> {
        self.check_ready()?;
        if source == SourceId::SearchMarker
            && !features.is_empty()
            && self.missing_images.contains(SEARCH_MARKER_IMAGE)
        {
            return Err(SurfaceError::ImageNotLoaded(SEARCH_MARKER_IMAGE.to_string()));
        }
        self.sources.insert(source, features.to_vec());
        self.mutations += 1;
        Ok(())
    }

    fn set_visibility(&mut self, layer: LayerId, visible: bool) -> Result<(), SurfaceError> {
        self.check_ready()?;
        if visible {
            self.hidden.remove(&layer);
        } else {
            self.hidden.insert(layer);
        }
        self.mutations += 1;
        Ok(())
    }

    fn fly_to(&mut self, camera: &CameraMove) -> Result<(), SurfaceError> {
        self.check_ready()?;
        self.camera = Some(camera.clone());
        self.camera_moves += 1;
        self.mutations += 1;
        Ok(())
    }

    fn set_cursor(&mut self, cursor: Cursor) -> Result<(), SurfaceError> {
        self.check_ready()?;
        self.cursor = cursor;
        self.mutations += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemorySurface;
    use crate::expr::FilterExpr;
    use crate::layer::LayerId;
    use crate::surface::{RenderSurface, SurfaceError};
    use foundation::{EntityId, LatLon};
    use scene::{Entity, EntityStore};

    #[test]
    fn rejects_mutations_until_ready() {
        let mut s = MemorySurface::new();
        assert_eq!(s.set_visibility(LayerId::Overlay, false), Err(SurfaceError::NotReady));
        s.mark_ready();
        assert!(s.set_visibility(LayerId::Overlay, false).is_ok());
        assert!(!s.is_visible(LayerId::Overlay));
    }

    #[test]
    fn rendered_evaluates_layer_filters() {
        let p = LatLon::new(37.7, -122.4);
        let store = EntityStore::from_entities(vec![
            Entity::new(EntityId(1), "Oak", p),
            Entity::new(EntityId(2), "Pine", p),
        ])
        .unwrap();
        let mut s = MemorySurface::ready();
        assert_eq!(s.rendered(LayerId::Base, &store), vec![EntityId(1), EntityId(2)]);

        let highlight = FilterExpr::highlight(Some(EntityId(2)));
        s.set_filter(LayerId::Highlight, Some(&highlight)).unwrap();
        assert_eq!(s.rendered(LayerId::Highlight, &store), vec![EntityId(2)]);
    }
}
