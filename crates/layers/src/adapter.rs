use std::collections::BTreeSet;

use foundation::geo::LatLon;
use foundation::ids::EntityId;
use tracing::{debug, warn};

use crate::expr::FilterExpr;
use crate::layer::{LayerId, SourceId};
use crate::surface::{CameraMove, Cursor, PointFeature, RenderSurface, SurfaceError};

/// Independently applied pieces of surface state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    BaseData,
    BaseFilter,
    OverlayData,
    OverlayVisibility,
    Highlight,
    UserLocation,
    SearchMarker,
    Cursor,
}

const ALL_SLOTS: [Slot; 8] = [
    Slot::BaseData,
    Slot::BaseFilter,
    Slot::OverlayData,
    Slot::OverlayVisibility,
    Slot::Highlight,
    Slot::UserLocation,
    Slot::SearchMarker,
    Slot::Cursor,
];

#[derive(Debug, Clone, PartialEq)]
struct Desired {
    base: Vec<PointFeature>,
    base_filter: Option<FilterExpr>,
    overlay: Vec<PointFeature>,
    overlay_visible: bool,
    highlight: FilterExpr,
    user_location: Option<LatLon>,
    search_marker: Option<LatLon>,
    cursor: Cursor,
}

impl Default for Desired {
    fn default() -> Self {
        Self {
            base: Vec::new(),
            base_filter: None,
            overlay: Vec::new(),
            overlay_visible: false,
            highlight: FilterExpr::highlight(None),
            user_location: None,
            search_marker: None,
            cursor: Cursor::Default,
        }
    }
}

/// Sole owner of the rendering surface.
///
/// Callers describe the state they want; the adapter pushes only slots whose
/// desired value changed. Before the surface is ready, or after a failed
/// push, slots stay dirty and are flushed on the next `on_ready`,
/// `on_image_loaded` or state change. Surface errors are logged, never
/// returned.
#[derive(Debug)]
pub struct SurfaceAdapter<S> {
    surface: S,
    ready: bool,
    desired: Desired,
    dirty: BTreeSet<Slot>,
    pending_camera: Option<CameraMove>,
}

impl<S: RenderSurface> SurfaceAdapter<S> {
    pub fn new(surface: S) -> Self {
        let ready = surface.is_ready();
        let mut adapter = Self {
            surface,
            ready,
            desired: Desired::default(),
            dirty: ALL_SLOTS.into_iter().collect(),
            pending_camera: None,
        };
        adapter.flush();
        adapter
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Read-only view of the surface, for inspection.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// True while some state has not reached the surface yet.
    pub fn has_pending(&self) -> bool {
        !self.dirty.is_empty() || self.pending_camera.is_some()
    }

    /// Replaces the full-dataset source drawn by the base layer.
    pub fn set_base_data(&mut self, features: Vec<PointFeature>) {
        if self.desired.base != features {
            self.desired.base = features;
            self.dirty.insert(Slot::BaseData);
        }
        self.flush();
    }

    pub fn apply_filter_expression(&mut self, category: Option<&str>, group: Option<&str>) {
        let expr = FilterExpr::for_filters(category, group);
        if self.desired.base_filter != expr {
            self.desired.base_filter = expr;
            self.dirty.insert(Slot::BaseFilter);
        }
        self.flush();
    }

    /// Replaces the overlay source wholesale and shows it when `visible`.
    pub fn update_overlay_data(&mut self, features: Vec<PointFeature>, visible: bool) {
        if self.desired.overlay != features {
            self.desired.overlay = features;
            self.dirty.insert(Slot::OverlayData);
        }
        if self.desired.overlay_visible != visible {
            self.desired.overlay_visible = visible;
            self.dirty.insert(Slot::OverlayVisibility);
        }
        self.flush();
    }

    pub fn set_highlight(&mut self, id: Option<EntityId>) {
        let expr = FilterExpr::highlight(id);
        if self.desired.highlight != expr {
            self.desired.highlight = expr;
            self.dirty.insert(Slot::Highlight);
        }
        self.flush();
    }

    pub fn set_user_location(&mut self, position: Option<LatLon>) {
        if self.desired.user_location != position {
            self.desired.user_location = position;
            self.dirty.insert(Slot::UserLocation);
        }
        self.flush();
    }

    pub fn set_search_marker(&mut self, position: Option<LatLon>) {
        if self.desired.search_marker != position {
            self.desired.search_marker = position;
            self.dirty.insert(Slot::SearchMarker);
        }
        self.flush();
    }

    pub fn set_cursor(&mut self, cursor: Cursor) {
        if self.desired.cursor != cursor {
            self.desired.cursor = cursor;
            self.dirty.insert(Slot::Cursor);
        }
        self.flush();
    }

    /// Last call wins; a move requested before ready replaces any earlier
    /// pending move and runs once the surface is ready.
    pub fn move_camera(&mut self, camera: CameraMove) {
        self.pending_camera = Some(camera);
        self.flush();
    }

    pub fn on_ready(&mut self) {
        if !self.ready {
            debug!("surface ready");
        }
        self.ready = true;
        self.flush();
    }

    pub fn on_image_loaded(&mut self, name: &str) {
        debug!(image = name, "surface image loaded");
        self.flush();
    }

    /// Clears predicates, hides the overlay and hands the surface back.
    pub fn teardown(mut self) -> S {
        if self.ready {
            let cleared = FilterExpr::highlight(None);
            let results = [
                self.surface.set_filter(LayerId::Base, None),
                self.surface.set_filter(LayerId::Highlight, Some(&cleared)),
                self.surface.set_visibility(LayerId::Overlay, false),
                self.surface.set_source_data(SourceId::Overlay, &[]),
            ];
            for err in results.into_iter().filter_map(Result::err) {
                warn!(%err, "surface teardown step failed");
            }
        }
        self.surface
    }

    fn flush(&mut self) {
        if !self.ready {
            return;
        }

        let slots: Vec<Slot> = self.dirty.iter().copied().collect();
        for slot in slots {
            match self.push(slot) {
                Ok(()) => {
                    self.dirty.remove(&slot);
                }
                Err(err) => log_deferred(slot, &err),
            }
        }

        if let Some(camera) = self.pending_camera.take() {
            if let Err(err) = self.surface.fly_to(&camera) {
                debug!(%err, "camera move deferred");
                self.pending_camera = Some(camera);
            }
        }
    }

    fn push(&mut self, slot: Slot) -> Result<(), SurfaceError> {
        let d = &self.desired;
        match slot {
            Slot::BaseData => self.surface.set_source_data(SourceId::Entities, &d.base),
            Slot::BaseFilter => self.surface.set_filter(LayerId::Base, d.base_filter.as_ref()),
            Slot::OverlayData => self.surface.set_source_data(SourceId::Overlay, &d.overlay),
            Slot::OverlayVisibility => {
                self.surface.set_visibility(LayerId::Overlay, d.overlay_visible)
            }
            Slot::Highlight => self.surface.set_filter(LayerId::Highlight, Some(&d.highlight)),
            Slot::UserLocation => {
                let features: Vec<PointFeature> =
                    d.user_location.into_iter().map(PointFeature::marker).collect();
                self.surface.set_source_data(SourceId::UserLocation, &features)
            }
            Slot::SearchMarker => {
                let features: Vec<PointFeature> =
                    d.search_marker.into_iter().map(PointFeature::marker).collect();
                self.surface.set_source_data(SourceId::SearchMarker, &features)
            }
            Slot::Cursor => self.surface.set_cursor(d.cursor),
        }
    }
}

fn log_deferred(slot: Slot, err: &SurfaceError) {
    match err {
        SurfaceError::NotReady | SurfaceError::ImageNotLoaded(_) => {
            debug!(?slot, %err, "surface update deferred");
        }
        _ => warn!(?slot, %err, "surface update failed; will retry"),
    }
}
