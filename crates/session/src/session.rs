use foundation::geo::LatLon;
use foundation::ids::EntityId;
use foundation::time::Time;
use formats::LoadError;
use layers::{CameraMove, Cursor, PointFeature, RenderSurface, SurfaceAdapter, SurfaceEvent};
use lookup::{
    AddressSearch, Candidate, GeocodeRequest, Geolocation, LocateOutcome, LocationError,
    LookupError, SearchSettings,
};
use runtime::event_bus::{Event, EventBus};
use runtime::ticket::Ticket;
use scene::{
    AggregateCounts, DerivedSubset, Entity, EntityStore, FilterState, Layout, Presentation,
    SelectionEffect, SelectionLifecycle, Transition, recompute,
};
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::events::{LOAD_FAILED_NOTICE, SessionEvent};

/// Central state container of one exploration session.
///
/// Every user action and async completion goes through a method here. Each
/// method updates the filter state first, then recomputes whatever depends
/// on it and pushes the result to the surface through the adapter.
#[derive(Debug)]
pub struct Session<S> {
    config: SessionConfig,
    store: EntityStore,
    filter: FilterState,
    subset: DerivedSubset,
    selection: SelectionLifecycle,
    search: AddressSearch,
    geolocation: Geolocation,
    adapter: SurfaceAdapter<S>,
    zoom: f64,
    events: EventBus<SessionEvent>,
}

impl<S: RenderSurface> Session<S> {
    /// The panel layout is fixed here from the viewport width.
    pub fn new(surface: S, config: SessionConfig, viewport_width_px: f64) -> Self {
        let layout = Layout::for_viewport_width(viewport_width_px, config.compact_below_px);
        let search = AddressSearch::new(SearchSettings {
            debounce: config.search_debounce,
            bounds: config.search_bounds,
            limit: config.search_limit,
        });
        let mut adapter = SurfaceAdapter::new(surface);
        adapter.move_camera(
            CameraMove::to(config.initial_center, config.initial_zoom).with_duration_ms(0),
        );
        info!(?layout, "session started");

        Self {
            zoom: config.initial_zoom,
            config,
            store: EntityStore::empty(),
            filter: FilterState::new(),
            subset: DerivedSubset::default(),
            selection: SelectionLifecycle::new(layout),
            search,
            geolocation: Geolocation::new(),
            adapter,
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn layout(&self) -> Layout {
        self.selection.layout()
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn subset(&self) -> &DerivedSubset {
        &self.subset
    }

    /// Whole-dataset counts; also the filter option lists.
    pub fn counts(&self) -> &AggregateCounts {
        self.store.counts()
    }

    pub fn presentation(&self) -> Presentation {
        self.selection.state()
    }

    pub fn selected_entity(&self) -> Option<&Entity> {
        self.selection.selected().and_then(|id| self.store.get(id))
    }

    pub fn candidates(&self) -> &[Candidate] {
        self.search.candidates()
    }

    pub fn candidates_open(&self) -> bool {
        self.search.is_open()
    }

    pub fn user_location(&self) -> Option<LatLon> {
        self.geolocation.position()
    }

    /// Last zoom level reported by the surface.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn surface(&self) -> &S {
        self.adapter.surface()
    }

    pub fn drain_events(&mut self) -> Vec<Event<SessionEvent>> {
        self.events.drain()
    }

    pub fn on_dataset_loaded(&mut self, result: Result<EntityStore, LoadError>) {
        match result {
            Ok(store) => {
                info!(entities = store.len(), "dataset loaded");
                self.store = store;
                let features = self.store.iter().map(PointFeature::from_entity).collect();
                self.adapter.set_base_data(features);
                self.events.emit(SessionEvent::DatasetLoaded {
                    entities: self.store.len(),
                    counts: self.counts().clone(),
                });
                if let Some(id) = self.selection.selected()
                    && !self.store.contains(id)
                {
                    let transition = self.selection.close();
                    self.apply(transition);
                }
                self.refresh();
            }
            Err(err) => {
                error!(%err, "failed to load dataset");
                self.events.emit(SessionEvent::Notice(LOAD_FAILED_NOTICE.to_string()));
            }
        }
    }

    pub fn set_category(&mut self, category: Option<String>) {
        if self.filter.set_category(category) {
            self.refresh();
        }
    }

    pub fn set_group(&mut self, group: Option<String>) {
        if self.filter.set_group(group) {
            self.refresh();
        }
    }

    /// Records the typed text and (re)starts the search debounce.
    pub fn set_address_query(&mut self, now: Time, query: &str) {
        if !self.filter.set_address_query(query) {
            return;
        }
        let had_candidates = !self.search.candidates().is_empty();
        self.search.query_changed(now, query);
        if had_candidates && self.search.candidates().is_empty() {
            self.events.emit(SessionEvent::CandidatesChanged(Vec::new()));
        }
    }

    pub fn search_deadline(&self) -> Option<Time> {
        self.search.deadline()
    }

    /// Returns the geocoding request to run once the debounce window elapsed.
    pub fn poll_search(&mut self, now: Time) -> Option<(Ticket, GeocodeRequest)> {
        self.search.poll(now)
    }

    pub fn on_geocode_result(&mut self, ticket: Ticket, result: Result<Vec<Candidate>, LookupError>) {
        if self.search.accept(ticket, self.filter.address_query(), result) {
            self.events.emit(SessionEvent::CandidatesChanged(
                self.search.candidates().to_vec(),
            ));
        }
    }

    /// Returns false when `index` is not in the candidate list.
    pub fn choose_candidate(&mut self, index: usize) -> bool {
        let Some(candidate) = self.search.choose(index) else {
            warn!(index, "no such address candidate");
            return false;
        };
        self.filter.set_address_query(candidate.label.clone());
        self.adapter.set_search_marker(Some(candidate.position));
        self.adapter.move_camera(self.focus_on(candidate.position));
        self.events.emit(SessionEvent::CandidateChosen(candidate));
        true
    }

    /// Returns the ticket to resolve, or `None` if a request is already pending.
    pub fn request_location(&mut self) -> Option<Ticket> {
        self.geolocation.request()
    }

    pub fn on_location_result(&mut self, ticket: Ticket, result: Result<LatLon, LocationError>) {
        match self.geolocation.resolve(ticket, result) {
            LocateOutcome::Located(position) => {
                self.adapter.set_user_location(Some(position));
                self.adapter.move_camera(self.focus_on(position));
                self.events.emit(SessionEvent::Located(position));
            }
            LocateOutcome::Failed(err) => {
                self.events.emit(SessionEvent::LocationFailed(err));
            }
            LocateOutcome::Ignored => debug!(?ticket, "ignoring unexpected location result"),
        }
    }

    pub fn on_surface_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Ready => self.adapter.on_ready(),
            SurfaceEvent::ImageLoaded(name) => self.adapter.on_image_loaded(&name),
            SurfaceEvent::Pick(id) => self.pick(id),
            SurfaceEvent::PointerMove { over_entity } => self.adapter.set_cursor(if over_entity {
                Cursor::Pointer
            } else {
                Cursor::Default
            }),
            SurfaceEvent::ZoomChanged(zoom) => self.zoom = zoom,
        }
    }

    /// Unknown ids are ignored.
    pub fn pick(&mut self, id: EntityId) {
        if !self.store.contains(id) {
            warn!(%id, "pick of unknown entity ignored");
            return;
        }
        let transition = self.selection.pick(id);
        self.apply(transition);
    }

    pub fn dismiss(&mut self) {
        let transition = self.selection.dismiss();
        self.apply(transition);
    }

    pub fn show_more(&mut self) {
        let transition = self.selection.show_more();
        self.apply(transition);
    }

    pub fn close_selection(&mut self) {
        let transition = self.selection.close();
        self.apply(transition);
    }

    /// Filters to the selected entity's category. Returns false without a
    /// selection.
    pub fn show_only_category(&mut self) -> bool {
        let Some(category) = self
            .selected_entity()
            .map(|e| e.category.clone())
            .filter(|c| !c.is_empty())
        else {
            return false;
        };
        self.set_category(Some(category));
        let transition = self.selection.filter_shortcut();
        self.apply(transition);
        true
    }

    /// Filters to the selected entity's group. Returns false when there is no
    /// selection or the entity has no group.
    pub fn show_only_group(&mut self) -> bool {
        let Some(group) = self.selected_entity().and_then(|e| e.group.clone()) else {
            return false;
        };
        self.set_group(Some(group));
        let transition = self.selection.filter_shortcut();
        self.apply(transition);
        true
    }

    /// Clears every predicate the session installed and returns the surface.
    pub fn teardown(self) -> S {
        info!("session torn down");
        self.adapter.teardown()
    }

    fn refresh(&mut self) {
        self.adapter
            .apply_filter_expression(self.filter.category(), self.filter.group());
        let subset = recompute(&self.store, &self.filter);
        let features = subset
            .entities(&self.store)
            .map(PointFeature::from_entity)
            .collect();
        self.adapter
            .update_overlay_data(features, subset.any_filter_active());
        if subset.is_truncated() {
            debug!(
                shown = subset.len(),
                total = subset.total_matches(),
                "overlay truncated"
            );
        }

        if subset != self.subset {
            self.events.emit(SessionEvent::SubsetChanged {
                shown: subset.len(),
                total_matches: subset.total_matches(),
                overlay_visible: subset.any_filter_active(),
            });
            self.subset = subset;
        }
    }

    fn apply(&mut self, transition: Transition) {
        for effect in &transition.effects {
            match *effect {
                SelectionEffect::Highlight(id) => self.adapter.set_highlight(id),
                SelectionEffect::FocusCamera(id) => {
                    if let Some(position) = self.store.get(id).map(|e| e.position) {
                        let offset = match self.selection.layout() {
                            Layout::Compact => self.config.compact_focus_offset_px,
                            Layout::Wide => self.config.wide_focus_offset_px,
                        };
                        let camera = self.focus_on(position).with_offset(offset).essential();
                        self.adapter.move_camera(camera);
                    }
                }
            }
        }
        self.filter.set_selected(transition.selected);
        if transition.changed() {
            let entity = transition.selected.and_then(|id| self.store.get(id).cloned());
            self.events.emit(SessionEvent::SelectionChanged {
                entity,
                presentation: transition.to,
            });
        }
    }

    fn focus_on(&self, position: LatLon) -> CameraMove {
        CameraMove::to(position, self.config.focus_zoom)
            .with_duration_ms(self.config.fly_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::config::SessionConfig;
    use crate::events::{LOAD_FAILED_NOTICE, SessionEvent};
    use foundation::{EntityId, LatLon, Time};
    use formats::LoadError;
    use layers::{Cursor, FilterExpr, LayerId, MemorySurface, SourceId, SurfaceEvent};
    use lookup::{Candidate, LocationError};
    use pretty_assertions::assert_eq;
    use scene::{Entity, EntityStore, Presentation, StoreError};

    const WIDE: f64 = 1280.0;
    const COMPACT: f64 = 390.0;

    fn tree(id: u64, species: &str, group: &str, lat: f64) -> Entity {
        Entity::new(EntityId(id), species, LatLon::new(lat, -122.43)).with_group(group)
    }

    fn store() -> EntityStore {
        EntityStore::from_entities(vec![
            tree(1, "Oak", "Mission", 37.75),
            tree(2, "Pine", "Sunset", 37.76),
            tree(3, "Oak", "Sunset", 37.77),
        ])
        .unwrap()
    }

    fn loaded(width: f64) -> Session<MemorySurface> {
        let mut session = Session::new(MemorySurface::ready(), SessionConfig::default(), width);
        session.on_dataset_loaded(Ok(store()));
        session.drain_events();
        session
    }

    fn payloads(session: &mut Session<MemorySurface>) -> Vec<SessionEvent> {
        session.drain_events().into_iter().map(|e| e.payload).collect()
    }

    fn overlay_ids(session: &Session<MemorySurface>) -> Vec<EntityId> {
        session
            .surface()
            .source(SourceId::Overlay)
            .iter()
            .filter_map(|f| f.id)
            .collect()
    }

    #[test]
    fn category_and_group_filters_drive_layers() {
        let mut s = loaded(WIDE);
        assert!(!s.surface().is_visible(LayerId::Overlay));
        assert_eq!(s.surface().source(SourceId::Entities).len(), 3);

        s.set_category(Some("Oak".into()));
        assert_eq!(overlay_ids(&s), vec![EntityId(1), EntityId(3)]);
        assert!(s.surface().is_visible(LayerId::Overlay));
        assert_eq!(
            s.surface().filter(LayerId::Base),
            FilterExpr::for_filters(Some("Oak"), None).as_ref()
        );
        assert_eq!(s.surface().rendered(LayerId::Base, s.store()), vec![EntityId(1), EntityId(3)]);

        s.set_group(Some("Sunset".into()));
        assert_eq!(overlay_ids(&s), vec![EntityId(3)]);

        s.set_category(None);
        s.set_group(None);
        assert!(overlay_ids(&s).is_empty());
        assert!(!s.surface().is_visible(LayerId::Overlay));
        assert_eq!(s.surface().filter(LayerId::Base), None);
    }

    #[test]
    fn subset_change_is_reported_once() {
        let mut s = loaded(WIDE);
        s.set_category(Some("Pine".into()));
        s.set_category(Some("Pine".into()));
        assert_eq!(
            payloads(&mut s),
            vec![SessionEvent::SubsetChanged {
                shown: 1,
                total_matches: 1,
                overlay_visible: true
            }]
        );
    }

    #[test]
    fn load_failure_leaves_an_empty_usable_map() {
        let mut s = Session::new(MemorySurface::ready(), SessionConfig::default(), WIDE);
        s.on_dataset_loaded(Err(LoadError::Status(500)));
        assert_eq!(
            payloads(&mut s),
            vec![SessionEvent::Notice(LOAD_FAILED_NOTICE.to_string())]
        );
        assert!(s.store().is_empty());

        s.set_category(Some("Oak".into()));
        assert!(s.subset().is_empty());
        assert!(s.subset().any_filter_active());
        s.pick(EntityId(1));
        assert_eq!(s.presentation(), Presentation::Closed);
    }

    #[test]
    fn compact_pick_dismiss_dismiss() {
        let mut s = loaded(COMPACT);
        s.pick(EntityId(2));
        assert_eq!(s.presentation(), Presentation::Expanded);
        assert_eq!(s.filter().selected(), Some(EntityId(2)));
        assert_eq!(
            s.surface().rendered(LayerId::Highlight, s.store()),
            vec![EntityId(2)]
        );
        let camera = s.surface().camera().unwrap();
        assert_eq!(camera.center, LatLon::new(37.76, -122.43));
        assert_eq!(camera.zoom, 16.0);
        assert_eq!(camera.offset_px, SessionConfig::default().compact_focus_offset_px);
        assert!(camera.essential);

        s.dismiss();
        assert_eq!(s.presentation(), Presentation::Collapsed);
        assert_eq!(s.filter().selected(), Some(EntityId(2)));

        s.dismiss();
        assert_eq!(s.presentation(), Presentation::Closed);
        assert_eq!(s.filter().selected(), None);
        assert_eq!(
            s.surface().filter(LayerId::Highlight),
            Some(&FilterExpr::highlight(None))
        );
        assert!(s.surface().rendered(LayerId::Highlight, s.store()).is_empty());
    }

    #[test]
    fn picking_another_entity_moves_the_single_highlight() {
        let mut s = loaded(WIDE);
        s.on_surface_event(SurfaceEvent::Pick(EntityId(1)));
        s.on_surface_event(SurfaceEvent::Pick(EntityId(3)));
        assert_eq!(s.selected_entity().map(|e| e.id), Some(EntityId(3)));
        assert_eq!(
            s.surface().rendered(LayerId::Highlight, s.store()),
            vec![EntityId(3)]
        );
        assert_eq!(
            s.surface().camera().map(|c| c.offset_px),
            Some(SessionConfig::default().wide_focus_offset_px)
        );
    }

    #[test]
    fn events_carry_counts_and_selected_entity() {
        let mut s = Session::new(MemorySurface::ready(), SessionConfig::default(), COMPACT);
        s.on_dataset_loaded(Ok(store()));
        let events = payloads(&mut s);
        let Some(SessionEvent::DatasetLoaded { entities, counts }) = events.first() else {
            panic!("expected DatasetLoaded first, got {events:?}");
        };
        assert_eq!(*entities, 3);
        assert_eq!(counts.categories().collect::<Vec<_>>(), vec![("Oak", 2), ("Pine", 1)]);
        assert_eq!(counts, s.counts());

        s.pick(EntityId(3));
        s.dismiss();
        s.dismiss();
        assert_eq!(
            payloads(&mut s),
            vec![
                SessionEvent::SelectionChanged {
                    entity: Some(tree(3, "Oak", "Sunset", 37.77)),
                    presentation: Presentation::Expanded,
                },
                SessionEvent::SelectionChanged {
                    entity: Some(tree(3, "Oak", "Sunset", 37.77)),
                    presentation: Presentation::Collapsed,
                },
                SessionEvent::SelectionChanged {
                    entity: None,
                    presentation: Presentation::Closed,
                },
            ]
        );
    }

    #[test]
    fn unknown_pick_is_ignored() {
        let mut s = loaded(WIDE);
        s.pick(EntityId(1));
        s.drain_events();
        s.pick(EntityId(99));
        assert_eq!(s.filter().selected(), Some(EntityId(1)));
        assert!(payloads(&mut s).is_empty());
    }

    #[test]
    fn compact_filter_shortcut_closes_panel() {
        let mut s = loaded(COMPACT);
        s.pick(EntityId(3));
        assert!(s.show_only_group());
        assert_eq!(s.filter().group(), Some("Sunset"));
        assert_eq!(s.filter().category(), None);
        assert_eq!(overlay_ids(&s), vec![EntityId(2), EntityId(3)]);
        assert_eq!(s.presentation(), Presentation::Closed);
        assert_eq!(s.filter().selected(), None);
        assert!(!s.show_only_category());
    }

    #[test]
    fn wide_filter_shortcut_keeps_panel() {
        let mut s = loaded(WIDE);
        s.pick(EntityId(1));
        assert!(s.show_only_category());
        assert_eq!(s.filter().category(), Some("Oak"));
        assert_eq!(s.presentation(), Presentation::Expanded);
        assert_eq!(s.filter().selected(), Some(EntityId(1)));
    }

    #[test]
    fn group_shortcut_needs_a_group() {
        let mut s = Session::new(MemorySurface::ready(), SessionConfig::default(), WIDE);
        let lone = Entity::new(EntityId(7), "Elm", LatLon::new(37.7, -122.4));
        s.on_dataset_loaded(Ok(EntityStore::from_entities(vec![lone]).unwrap()));
        s.pick(EntityId(7));
        assert!(!s.show_only_group());
        assert_eq!(s.filter().group(), None);
    }

    #[test]
    fn chosen_candidate_marks_and_flies_without_new_search() {
        let mut s = loaded(WIDE);
        s.set_address_query(Time(0), "Market");
        assert_eq!(s.search_deadline(), Some(Time(300)));
        let (ticket, request) = s.poll_search(Time(300)).unwrap();
        assert_eq!(request.query, "Market");
        assert_eq!(request.limit, 5);

        let market = Candidate::new("Market St, San Francisco", LatLon::new(37.79, -122.40));
        s.on_geocode_result(ticket, Ok(vec![market.clone()]));
        assert!(s.candidates_open());

        assert!(s.choose_candidate(0));
        assert_eq!(s.filter().address_query(), "Market St, San Francisco");
        assert_eq!(s.search_deadline(), None);
        assert!(!s.candidates_open());
        assert_eq!(s.surface().source(SourceId::SearchMarker).len(), 1);
        let camera = s.surface().camera().unwrap();
        assert_eq!((camera.center, camera.zoom), (market.position, 16.0));
        assert_eq!(
            payloads(&mut s),
            vec![
                SessionEvent::CandidatesChanged(vec![market.clone()]),
                SessionEvent::CandidateChosen(market),
            ]
        );
    }

    #[test]
    fn response_for_edited_query_is_dropped() {
        let mut s = loaded(WIDE);
        s.set_address_query(Time(0), "Mark");
        let (ticket, _) = s.poll_search(Time(300)).unwrap();
        s.set_address_query(Time(320), "Market");
        s.on_geocode_result(ticket, Ok(vec![Candidate::new("Mark Ln", LatLon::new(37.7, -122.4))]));
        assert!(s.candidates().is_empty());
        assert_eq!(s.search_deadline(), Some(Time(620)));
    }

    #[test]
    fn denied_geolocation_keeps_prior_state() {
        let mut s = loaded(WIDE);
        let moves = s.surface().camera_moves();
        let ticket = s.request_location().unwrap();
        assert_eq!(s.request_location(), None);

        s.on_location_result(ticket, Err(LocationError::permission_denied()));
        let events = payloads(&mut s);
        assert_eq!(events, vec![SessionEvent::LocationFailed(LocationError::permission_denied())]);
        let SessionEvent::LocationFailed(err) = &events[0] else {
            unreachable!()
        };
        assert_eq!(err.code, 1);
        assert_eq!(s.user_location(), None);
        assert!(s.surface().source(SourceId::UserLocation).is_empty());
        assert_eq!(s.surface().camera_moves(), moves);
    }

    #[test]
    fn geolocation_success_places_marker_and_flies() {
        let mut s = loaded(WIDE);
        let here = LatLon::new(37.78, -122.41);
        let ticket = s.request_location().unwrap();
        s.on_location_result(ticket, Ok(here));
        assert_eq!(s.user_location(), Some(here));
        assert_eq!(s.surface().source(SourceId::UserLocation).len(), 1);
        assert_eq!(s.surface().camera().map(|c| c.center), Some(here));
    }

    #[test]
    fn pointer_and_zoom_events() {
        let mut s = loaded(WIDE);
        s.on_surface_event(SurfaceEvent::PointerMove { over_entity: true });
        assert_eq!(s.surface().cursor(), Cursor::Pointer);
        s.on_surface_event(SurfaceEvent::PointerMove { over_entity: false });
        assert_eq!(s.surface().cursor(), Cursor::Default);
        s.on_surface_event(SurfaceEvent::ZoomChanged(14.25));
        assert_eq!(s.zoom(), 14.25);
    }

    #[test]
    fn teardown_clears_installed_state() {
        let mut s = loaded(WIDE);
        s.set_category(Some("Oak".into()));
        s.pick(EntityId(1));
        let surface = s.teardown();
        assert_eq!(surface.filter(LayerId::Base), None);
        assert_eq!(surface.filter(LayerId::Highlight), Some(&FilterExpr::highlight(None)));
        assert!(!surface.is_visible(LayerId::Overlay));
    }

    #[test]
    fn duplicate_ids_fail_the_load() {
        let err = EntityStore::from_entities(vec![tree(1, "Oak", "Mission", 37.7), tree(1, "Elm", "Mission", 37.7)])
            .unwrap_err();
        let mut s = Session::new(MemorySurface::ready(), SessionConfig::default(), WIDE);
        s.on_dataset_loaded(Err(LoadError::Store(err)));
        assert!(matches!(payloads(&mut s).as_slice(), [SessionEvent::Notice(_)]));
        assert!(matches!(
            EntityStore::from_entities(vec![tree(4, "Oak", "M", 37.7), tree(4, "Oak", "M", 37.7)]),
            Err(StoreError::DuplicateId(EntityId(4)))
        ));
    }
}
