use foundation::geo::LatLon;
use lookup::{Candidate, LocationError};
use scene::{AggregateCounts, Entity, Presentation};

/// Shown when the dataset cannot be loaded; the map stays usable without it.
pub const LOAD_FAILED_NOTICE: &str = "Failed to load tree data. Please try again later.";

/// What UI chrome observes from a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Counts double as the category and group option lists.
    DatasetLoaded {
        entities: usize,
        counts: AggregateCounts,
    },
    /// User-visible, non-fatal message.
    Notice(String),
    SubsetChanged {
        shown: usize,
        total_matches: usize,
        overlay_visible: bool,
    },
    CandidatesChanged(Vec<Candidate>),
    CandidateChosen(Candidate),
    /// `entity` is what the detail panel shows; `None` once closed.
    SelectionChanged {
        entity: Option<Entity>,
        presentation: Presentation,
    },
    Located(LatLon),
    LocationFailed(LocationError),
}
