use foundation::geo::LatLon;
use foundation::ids::EntityId;
use scene::Entity;

use crate::expr::FilterExpr;
use crate::layer::{LayerId, SourceId};

/// One drawable point pushed into a source.
#[derive(Debug, Clone, PartialEq)]
pub struct PointFeature {
    pub id: Option<EntityId>,
    pub position: LatLon,
    pub color: Option<String>,
}

impl PointFeature {
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            id: Some(entity.id),
            position: entity.position,
            color: Some(entity.color.clone()),
        }
    }

    /// Anonymous single-point marker (user position, search result).
    pub fn marker(position: LatLon) -> Self {
        Self {
            id: None,
            position,
            color: None,
        }
    }
}

/// Animated camera transition.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraMove {
    pub center: LatLon,
    pub zoom: f64,
    pub duration_ms: u64,
    /// Screen-space shift of the target so panels do not cover it.
    pub offset_px: [f64; 2],
    /// Run even when the user prefers reduced motion.
    pub essential: bool,
}

impl CameraMove {
    pub fn to(center: LatLon, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            duration_ms: 1000,
            offset_px: [0.0, 0.0],
            essential: false,
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_offset(mut self, offset_px: [f64; 2]) -> Self {
        self.offset_px = offset_px;
        self
    }

    pub fn essential(mut self) -> Self {
        self.essential = true;
        self
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

/// Input and lifecycle events emitted by the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// Style and layers are loaded; mutations can now be applied.
    Ready,
    ImageLoaded(String),
    /// An entity on the base layer was clicked/tapped.
    Pick(EntityId),
    PointerMove { over_entity: bool },
    ZoomChanged(f64),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("surface is not ready")]
    NotReady,
    #[error("layer {0} does not exist")]
    MissingLayer(LayerId),
    #[error("source {0} does not exist")]
    MissingSource(SourceId),
    #[error("image {0} is not loaded")]
    ImageNotLoaded(String),
    #[error("surface backend error: {0}")]
    Backend(String),
}

/// Imperative map engine.
///
/// Every method is a "set to X" command; calling one twice with the same
/// argument must leave the surface in the same state as calling it once.
/// Only `SurfaceAdapter` is expected to hold an implementation.
pub trait RenderSurface {
    fn is_ready(&self) -> bool;

    /// `None` removes the predicate so the whole source is drawn.
    fn set_filter(&mut self, layer: LayerId, filter: Option<&FilterExpr>)
        -> Result<(), SurfaceError>;

    fn set_source_data(
        &mut self,
        source: SourceId,
        features: &[PointFeature],
    ) -> Result<(), SurfaceError>;

    fn set_visibility(&mut self, layer: LayerId, visible: bool) -> Result<(), SurfaceError>;

    /// Interrupts any running transition.
    fn fly_to(&mut self, camera: &CameraMove) -> Result<(), SurfaceError>;

    fn set_cursor(&mut self, cursor: Cursor) -> Result<(), SurfaceError>;
}
