use layers::{CameraMove, Cursor, FilterExpr, LayerId, PointFeature, RenderSurface, SourceId, SurfaceError};
use tracing::{debug, info};

/// Headless surface: logs every command it receives.
#[derive(Debug, Default)]
pub struct TraceSurface {
    commands: usize,
}

impl TraceSurface {
    pub fn commands(&self) -> usize {
        self.commands
    }
}

impl RenderSurface for TraceSurface {
    fn is_ready(&self) -> bool {
        true
    }

    fn set_filter(&mut self, layer: LayerId, filter: Option<&FilterExpr>) -> Result<(), SurfaceError> {
        self.commands += 1;
        let expr = filter.map_or_else(|| "none".to_string(), |f| f.to_json().to_string());
        info!(%layer, filter = %expr, "set filter");
        Ok(())
    }

    fn set_source_data(&mut self, source: SourceId, features: &[PointFeature]) -> Result<(), SurfaceError> {
        self.commands += 1;
        info!(%source, features = features.len(), "set source data");
        Ok(())
    }

    fn set_visibility(&mut self, layer: LayerId, visible: bool) -> Result<(), SurfaceError> {
        self.commands += 1;
        info!(%layer, visible, "set visibility");
        Ok(())
    }

    fn fly_to(&mut self, camera: &CameraMove) -> Result<(), SurfaceError> {
        self.commands += 1;
        info!(
            lat = camera.center.lat,
            lon = camera.center.lon,
            zoom = camera.zoom,
            duration_ms = camera.duration_ms,
            "fly to"
        );
        Ok(())
    }

    fn set_cursor(&mut self, cursor: Cursor) -> Result<(), SurfaceError> {
        self.commands += 1;
        debug!(?cursor, "set cursor");
        Ok(())
    }
}
