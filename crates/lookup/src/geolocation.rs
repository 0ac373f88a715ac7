use foundation::geo::LatLon;
use runtime::ticket::{Ticket, TicketCounter};
use tracing::{debug, info, warn};

use crate::protocol::LocationError;

#[derive(Debug, Clone, PartialEq)]
pub enum LocateOutcome {
    Located(LatLon),
    Failed(LocationError),
    /// The result did not belong to the outstanding request.
    Ignored,
}

/// One-shot device location requests.
///
/// At most one request is outstanding; asking again while it is pending is a
/// no-op. The last known position survives later failures.
#[derive(Debug, Default)]
pub struct Geolocation {
    tickets: TicketCounter,
    outstanding: Option<Ticket>,
    position: Option<LatLon>,
    last_error: Option<LocationError>,
}

impl Geolocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ticket to resolve, or `None` while a request is pending.
    pub fn request(&mut self) -> Option<Ticket> {
        if self.outstanding.is_some() {
            debug!("location request already pending");
            return None;
        }
        let ticket = self.tickets.issue();
        self.outstanding = Some(ticket);
        Some(ticket)
    }

    pub fn resolve(&mut self, ticket: Ticket, result: Result<LatLon, LocationError>) -> LocateOutcome {
        if self.outstanding != Some(ticket) {
            return LocateOutcome::Ignored;
        }
        self.outstanding = None;
        match result {
            Ok(position) if position.is_valid() => {
                info!(lat = position.lat, lon = position.lon, "device located");
                self.position = Some(position);
                self.last_error = None;
                LocateOutcome::Located(position)
            }
            Ok(position) => self.fail(LocationError::new(
                LocationError::POSITION_UNAVAILABLE,
                format!("Invalid position {}, {}", position.lat, position.lon),
            )),
            Err(err) => self.fail(err),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.outstanding.is_some()
    }

    pub fn position(&self) -> Option<LatLon> {
        self.position
    }

    pub fn last_error(&self) -> Option<&LocationError> {
        self.last_error.as_ref()
    }

    fn fail(&mut self, err: LocationError) -> LocateOutcome {
        warn!(code = err.code, message = %err.message, "location request failed");
        self.last_error = Some(err.clone());
        LocateOutcome::Failed(err)
    }
}
