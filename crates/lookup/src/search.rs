use std::time::Duration;

use foundation::geo::GeoBounds;
use foundation::time::Time;
use runtime::debounce::Debouncer;
use runtime::ticket::{Ticket, TicketCounter};
use tracing::{debug, warn};

use crate::protocol::{Candidate, GeocodeRequest, LookupError};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub debounce: Duration,
    pub bounds: GeoBounds,
    pub limit: usize,
}

/// Debounced, last-request-wins address search.
///
/// Every query change restarts the debounce window. When the window elapses
/// a request is issued under a fresh ticket; a response is applied only if
/// it carries the latest ticket and its query is still the current one.
#[derive(Debug)]
pub struct AddressSearch {
    settings: SearchSettings,
    debouncer: Debouncer<String>,
    tickets: TicketCounter,
    in_flight: Option<(Ticket, String)>,
    candidates: Vec<Candidate>,
    open: bool,
}

impl AddressSearch {
    pub fn new(settings: SearchSettings) -> Self {
        Self {
            debouncer: Debouncer::new(settings.debounce),
            settings,
            tickets: TicketCounter::new(),
            in_flight: None,
            candidates: Vec::new(),
            open: false,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Blank queries cancel everything and clear the list without a request.
    pub fn query_changed(&mut self, now: Time, query: &str) {
        if query.trim().is_empty() {
            self.reset();
            self.candidates.clear();
            return;
        }
        self.debouncer.schedule(now, query.to_string());
    }

    /// When the pending debounce window elapses, if any.
    pub fn deadline(&self) -> Option<Time> {
        self.debouncer.deadline()
    }

    /// Issues the request for the debounced query once its window elapsed.
    pub fn poll(&mut self, now: Time) -> Option<(Ticket, GeocodeRequest)> {
        let query = self.debouncer.poll(now)?;
        let ticket = self.tickets.issue();
        debug!(?ticket, %query, "address search issued");
        self.in_flight = Some((ticket, query.clone()));
        Some((
            ticket,
            GeocodeRequest {
                query,
                bounds: self.settings.bounds,
                limit: self.settings.limit,
            },
        ))
    }

    /// Returns whether the response was applied.
    ///
    /// Failures count as applied: they replace the list with an empty one.
    pub fn accept(
        &mut self,
        ticket: Ticket,
        current_query: &str,
        result: Result<Vec<Candidate>, LookupError>,
    ) -> bool {
        if !self.tickets.is_latest(ticket) {
            debug!(?ticket, "dropping superseded address search response");
            return false;
        }
        let Some((_, query)) = self.in_flight.take() else {
            return false;
        };
        if query != current_query {
            debug!(?ticket, %query, "dropping address search response for an outdated query");
            return false;
        }

        match result {
            Ok(mut candidates) => {
                candidates.truncate(self.settings.limit);
                self.candidates = candidates;
            }
            Err(err) => {
                warn!(%err, %query, "address search failed");
                self.candidates.clear();
            }
        }
        self.open = !self.candidates.is_empty();
        true
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Takes a candidate from the list, closes the list and drops any pending
    /// or in-flight search so the chosen text does not trigger a new one.
    pub fn choose(&mut self, index: usize) -> Option<Candidate> {
        let candidate = self.candidates.get(index)?.clone();
        self.reset();
        Some(candidate)
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    fn reset(&mut self) {
        self.debouncer.cancel();
        self.tickets.invalidate();
        self.in_flight = None;
        self.open = false;
    }
}
