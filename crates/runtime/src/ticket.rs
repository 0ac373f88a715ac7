/// Identifies one issued async request.
///
/// Tickets are small copyable handles; a response is only applied when it
/// carries the latest ticket of its counter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

/// Monotonic ticket dispenser that remembers which ticket is current.
#[derive(Debug, Default)]
pub struct TicketCounter {
    next: u64,
    latest: Option<Ticket>,
}

impl TicketCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new ticket; every earlier ticket becomes stale.
    pub fn issue(&mut self) -> Ticket {
        let ticket = Ticket(self.next);
        self.next = self.next.wrapping_add(1);
        self.latest = Some(ticket);
        ticket
    }

    pub fn latest(&self) -> Option<Ticket> {
        self.latest
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest == Some(ticket)
    }

    /// Marks every issued ticket stale without issuing a new one.
    pub fn invalidate(&mut self) {
        self.latest = None;
    }
}
