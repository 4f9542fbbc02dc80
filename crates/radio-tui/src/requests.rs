//! Sequence tagging for directory requests.
//!
//! Every request made for a region gets a ticket.  When responses arrive out
//! of order only the one holding the latest ticket for its region may update
//! that region; older ones are dropped.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// The Discover tab's result list.
    Discover,
    /// The Search tab's result list.
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub region: Region,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    next: u64,
    discover: u64,
    search: u64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `region`, superseding any in flight.
    pub fn issue(&mut self, region: Region) -> Ticket {
        self.next += 1;
        *self.latest_mut(region) = self.next;
        Ticket {
            region,
            seq: self.next,
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        let latest = match ticket.region {
            Region::Discover => self.discover,
            Region::Search => self.search,
        };
        latest == ticket.seq
    }

    fn latest_mut(&mut self, region: Region) -> &mut u64 {
        match region {
            Region::Discover => &mut self.discover,
            Region::Search => &mut self.search,
        }
    }
}
