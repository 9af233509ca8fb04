use ridesync_core::{TravelTicket, TripDirection};
use std::collections::HashSet;

/// Immutable taxonomy of the known pickup/drop locations, built once at
/// startup and shared by reference with the scorer and the engine.
///
/// The three categories are disjoint. "Nearby" is an equivalence within a
/// single category: two airport terminals are interchangeable for matching,
/// as are two hostels. Railway stations have no nearness relation.
#[derive(Debug, Clone)]
pub struct LocationIndex {
    hostels: HashSet<String>,
    airport_terminals: HashSet<String>,
    railway_stations: HashSet<String>,
}

impl LocationIndex {
    pub fn new(
        hostels: impl IntoIterator<Item = String>,
        airport_terminals: impl IntoIterator<Item = String>,
        railway_stations: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            hostels: hostels.into_iter().collect(),
            airport_terminals: airport_terminals.into_iter().collect(),
            railway_stations: railway_stations.into_iter().collect(),
        }
    }

    pub fn is_hostel(&self, loc: &str) -> bool {
        self.hostels.contains(loc)
    }

    pub fn is_airport_terminal(&self, loc: &str) -> bool {
        self.airport_terminals.contains(loc)
    }

    pub fn is_railway_station(&self, loc: &str) -> bool {
        self.railway_stations.contains(loc)
    }

    /// Membership in any category. Ticket creation only accepts known
    /// locations; unknown strings are simply false everywhere, never an error.
    pub fn is_known(&self, loc: &str) -> bool {
        self.is_hostel(loc) || self.is_airport_terminal(loc) || self.is_railway_station(loc)
    }

    /// True when two airport terminals are close enough to be
    /// interchangeable for matching purposes (e.g. Terminal-1 and Terminal-2).
    pub fn are_nearby_terminals(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        self.is_airport_terminal(a) && self.is_airport_terminal(b)
    }

    /// True when two hostels are close enough to be interchangeable.
    pub fn are_nearby_hostels(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        self.is_hostel(a) && self.is_hostel(b)
    }

    /// Return trip iff the destination is a hostel; everything else falls
    /// back to outbound. A ticket with no classifiable endpoint at all is
    /// unexpected past creation-time validation, so it is logged and still
    /// treated as outbound.
    pub fn classify_direction(&self, ticket: &TravelTicket) -> TripDirection {
        if self.is_hostel(&ticket.destination) {
            return TripDirection::Return;
        }
        if !self.is_known(&ticket.source) && !self.is_known(&ticket.destination) {
            tracing::warn!(
                ticket_id = %ticket.id,
                source = %ticket.source,
                destination = %ticket.destination,
                "ticket has no known endpoint, treating as outbound"
            );
        }
        TripDirection::Outbound
    }

    /// Endpoint values a candidate may match against: the endpoint itself,
    /// widened to every airport terminal when the endpoint is a terminal.
    /// Sorted so repository queries stay deterministic.
    pub fn match_endpoints(&self, endpoint: &str) -> Vec<String> {
        if self.is_airport_terminal(endpoint) {
            let mut terminals: Vec<String> = self.airport_terminals.iter().cloned().collect();
            terminals.sort();
            terminals
        } else {
            vec![endpoint.to_string()]
        }
    }
}

/// The original deployment's Bengaluru location set.
impl Default for LocationIndex {
    fn default() -> Self {
        Self::new(
            ["Uniworld-1", "Uniworld-2"].map(String::from),
            [
                "Kempegowda International Airport Terminal-1",
                "Kempegowda International Airport Terminal-2",
            ]
            .map(String::from),
            [
                "KSR SBC Bengaluru Junction Railway Station",
                "SMVT Bengaluru Railway station",
                "Krishnarajapuram Railway Station",
                "Yesvantpur Junction Railway station",
                "Banglore Cantonment Railway Station",
                "Bengaluru East Railway Station",
            ]
            .map(String::from),
        )
    }
}
