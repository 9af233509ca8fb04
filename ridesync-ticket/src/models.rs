use chrono::{DateTime, Utc};
use ridesync_core::{TicketStatus, TravelTicket, User};
use ridesync_match::MinimalUser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub source: String,
    pub destination: String,
    pub departure_at: DateTime<Utc>,
    pub time_diff_mins: i64,
    pub empty_seats: i32,
    /// Falls back to the owner's profile phone when omitted.
    pub phone_number: Option<String>,
}

/// Partial update; absent fields keep their current values.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTicketRequest {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub departure_at: Option<DateTime<Utc>>,
    pub time_diff_mins: Option<i64>,
    pub empty_seats: Option<i32>,
    pub phone_number: Option<String>,
    pub status: Option<TicketStatus>,
}

/// Read view pairing a ticket with its owner's public details.
#[derive(Debug, Clone, Serialize)]
pub struct TicketWithOwner {
    pub ticket: TravelTicket,
    pub owner: MinimalUser,
}

impl TicketWithOwner {
    pub fn new(ticket: TravelTicket, owner: &User) -> Self {
        Self {
            ticket,
            owner: MinimalUser::from(owner),
        }
    }
}
