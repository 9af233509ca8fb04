use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Ticket status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Closed,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketStatus::Open => write!(f, "open"),
            TicketStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TicketStatus::Open),
            "closed" => Ok(TicketStatus::Closed),
            other => Err(format!("unknown ticket status: {}", other)),
        }
    }
}

/// Which way a ticket travels relative to campus housing.
///
/// A ticket whose destination is a hostel is a return trip (home → hostel);
/// everything else is outbound (hostel → home), even when neither endpoint
/// classifies cleanly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TripDirection {
    Outbound,
    Return,
}

/// A posted trip looking for co-riders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelTicket {
    pub id: Uuid,
    pub source: String,
    pub destination: String,
    pub empty_seats: i32,
    pub departure_at: DateTime<Utc>,
    /// How many minutes earlier than its own departure the owner is still
    /// willing to leave. The tolerance after departure is fixed system-wide.
    pub time_diff_mins: i64,
    pub user_id: Uuid,
    pub phone_number: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TravelTicket {
    /// UTC calendar day the ticket departs on. All per-day invariants and
    /// candidate queries use this, never a local zone.
    pub fn departure_day(&self) -> NaiveDate {
        self.departure_at.date_naive()
    }
}

/// Half-open [start, end) UTC range covering one calendar day.
pub fn utc_day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
    (start, start + chrono::Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!("open".parse::<TicketStatus>().unwrap(), TicketStatus::Open);
        assert_eq!(TicketStatus::Closed.to_string(), "closed");
        assert!("archived".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn day_bounds_are_half_open() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let (start, end) = utc_day_bounds(day);
        assert_eq!(start.to_rfc3339(), "2025-03-14T00:00:00+00:00");
        assert_eq!(end - start, chrono::Duration::days(1));
    }
}
