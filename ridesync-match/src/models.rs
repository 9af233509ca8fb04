use chrono::{DateTime, Utc};
use ridesync_core::{TicketStatus, TravelTicket, User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Owner details attached to a recommended candidate. Deliberately minimal:
/// enough to recognize a co-rider, nothing that identifies their account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MinimalUser {
    pub name: String,
    pub batch: String,
    pub email: String,
}

impl From<&User> for MinimalUser {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            batch: user.batch.clone(),
            email: user.email.clone(),
        }
    }
}

/// Redacted view of a candidate ticket for recommendations; hides the
/// ticket ID and the owner's user ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicTicket {
    pub source: String,
    pub destination: String,
    pub empty_seats: i32,
    pub departure_at: DateTime<Utc>,
    pub time_diff_mins: i64,
    pub phone_number: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&TravelTicket> for PublicTicket {
    fn from(ticket: &TravelTicket) -> Self {
        Self {
            source: ticket.source.clone(),
            destination: ticket.destination.clone(),
            empty_seats: ticket.empty_seats,
            departure_at: ticket.departure_at,
            time_diff_mins: ticket.time_diff_mins,
            phone_number: ticket.phone_number.clone(),
            status: ticket.status,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}

/// A candidate ticket with its compatibility score and pre-formatted
/// departure date/time for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredTicket {
    pub ticket: PublicTicket,
    pub score: f64,
    pub date: String,
    pub time: String,
    pub user: MinimalUser,
    /// Internal partitioning handle, never exposed.
    #[serde(skip)]
    pub candidate_id: Uuid,
}

impl ScoredTicket {
    pub fn new(candidate: &TravelTicket, score: f64, user: MinimalUser) -> Self {
        Self {
            ticket: PublicTicket::from(candidate),
            score,
            date: candidate.departure_at.format("%Y-%m-%d").to_string(),
            time: candidate.departure_at.format("%H:%M").to_string(),
            user,
            candidate_id: candidate.id,
        }
    }
}

/// Ranked outcome of one recommendation request. Ephemeral, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub best_match: Option<ScoredTicket>,
    pub best_group: Vec<ScoredTicket>,
    pub other_alternatives: Vec<ScoredTicket>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn scored_ticket_formats_departure_and_hides_ids() {
        let departure = Utc.with_ymd_and_hms(2025, 6, 1, 14, 5, 0).unwrap();
        let ticket = TravelTicket {
            id: Uuid::new_v4(),
            source: "Uniworld-1".to_string(),
            destination: "Kempegowda International Airport Terminal-1".to_string(),
            empty_seats: 2,
            departure_at: departure,
            time_diff_mins: 30,
            user_id: Uuid::new_v4(),
            phone_number: "9876543210".to_string(),
            status: TicketStatus::Open,
            created_at: departure,
            updated_at: departure,
        };

        let scored = ScoredTicket::new(&ticket, 90.0, MinimalUser::default());
        assert_eq!(scored.date, "2025-06-01");
        assert_eq!(scored.time, "14:05");

        let json = serde_json::to_value(&scored).unwrap();
        assert!(json.get("candidate_id").is_none());
        assert!(json["ticket"].get("id").is_none());
        assert!(json["ticket"].get("user_id").is_none());
        assert_eq!(json["ticket"]["status"], "open");
    }
}
