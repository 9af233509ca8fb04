use crate::locations::LocationIndex;
use chrono::Duration;
use ridesync_core::{TravelTicket, TripDirection};

/// Asymmetric departure-time compatibility: the target accepts candidates
/// leaving up to `target.time_diff_mins` minutes before its own departure,
/// or up to `after_window` after it. Candidates outside the window are
/// dropped before scoring, not merely down-ranked.
pub fn within_time_window(
    target: &TravelTicket,
    candidate: &TravelTicket,
    after_window: Duration,
) -> bool {
    let delta = candidate.departure_at - target.departure_at;
    if delta <= Duration::zero() {
        -delta <= Duration::minutes(target.time_diff_mins)
    } else {
        delta <= after_window
    }
}

/// Compatibility score in [0, 100] for a candidate already known to travel
/// the complementary direction inside the target's time window.
///
/// Starts at 100, decays 0.5 per minute of departure gap, then weights the
/// endpoints by direction. Nearby-but-different endpoints take a
/// multiplicative haircut; genuinely incompatible ones multiply to zero so
/// they still surface (last) in the alternatives instead of vanishing.
pub fn compatibility_score(
    index: &LocationIndex,
    direction: TripDirection,
    target: &TravelTicket,
    candidate: &TravelTicket,
) -> f64 {
    let mut score = 100.0;

    let gap_mins = (candidate.departure_at - target.departure_at)
        .num_seconds()
        .abs() as f64
        / 60.0;
    score -= 0.5 * gap_mins;
    if score < 0.0 {
        score = 0.0;
    }

    match direction {
        TripDirection::Return => {
            // Home → Hostel: the shared pickup point is the source.
            if target.source != candidate.source {
                if index.are_nearby_terminals(&target.source, &candidate.source) {
                    score *= 0.8;
                } else {
                    score *= 0.0;
                }
            }
            if target.destination != candidate.destination {
                if index.are_nearby_hostels(&target.destination, &candidate.destination) {
                    score *= 0.7;
                } else {
                    score -= 20.0;
                }
            }
        }
        TripDirection::Outbound => {
            // Hostel → Home: the shared pickup point is the source hostel.
            if target.source != candidate.source {
                if index.are_nearby_hostels(&target.source, &candidate.source) {
                    score *= 0.85;
                } else {
                    score *= 0.0;
                }
            }
            if target.destination != candidate.destination {
                if index.are_nearby_terminals(&target.destination, &candidate.destination) {
                    score *= 0.6;
                } else {
                    score -= 20.0;
                }
            }
        }
    }

    if score < 0.0 {
        score = 0.0;
    }
    score
}
