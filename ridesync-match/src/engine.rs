use crate::locations::LocationIndex;
use crate::models::{MinimalUser, RecommendationResult, ScoredTicket};
use crate::scoring::{compatibility_score, within_time_window};
use chrono::Duration;
use ridesync_core::{RepoError, TicketRepository, TravelTicket, TripDirection, UserRepository};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// Tunable matching rules. The defaults are the authoritative production
/// values; they live here rather than at call sites so deployments can
/// override them through configuration.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Fixed tolerance for candidates departing after the target, in minutes.
    pub after_window_mins: i64,
    /// Upper bound on the best-group size.
    pub max_group_size: usize,
    /// Deadline for one full recommendation pipeline, in seconds.
    pub recommend_timeout_secs: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            after_window_mins: 60,
            max_group_size: 4,
            recommend_timeout_secs: 10,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("ticket {0} not found")]
    TicketNotFound(Uuid),

    #[error("recommendation timed out after {0}s")]
    Timeout(u64),

    #[error("store unavailable: {0}")]
    Store(RepoError),
}

/// Computes ride-share recommendations for a ticket: the single best match,
/// a best group of up to `max_group_size` co-riders, and the ranked
/// remainder. Stateless between requests; everything it reads comes from
/// the injected repositories.
pub struct RecommendationEngine {
    tickets: Arc<dyn TicketRepository>,
    users: Arc<dyn UserRepository>,
    locations: Arc<LocationIndex>,
    config: MatchConfig,
}

impl RecommendationEngine {
    pub fn new(
        tickets: Arc<dyn TicketRepository>,
        users: Arc<dyn UserRepository>,
        locations: Arc<LocationIndex>,
        config: MatchConfig,
    ) -> Self {
        Self {
            tickets,
            users,
            locations,
            config,
        }
    }

    /// Run the full pipeline under the configured deadline.
    pub async fn recommend(&self, ticket_id: Uuid) -> Result<RecommendationResult, MatchError> {
        let deadline = std::time::Duration::from_secs(self.config.recommend_timeout_secs);
        match tokio::time::timeout(deadline, self.recommend_inner(ticket_id)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(%ticket_id, "recommendation pipeline exceeded deadline");
                Err(MatchError::Timeout(self.config.recommend_timeout_secs))
            }
        }
    }

    async fn recommend_inner(&self, ticket_id: Uuid) -> Result<RecommendationResult, MatchError> {
        let target = self
            .tickets
            .get_by_id(ticket_id)
            .await
            .map_err(MatchError::Store)?
            .ok_or(MatchError::TicketNotFound(ticket_id))?;

        let direction = self.locations.classify_direction(&target);
        let endpoint = match direction {
            TripDirection::Return => &target.source,
            TripDirection::Outbound => &target.destination,
        };
        let endpoints = self.locations.match_endpoints(endpoint);

        let mut candidates = self
            .tickets
            .find_same_day_complementary(direction, &endpoints, target.departure_day(), target.id)
            .await
            .map_err(MatchError::Store)?;

        // The retrieval query already excludes the target itself; the
        // owner's other tickets must never be recommended back to them.
        candidates.retain(|c| c.user_id != target.user_id);

        let after_window = Duration::minutes(self.config.after_window_mins);
        candidates.retain(|c| within_time_window(&target, c, after_window));

        tracing::debug!(
            %ticket_id,
            ?direction,
            candidates = candidates.len(),
            "scoring time-compatible candidates"
        );

        let profiles = self.owner_profiles(&candidates).await?;
        let mut scored: Vec<ScoredTicket> = candidates
            .iter()
            .map(|c| {
                let score = compatibility_score(&self.locations, direction, &target, c);
                let user = profiles.get(&c.user_id).cloned().unwrap_or_default();
                ScoredTicket::new(c, score, user)
            })
            .collect();

        // Stable sort keeps retrieval order on ties, so equal scores rank
        // deterministically.
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(self.partition(&target, scored, after_window))
    }

    /// One batched lookup instead of a per-candidate fetch. A candidate
    /// whose owner is missing keeps a default profile rather than dropping
    /// out of the ranking.
    async fn owner_profiles(
        &self,
        candidates: &[TravelTicket],
    ) -> Result<HashMap<Uuid, MinimalUser>, MatchError> {
        let mut ids: Vec<Uuid> = candidates.iter().map(|c| c.user_id).collect();
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = self
            .users
            .get_by_ids(&ids)
            .await
            .map_err(MatchError::Store)?;
        Ok(users
            .iter()
            .map(|u| (u.id, MinimalUser::from(u)))
            .collect())
    }

    /// Split the ranked list into best match / best group / alternatives.
    ///
    /// The group is assembled by walking the ranking in order and
    /// re-verifying the time window against the target; a group of one is
    /// never published. The best match spotlights the head of the ranking,
    /// and everything neither spotlighted nor grouped lands in the
    /// alternatives with its rank preserved.
    fn partition(
        &self,
        target: &TravelTicket,
        scored: Vec<ScoredTicket>,
        after_window: Duration,
    ) -> RecommendationResult {
        let mut result = RecommendationResult {
            best_match: scored.first().cloned(),
            ..Default::default()
        };

        let mut group = Vec::with_capacity(self.config.max_group_size);
        for candidate in &scored {
            if group.len() >= self.config.max_group_size {
                break;
            }
            let delta = candidate.ticket.departure_at - target.departure_at;
            let in_window = if delta <= Duration::zero() {
                -delta <= Duration::minutes(target.time_diff_mins)
            } else {
                delta <= after_window
            };
            if in_window {
                group.push(candidate.clone());
            }
        }
        if group.len() >= 2 {
            result.best_group = group;
        }

        let taken: HashSet<Uuid> = result
            .best_match
            .iter()
            .chain(result.best_group.iter())
            .map(|s| s.candidate_id)
            .collect();
        result.other_alternatives = scored
            .into_iter()
            .filter(|s| !taken.contains(&s.candidate_id))
            .collect();

        result
    }
}
