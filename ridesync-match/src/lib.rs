pub mod engine;
pub mod locations;
pub mod models;
pub mod scoring;

pub use engine::{MatchConfig, MatchError, RecommendationEngine};
pub use locations::LocationIndex;
pub use models::{MinimalUser, PublicTicket, RecommendationResult, ScoredTicket};
