use crate::ticket::{TravelTicket, TripDirection};
use crate::user::User;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// Repository trait for ticket data access
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn create(&self, ticket: &TravelTicket) -> Result<TravelTicket, RepoError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<TravelTicket>, RepoError>;

    async fn get_all(&self) -> Result<Vec<TravelTicket>, RepoError>;

    async fn get_by_user(&self, user_id: Uuid) -> Result<Vec<TravelTicket>, RepoError>;

    async fn update(&self, ticket: &TravelTicket) -> Result<TravelTicket, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64, RepoError>;

    /// Whether the user already has an open ticket departing on `day` (UTC),
    /// optionally ignoring one ticket (used when updating in place).
    async fn exists_for_user_on_date(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<bool, RepoError>;

    /// Open tickets departing on `day` whose matching endpoint (source for
    /// return-trip targets, destination for outbound targets) is one of
    /// `endpoints`, excluding the target ticket itself. The caller computes
    /// the endpoint list, widened to every airport terminal when the
    /// target's endpoint is a terminal.
    async fn find_same_day_complementary(
        &self,
        direction: TripDirection,
        endpoints: &[String],
        day: NaiveDate,
        exclude: Uuid,
    ) -> Result<Vec<TravelTicket>, RepoError>;
}

/// Repository trait for user data access
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    /// Batched lookup for candidate enrichment; callers must tolerate
    /// missing IDs (the result may be shorter than the input).
    async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;
}
