use crate::models::{CreateTicketRequest, TicketWithOwner, UpdateTicketRequest};
use chrono::Utc;
use ridesync_core::{
    RepoError, TicketRepository, TicketStatus, TravelTicket, UserRepository,
};
use ridesync_match::LocationIndex;
use std::sync::Arc;
use uuid::Uuid;

/// Closed tickets count against this too; owners are asked to clean up
/// before posting more.
const MAX_TICKETS_PER_USER: i64 = 20;

#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("{0}")]
    Validation(String),

    #[error("ticket {0} not found")]
    NotFound(Uuid),

    #[error("user {0} not found")]
    UserNotFound(Uuid),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Store(RepoError),
}

/// Ticket lifecycle: creation, owner-only mutation and deletion, and
/// owner-enriched read views. Matching never writes; every write funnels
/// through here.
pub struct TicketService {
    tickets: Arc<dyn TicketRepository>,
    users: Arc<dyn UserRepository>,
    locations: Arc<LocationIndex>,
}

impl TicketService {
    pub fn new(
        tickets: Arc<dyn TicketRepository>,
        users: Arc<dyn UserRepository>,
        locations: Arc<LocationIndex>,
    ) -> Self {
        Self {
            tickets,
            users,
            locations,
        }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        req: CreateTicketRequest,
    ) -> Result<TravelTicket, TicketError> {
        self.validate_location("source", &req.source)?;
        self.validate_location("destination", &req.destination)?;

        let count = self
            .tickets
            .count_by_user(user_id)
            .await
            .map_err(TicketError::Store)?;
        if count >= MAX_TICKETS_PER_USER {
            return Err(TicketError::Validation(
                "ticket limit reached, delete closed or stale tickets first".to_string(),
            ));
        }

        let user = self
            .users
            .get_by_id(user_id)
            .await
            .map_err(TicketError::Store)?
            .ok_or(TicketError::UserNotFound(user_id))?;

        let phone_number = match req.phone_number.filter(|p| !p.is_empty()) {
            Some(phone) => phone,
            None if !user.phone_number.is_empty() => user.phone_number.clone(),
            None => {
                return Err(TicketError::Validation(
                    "phone number is required".to_string(),
                ))
            }
        };

        let day = req.departure_at.date_naive();
        let exists = self
            .tickets
            .exists_for_user_on_date(user_id, day, None)
            .await
            .map_err(TicketError::Store)?;
        if exists {
            return Err(TicketError::Conflict(format!(
                "a ticket already exists for {}",
                day
            )));
        }

        let now = Utc::now();
        let ticket = TravelTicket {
            id: Uuid::new_v4(),
            source: req.source,
            destination: req.destination,
            empty_seats: req.empty_seats,
            departure_at: req.departure_at,
            time_diff_mins: req.time_diff_mins,
            user_id,
            phone_number,
            status: TicketStatus::Open,
            created_at: now,
            updated_at: now,
        };

        let created = self
            .tickets
            .create(&ticket)
            .await
            .map_err(TicketError::Store)?;
        tracing::info!(ticket_id = %created.id, %user_id, "ticket created");
        Ok(created)
    }

    pub async fn update(
        &self,
        current_user: Uuid,
        id: Uuid,
        req: UpdateTicketRequest,
    ) -> Result<TravelTicket, TicketError> {
        let mut ticket = self.fetch(id).await?;
        if ticket.user_id != current_user {
            return Err(TicketError::Forbidden("only the owner can edit a ticket"));
        }

        if let Some(source) = &req.source {
            self.validate_location("source", source)?;
        }
        if let Some(destination) = &req.destination {
            self.validate_location("destination", destination)?;
        }

        if let Some(source) = req.source {
            ticket.source = source;
        }
        if let Some(destination) = req.destination {
            ticket.destination = destination;
        }
        if let Some(departure_at) = req.departure_at {
            ticket.departure_at = departure_at;
        }
        if let Some(time_diff_mins) = req.time_diff_mins {
            ticket.time_diff_mins = time_diff_mins;
        }
        if let Some(empty_seats) = req.empty_seats {
            ticket.empty_seats = empty_seats;
        }
        if let Some(phone_number) = req.phone_number {
            ticket.phone_number = phone_number;
        }
        if let Some(status) = req.status {
            ticket.status = status;
        }

        // Re-check the per-day invariant whether or not the departure moved,
        // ignoring the ticket being edited.
        let day = ticket.departure_day();
        let exists = self
            .tickets
            .exists_for_user_on_date(current_user, day, Some(id))
            .await
            .map_err(TicketError::Store)?;
        if exists {
            return Err(TicketError::Conflict(format!(
                "a ticket already exists for {}",
                day
            )));
        }

        ticket.updated_at = Utc::now();
        self.tickets
            .update(&ticket)
            .await
            .map_err(TicketError::Store)
    }

    pub async fn delete(&self, current_user: Uuid, id: Uuid) -> Result<(), TicketError> {
        let ticket = self.fetch(id).await?;
        if ticket.user_id != current_user {
            return Err(TicketError::Forbidden(
                "only the owner can delete a ticket",
            ));
        }
        self.tickets.delete(id).await.map_err(TicketError::Store)?;
        tracing::info!(ticket_id = %id, user_id = %current_user, "ticket deleted");
        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<TravelTicket, TicketError> {
        self.fetch(id).await
    }

    pub async fn list_all(&self) -> Result<Vec<TravelTicket>, TicketError> {
        self.tickets.get_all().await.map_err(TicketError::Store)
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<TravelTicket>, TicketError> {
        self.tickets
            .get_by_user(user_id)
            .await
            .map_err(TicketError::Store)
    }

    /// Ticket plus its owner's name/batch/email.
    pub async fn get_with_owner(&self, id: Uuid) -> Result<TicketWithOwner, TicketError> {
        let ticket = self.fetch(id).await?;
        let owner = self
            .users
            .get_by_id(ticket.user_id)
            .await
            .map_err(TicketError::Store)?
            .ok_or(TicketError::UserNotFound(ticket.user_id))?;
        Ok(TicketWithOwner::new(ticket, &owner))
    }

    /// All of a user's tickets with the owner attached once.
    pub async fn list_with_owner(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<TicketWithOwner>, TicketError> {
        let owner = self
            .users
            .get_by_id(user_id)
            .await
            .map_err(TicketError::Store)?
            .ok_or(TicketError::UserNotFound(user_id))?;
        let tickets = self.list_by_user(user_id).await?;
        Ok(tickets
            .into_iter()
            .map(|t| TicketWithOwner::new(t, &owner))
            .collect())
    }

    async fn fetch(&self, id: Uuid) -> Result<TravelTicket, TicketError> {
        self.tickets
            .get_by_id(id)
            .await
            .map_err(TicketError::Store)?
            .ok_or(TicketError::NotFound(id))
    }

    fn validate_location(&self, field: &str, loc: &str) -> Result<(), TicketError> {
        if self.locations.is_known(loc) {
            Ok(())
        } else {
            Err(TicketError::Validation(format!(
                "invalid {}: pick one of the predefined locations",
                field
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use ridesync_core::{TripDirection, User};
    use std::sync::Mutex;

    const TERMINAL_1: &str = "Kempegowda International Airport Terminal-1";

    struct InMemoryTickets {
        tickets: Mutex<Vec<TravelTicket>>,
    }

    impl InMemoryTickets {
        fn empty() -> Arc<Self> {
            Arc::new(Self {
                tickets: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TicketRepository for InMemoryTickets {
        async fn create(&self, ticket: &TravelTicket) -> Result<TravelTicket, RepoError> {
            self.tickets.lock().unwrap().push(ticket.clone());
            Ok(ticket.clone())
        }

        async fn get_by_id(&self, id: Uuid) -> Result<Option<TravelTicket>, RepoError> {
            Ok(self
                .tickets
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.id == id)
                .cloned())
        }

        async fn get_all(&self) -> Result<Vec<TravelTicket>, RepoError> {
            Ok(self.tickets.lock().unwrap().clone())
        }

        async fn get_by_user(&self, user_id: Uuid) -> Result<Vec<TravelTicket>, RepoError> {
            Ok(self
                .tickets
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn update(&self, ticket: &TravelTicket) -> Result<TravelTicket, RepoError> {
            let mut tickets = self.tickets.lock().unwrap();
            if let Some(slot) = tickets.iter_mut().find(|t| t.id == ticket.id) {
                *slot = ticket.clone();
            }
            Ok(ticket.clone())
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
            self.tickets.lock().unwrap().retain(|t| t.id != id);
            Ok(())
        }

        async fn count_by_user(&self, user_id: Uuid) -> Result<i64, RepoError> {
            Ok(self.get_by_user(user_id).await?.len() as i64)
        }

        async fn exists_for_user_on_date(
            &self,
            user_id: Uuid,
            day: NaiveDate,
            exclude: Option<Uuid>,
        ) -> Result<bool, RepoError> {
            Ok(self.tickets.lock().unwrap().iter().any(|t| {
                t.user_id == user_id
                    && t.departure_day() == day
                    && exclude.map_or(true, |ex| t.id != ex)
            }))
        }

        async fn find_same_day_complementary(
            &self,
            _direction: TripDirection,
            _endpoints: &[String],
            _day: NaiveDate,
            _exclude: Uuid,
        ) -> Result<Vec<TravelTicket>, RepoError> {
            Ok(Vec::new())
        }
    }

    struct InMemoryUsers {
        users: Vec<User>,
    }

    #[async_trait]
    impl UserRepository for InMemoryUsers {
        async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
            Ok(self.users.iter().find(|u| u.id == id).cloned())
        }

        async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
            Ok(self
                .users
                .iter()
                .filter(|u| ids.contains(&u.id))
                .cloned()
                .collect())
        }
    }

    fn service(users: Vec<User>) -> (TicketService, Arc<InMemoryTickets>) {
        let tickets = InMemoryTickets::empty();
        let service = TicketService::new(
            tickets.clone(),
            Arc::new(InMemoryUsers { users }),
            Arc::new(LocationIndex::default()),
        );
        (service, tickets)
    }

    fn student(phone: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Asha".to_string(),
            batch: "2024".to_string(),
            email: "asha@example.edu".to_string(),
            phone_number: phone.to_string(),
        }
    }

    fn create_request(hour: u32) -> CreateTicketRequest {
        CreateTicketRequest {
            source: "Uniworld-1".to_string(),
            destination: TERMINAL_1.to_string(),
            departure_at: Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap(),
            time_diff_mins: 30,
            empty_seats: 3,
            phone_number: Some("9876543210".to_string()),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_opens_ticket() {
        let owner = student("8888888888");
        let (service, _) = service(vec![owner.clone()]);

        let ticket = service.create(owner.id, create_request(14)).await.unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.user_id, owner.id);
        assert_eq!(ticket.phone_number, "9876543210");
    }

    #[tokio::test]
    async fn create_falls_back_to_profile_phone() {
        let owner = student("8888888888");
        let (service, _) = service(vec![owner.clone()]);

        let mut req = create_request(14);
        req.phone_number = None;
        let ticket = service.create(owner.id, req).await.unwrap();
        assert_eq!(ticket.phone_number, "8888888888");
    }

    #[tokio::test]
    async fn create_requires_some_phone() {
        let owner = student("");
        let (service, _) = service(vec![owner.clone()]);

        let mut req = create_request(14);
        req.phone_number = None;
        let err = service.create(owner.id, req).await.unwrap_err();
        assert!(matches!(err, TicketError::Validation(_)));
    }

    #[tokio::test]
    async fn create_rejects_unknown_locations() {
        let owner = student("8888888888");
        let (service, _) = service(vec![owner.clone()]);

        let mut req = create_request(14);
        req.source = "Majestic Bus Stand".to_string();
        let err = service.create(owner.id, req).await.unwrap_err();
        assert!(matches!(err, TicketError::Validation(_)));
    }

    #[tokio::test]
    async fn one_open_ticket_per_day() {
        let owner = student("8888888888");
        let (service, _) = service(vec![owner.clone()]);

        service.create(owner.id, create_request(9)).await.unwrap();
        // Same UTC day, different hour.
        let err = service
            .create(owner.id, create_request(18))
            .await
            .unwrap_err();
        assert!(matches!(err, TicketError::Conflict(_)));
    }

    #[tokio::test]
    async fn ticket_cap_is_enforced() {
        let owner = student("8888888888");
        let (service, repo) = service(vec![owner.clone()]);

        {
            let mut tickets = repo.tickets.lock().unwrap();
            for i in 0..MAX_TICKETS_PER_USER {
                let departure = Utc
                    .with_ymd_and_hms(2025, 1, 1, 8, 0, 0)
                    .unwrap()
                    + chrono::Duration::days(i);
                tickets.push(TravelTicket {
                    id: Uuid::new_v4(),
                    source: "Uniworld-1".to_string(),
                    destination: TERMINAL_1.to_string(),
                    empty_seats: 3,
                    departure_at: departure,
                    time_diff_mins: 30,
                    user_id: owner.id,
                    phone_number: "9876543210".to_string(),
                    status: TicketStatus::Closed,
                    created_at: departure,
                    updated_at: departure,
                });
            }
        }

        let err = service
            .create(owner.id, create_request(14))
            .await
            .unwrap_err();
        assert!(matches!(err, TicketError::Validation(_)));
    }

    #[tokio::test]
    async fn only_owner_may_update() {
        let owner = student("8888888888");
        let stranger = Uuid::new_v4();
        let (service, _) = service(vec![owner.clone()]);

        let ticket = service.create(owner.id, create_request(14)).await.unwrap();
        let err = service
            .update(stranger, ticket.id, UpdateTicketRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TicketError::Forbidden(_)));
    }

    #[tokio::test]
    async fn update_applies_partial_changes() {
        let owner = student("8888888888");
        let (service, _) = service(vec![owner.clone()]);

        let ticket = service.create(owner.id, create_request(14)).await.unwrap();
        let updated = service
            .update(
                owner.id,
                ticket.id,
                UpdateTicketRequest {
                    empty_seats: Some(1),
                    status: Some(TicketStatus::Closed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.empty_seats, 1);
        assert_eq!(updated.status, TicketStatus::Closed);
        // Untouched fields survive.
        assert_eq!(updated.source, ticket.source);
        assert_eq!(updated.departure_at, ticket.departure_at);
    }

    #[tokio::test]
    async fn update_may_keep_its_own_day() {
        let owner = student("8888888888");
        let (service, _) = service(vec![owner.clone()]);

        let ticket = service.create(owner.id, create_request(14)).await.unwrap();
        // Moving within the same day conflicts only with *other* tickets.
        let moved = service
            .update(
                owner.id,
                ticket.id,
                UpdateTicketRequest {
                    departure_at: Some(ticket.departure_at + chrono::Duration::hours(2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.departure_day(), ticket.departure_day());
    }

    #[tokio::test]
    async fn update_rejects_day_collision() {
        let owner = student("8888888888");
        let (service, _) = service(vec![owner.clone()]);

        let first = service.create(owner.id, create_request(14)).await.unwrap();
        let mut second_req = create_request(10);
        second_req.departure_at = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();
        let second = service.create(owner.id, second_req).await.unwrap();

        let err = service
            .update(
                owner.id,
                second.id,
                UpdateTicketRequest {
                    departure_at: Some(first.departure_at),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TicketError::Conflict(_)));
    }

    #[tokio::test]
    async fn only_owner_may_delete() {
        let owner = student("8888888888");
        let (service, repo) = service(vec![owner.clone()]);

        let ticket = service.create(owner.id, create_request(14)).await.unwrap();
        let err = service.delete(Uuid::new_v4(), ticket.id).await.unwrap_err();
        assert!(matches!(err, TicketError::Forbidden(_)));

        service.delete(owner.id, ticket.id).await.unwrap();
        assert!(repo.tickets.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_views_attach_owner() {
        let owner = student("8888888888");
        let (service, _) = service(vec![owner.clone()]);

        let ticket = service.create(owner.id, create_request(14)).await.unwrap();
        let view = service.get_with_owner(ticket.id).await.unwrap();
        assert_eq!(view.owner.name, "Asha");
        assert_eq!(view.owner.batch, "2024");

        let views = service.list_with_owner(owner.id).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].ticket.id, ticket.id);
    }
}
