use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ridesync_core::ticket::utc_day_bounds;
use ridesync_core::{RepoError, TicketRepository, TicketStatus, TravelTicket, TripDirection};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PostgresTicketRepository {
    pub pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    source: String,
    destination: String,
    empty_seats: i32,
    departure_at: DateTime<Utc>,
    time_diff_mins: i64,
    user_id: Uuid,
    phone_number: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TicketRow> for TravelTicket {
    fn from(row: TicketRow) -> Self {
        TravelTicket {
            id: row.id,
            source: row.source,
            destination: row.destination,
            empty_seats: row.empty_seats,
            departure_at: row.departure_at,
            time_diff_mins: row.time_diff_mins,
            user_id: row.user_id,
            phone_number: row.phone_number,
            status: row.status.parse().unwrap_or(TicketStatus::Open),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const TICKET_COLUMNS: &str = "id, source, destination, empty_seats, departure_at, \
     time_diff_mins, user_id, phone_number, status, created_at, updated_at";

#[async_trait]
impl TicketRepository for PostgresTicketRepository {
    async fn create(&self, ticket: &TravelTicket) -> Result<TravelTicket, RepoError> {
        sqlx::query(
            r#"
            INSERT INTO travel_tickets
                (id, source, destination, empty_seats, departure_at,
                 time_diff_mins, user_id, phone_number, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(ticket.id)
        .bind(&ticket.source)
        .bind(&ticket.destination)
        .bind(ticket.empty_seats)
        .bind(ticket.departure_at)
        .bind(ticket.time_diff_mins)
        .bind(ticket.user_id)
        .bind(&ticket.phone_number)
        .bind(ticket.status.to_string())
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(ticket.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<TravelTicket>, RepoError> {
        let row = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {} FROM travel_tickets WHERE id = $1",
            TICKET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TravelTicket::from))
    }

    async fn get_all(&self) -> Result<Vec<TravelTicket>, RepoError> {
        let rows = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {} FROM travel_tickets ORDER BY departure_at",
            TICKET_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TravelTicket::from).collect())
    }

    async fn get_by_user(&self, user_id: Uuid) -> Result<Vec<TravelTicket>, RepoError> {
        let rows = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {} FROM travel_tickets WHERE user_id = $1 ORDER BY departure_at",
            TICKET_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TravelTicket::from).collect())
    }

    async fn update(&self, ticket: &TravelTicket) -> Result<TravelTicket, RepoError> {
        sqlx::query(
            r#"
            UPDATE travel_tickets
            SET source = $2, destination = $3, empty_seats = $4, departure_at = $5,
                time_diff_mins = $6, phone_number = $7, status = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(ticket.id)
        .bind(&ticket.source)
        .bind(&ticket.destination)
        .bind(ticket.empty_seats)
        .bind(ticket.departure_at)
        .bind(ticket.time_diff_mins)
        .bind(&ticket.phone_number)
        .bind(ticket.status.to_string())
        .bind(ticket.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(ticket.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM travel_tickets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64, RepoError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM travel_tickets WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn exists_for_user_on_date(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<bool, RepoError> {
        let (day_start, day_end) = utc_day_bounds(day);
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM travel_tickets
            WHERE user_id = $1
              AND departure_at >= $2 AND departure_at < $3
              AND ($4::uuid IS NULL OR id <> $4)
            "#,
        )
        .bind(user_id)
        .bind(day_start)
        .bind(day_end)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn find_same_day_complementary(
        &self,
        direction: TripDirection,
        endpoints: &[String],
        day: NaiveDate,
        exclude: Uuid,
    ) -> Result<Vec<TravelTicket>, RepoError> {
        let (day_start, day_end) = utc_day_bounds(day);
        // Return-trip targets share a pickup (source); outbound targets
        // share a drop-off (destination).
        let sql = match direction {
            TripDirection::Return => format!(
                "SELECT {} FROM travel_tickets \
                 WHERE source = ANY($1) AND status = 'open' \
                   AND departure_at >= $2 AND departure_at < $3 AND id <> $4 \
                 ORDER BY created_at",
                TICKET_COLUMNS
            ),
            TripDirection::Outbound => format!(
                "SELECT {} FROM travel_tickets \
                 WHERE destination = ANY($1) AND status = 'open' \
                   AND departure_at >= $2 AND departure_at < $3 AND id <> $4 \
                 ORDER BY created_at",
                TICKET_COLUMNS
            ),
        };

        let rows = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(endpoints)
            .bind(day_start)
            .bind(day_end)
            .bind(exclude)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(TravelTicket::from).collect())
    }
}
