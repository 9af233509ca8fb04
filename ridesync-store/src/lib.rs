pub mod app_config;
pub mod database;
pub mod ticket_repo;
pub mod user_repo;

pub use database::DbClient;
pub use ticket_repo::PostgresTicketRepository;
pub use user_repo::PostgresUserRepository;
