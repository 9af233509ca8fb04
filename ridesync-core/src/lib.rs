pub mod repository;
pub mod ticket;
pub mod user;

pub use repository::{RepoError, TicketRepository, UserRepository};
pub use ticket::{TicketStatus, TravelTicket, TripDirection};
pub use user::User;
