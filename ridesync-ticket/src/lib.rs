pub mod models;
pub mod service;

pub use models::{CreateTicketRequest, TicketWithOwner, UpdateTicketRequest};
pub use service::{TicketError, TicketService};
