use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered student. Owned by the identity layer; the matching engine
/// only ever reads name/batch/email for candidate enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub batch: String,
    pub email: String,
    pub phone_number: String,
}
