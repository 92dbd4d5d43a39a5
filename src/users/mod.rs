/// User persistence.

mod store;

pub use store::PgUserStore;
pub use store::UserStore;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A stored user identity.
///
/// `token_version` is a monotonic counter bumped exactly once per password
/// change; it is the sole revocation mechanism for refresh tokens.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub token_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
