mod auth;
mod health_check;
mod notes;

pub use auth::{change_password, login, logout, me, refresh, register};
pub use health_check::health_check;
pub use notes::{create_note, delete_note, list_notes, retrieve_note, update_note};
