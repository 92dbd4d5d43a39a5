/// In-memory store implementations for tests.
///
/// They honor the same contracts as the Postgres stores (email uniqueness,
/// single-update credential changes, ownership-scoped note mutations) so
/// unit and integration suites run without a database.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, DatabaseError};
use crate::notes::{Note, NoteStore, Pagination};
use crate::users::{UserRecord, UserStore};

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the stored records, for assertions.
    pub fn snapshot(&self) -> Vec<UserRecord> {
        self.users.lock().unwrap().clone()
    }

    /// Remove every record.
    pub fn clear(&self) {
        self.users.lock().unwrap().clear();
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRecord, AppError> {
        let mut users = self.users.lock().unwrap();

        if users.iter().any(|u| u.email == email) {
            return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                "users_email_key".to_string(),
            )));
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            token_version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        users.push(record.clone());

        Ok(record)
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        password_hash: &str,
        token_version: i32,
    ) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();

        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.password_hash = password_hash.to_string();
            user.token_version = token_version;
            user.updated_at = Utc::now();
        }

        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryNoteStore {
    notes: Mutex<Vec<Note>>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn list(&self, user_id: Uuid, page: Pagination) -> Result<Vec<Note>, AppError> {
        let notes = self.notes.lock().unwrap();

        let mut owned: Vec<Note> = notes
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(owned
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Note>, AppError> {
        let notes = self.notes.lock().unwrap();
        Ok(notes.iter().find(|n| n.id == id).cloned())
    }

    async fn create(
        &self,
        user_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Note, AppError> {
        let note = Note {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.notes.lock().unwrap().push(note.clone());

        Ok(note)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Option<Note>, AppError> {
        let mut notes = self.notes.lock().unwrap();

        if let Some(note) = notes
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        {
            note.title = title.to_string();
            note.content = content.to_string();
            note.updated_at = Utc::now();
            return Ok(Some(note.clone()));
        }

        Ok(None)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let mut notes = self.notes.lock().unwrap();
        let before = notes.len();
        notes.retain(|n| !(n.id == id && n.user_id == user_id));

        Ok(notes.len() < before)
    }
}
