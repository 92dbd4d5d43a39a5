use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::notes::{Note, Pagination};

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// List the user's notes, most recently updated first.
    async fn list(&self, user_id: Uuid, page: Pagination) -> Result<Vec<Note>, AppError>;

    async fn find(&self, id: Uuid) -> Result<Option<Note>, AppError>;

    async fn create(&self, user_id: Uuid, title: &str, content: &str)
        -> Result<Note, AppError>;

    /// Update a note owned by the user. Returns `None` when no such note
    /// exists for them.
    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Option<Note>, AppError>;

    /// Delete a note owned by the user. Returns whether a row was removed.
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError>;
}

/// Postgres-backed note store.
pub struct PgNoteStore {
    pool: PgPool,
}

impl PgNoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type NoteRow = (
    Uuid,
    Uuid,
    String,
    String,
    chrono::DateTime<Utc>,
    chrono::DateTime<Utc>,
);

fn note_from_row(row: NoteRow) -> Note {
    Note {
        id: row.0,
        user_id: row.1,
        title: row.2,
        content: row.3,
        created_at: row.4,
        updated_at: row.5,
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn list(&self, user_id: Uuid, page: Pagination) -> Result<Vec<Note>, AppError> {
        let rows = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT id, user_id, title, content, created_at, updated_at
            FROM notes WHERE user_id = $1
            ORDER BY updated_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.page_size)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(note_from_row).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Note>, AppError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT id, user_id, title, content, created_at, updated_at
            FROM notes WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(note_from_row))
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

        sqlx::query(
            r#"
            INSERT INTO notes (id, user_id, title, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(note.id)
        .bind(note.user_id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.created_at)
        .bind(note.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(note)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Option<Note>, AppError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            UPDATE notes
            SET title = $1, content = $2, updated_at = $3
            WHERE id = $4 AND user_id = $5
            RETURNING id, user_id, title, content, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(note_from_row))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
