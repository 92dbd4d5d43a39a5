/// Note routes — the protected resource.
///
/// Every handler runs behind the auth gate; ownership is enforced so a
/// foreign note answers 404 rather than leaking its existence.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, DatabaseError, ValidationError};
use crate::middleware::CurrentUser;
use crate::notes::{Note, NoteStore, Pagination};
use crate::routes::auth::MessageResponse;

#[derive(Deserialize)]
pub struct NoteForm {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Serialize)]
pub struct NoteResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id.to_string(),
            title: note.title,
            content: note.content,
            created_at: note.created_at.to_rfc3339(),
            updated_at: note.updated_at.to_rfc3339(),
        }
    }
}

fn note_not_found() -> AppError {
    AppError::Database(DatabaseError::NotFound("note".to_string()))
}

fn valid_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("title"));
    }
    Ok(trimmed.to_string())
}

/// GET /api/v1/notes (protected)
pub async fn list_notes(
    user: web::ReqData<CurrentUser>,
    query: web::Query<PageQuery>,
    store: web::Data<dyn NoteStore>,
) -> Result<HttpResponse, AppError> {
    let page = Pagination::new(query.page, query.page_size);
    let notes = store.list(user.id, page).await?;

    let body: Vec<NoteResponse> = notes.into_iter().map(NoteResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/v1/notes/{id} (protected)
pub async fn retrieve_note(
    user: web::ReqData<CurrentUser>,
    path: web::Path<Uuid>,
    store: web::Data<dyn NoteStore>,
) -> Result<HttpResponse, AppError> {
    let note = store
        .find(path.into_inner())
        .await?
        .filter(|note| note.user_id == user.id)
        .ok_or_else(note_not_found)?;

    Ok(HttpResponse::Ok().json(NoteResponse::from(note)))
}

/// POST /api/v1/notes (protected)
pub async fn create_note(
    user: web::ReqData<CurrentUser>,
    form: web::Json<NoteForm>,
    store: web::Data<dyn NoteStore>,
) -> Result<HttpResponse, AppError> {
    let title = valid_title(&form.title)?;

    let note = store.create(user.id, &title, &form.content).await?;

    Ok(HttpResponse::Created().json(NoteResponse::from(note)))
}

/// PUT /api/v1/notes/{id} (protected)
pub async fn update_note(
    user: web::ReqData<CurrentUser>,
    path: web::Path<Uuid>,
    form: web::Json<NoteForm>,
    store: web::Data<dyn NoteStore>,
) -> Result<HttpResponse, AppError> {
    let title = valid_title(&form.title)?;

    let note = store
        .update(path.into_inner(), user.id, &title, &form.content)
        .await?
        .ok_or_else(note_not_found)?;

    Ok(HttpResponse::Ok().json(NoteResponse::from(note)))
}

/// DELETE /api/v1/notes/{id} (protected)
pub async fn delete_note(
    user: web::ReqData<CurrentUser>,
    path: web::Path<Uuid>,
    store: web::Data<dyn NoteStore>,
) -> Result<HttpResponse, AppError> {
    let removed = store.delete(path.into_inner(), user.id).await?;
    if !removed {
        return Err(note_not_found());
    }

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Note removed".to_string(),
    }))
}
