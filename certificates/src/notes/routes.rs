use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use crate::{
    capture::{export_file_name, ImageData, PNG_MIME},
    extract::{Json, Path, Query},
    state::AppState,
    Error, Result,
};

use super::{
    model::{DeleteNoteQuery, DeleteNoteResponse, FindNotesResponse, NoteIdPath, RenderedNote},
    Note, NoteDraft, NoteStore,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/notes", get(find_notes).post(create_note))
        .route(
            "/api/v1/notes/{note_id}",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route("/api/v1/notes/{note_id}/export", post(export_note))
        .with_state(state)
}

async fn find_notes(State(store): State<NoteStore>) -> Json<FindNotesResponse> {
    Json(FindNotesResponse {
        results: store.find_notes().await,
    })
}

async fn create_note(State(store): State<NoteStore>, Json(draft): Json<NoteDraft>) -> Result<(StatusCode, Json<Note>)> {
    store.create_note(draft).await.map(|note| (StatusCode::CREATED, Json(note)))
}

async fn get_note(State(store): State<NoteStore>, Path(NoteIdPath { note_id }): Path<NoteIdPath>) -> Result<Json<Note>> {
    store.get_note(note_id).await.map(Json)
}

async fn update_note(
    State(store): State<NoteStore>,
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    Json(draft): Json<NoteDraft>,
) -> Result<Json<Note>> {
    store.update_note(note_id, draft).await.map(Json)
}

async fn delete_note(
    State(store): State<NoteStore>,
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    Query(DeleteNoteQuery { confirm }): Query<DeleteNoteQuery>,
) -> Result<Json<DeleteNoteResponse>> {
    if !confirm {
        return Err(Error::ConfirmationRequired);
    }

    let deleted = store.delete_note(note_id).await?;
    Ok(Json(DeleteNoteResponse { deleted }))
}

/// Serves the rendered note back as a downloadable PNG.
async fn export_note(
    State(store): State<NoteStore>,
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    Json(rendered): Json<RenderedNote>,
) -> Result<impl IntoResponse> {
    let note = store.get_note(note_id).await?;
    let image = ImageData::from_data_uri(&rendered.image)?.require_png()?;

    let headers = [
        (header::CONTENT_TYPE, PNG_MIME.to_owned()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export_file_name(note.id)),
        ),
    ];

    Ok((headers, image.bytes().to_vec()))
}
