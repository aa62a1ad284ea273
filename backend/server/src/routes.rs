use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use bank::{Message, Note, NoteInput};
use chrono::Utc;
use tracing::{debug, info};

use crate::{
    config::MissingNotePolicy,
    database::NoteRecord,
    error::{Action, AppError},
    state::AppState,
};

type NoteBody = Result<Json<NoteInput>, JsonRejection>;

fn validate(payload: NoteBody) -> Result<NoteInput, AppError> {
    let Json(input) = payload?;

    if !input.is_complete() {
        return Err(AppError::MissingFields);
    }

    Ok(input)
}

fn confirm_or_missing(
    policy: MissingNotePolicy,
    existed: bool,
    message: &str,
) -> Result<Json<Message>, AppError> {
    match (existed, policy) {
        (false, MissingNotePolicy::NotFound) => Err(AppError::NotFound),
        _ => Ok(Json(Message::new(message))),
    }
}

pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    payload: NoteBody,
) -> Result<Json<Note>, AppError> {
    let input = validate(payload)?;
    let record = NoteRecord::new(input, Utc::now());

    let id = state
        .store
        .add(record.clone())
        .await
        .map_err(AppError::store(Action::Create))?;

    info!(%id, "Created note");
    Ok(Json(record.into_note(id)))
}

pub async fn list_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Note>>, AppError> {
    let notes = state
        .store
        .list()
        .await
        .map_err(AppError::store(Action::FetchAll))?;

    debug!(count = notes.len(), "Listed notes");
    Ok(Json(notes))
}

pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Note>, AppError> {
    state
        .store
        .get(&id)
        .await
        .map_err(AppError::store(Action::FetchOne))?
        .map(Json)
        .ok_or(AppError::NotFound)
}

pub async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: NoteBody,
) -> Result<Json<Message>, AppError> {
    let input = validate(payload)?;

    let existed = state
        .store
        .update(&id, input)
        .await
        .map_err(AppError::store(Action::Update))?;

    if existed {
        info!(%id, "Updated note");
    }

    confirm_or_missing(
        state.config.missing_note_policy,
        existed,
        "Note updated successfully",
    )
}

pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Message>, AppError> {
    let existed = state
        .store
        .delete(&id)
        .await
        .map_err(AppError::store(Action::Delete))?;

    if existed {
        info!(%id, "Deleted note");
    }

    confirm_or_missing(
        state.config.missing_note_policy,
        existed,
        "Note deleted successfully",
    )
}
