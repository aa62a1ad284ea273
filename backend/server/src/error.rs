use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bank::ErrorBody;
use thiserror::Error;
use tracing::error;

use crate::{config::ConfigError, database::StoreError};

/// The store call a route was making when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    FetchAll,
    FetchOne,
    Update,
    Delete,
}

impl Action {
    pub fn failure_message(self) -> &'static str {
        match self {
            Action::Create => "Failed to create note",
            Action::FetchAll => "Failed to fetch notes",
            Action::FetchOne => "Failed to fetch note",
            Action::Update => "Failed to update note",
            Action::Delete => "Failed to delete note",
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Title and content are required")]
    MissingFields,

    #[error("Note not found")]
    NotFound,

    #[error("{}", .action.failure_message())]
    Store {
        action: Action,
        #[source]
        source: StoreError,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Startup failed: {0}")]
    Startup(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn store(action: Action) -> impl FnOnce(StoreError) -> Self {
        move |source| AppError::Store { action, source }
    }
}

impl From<JsonRejection> for AppError {
    fn from(_: JsonRejection) -> Self {
        AppError::MalformedPayload
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload | AppError::MissingFields => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Store { action, ref source } => {
                error!(?action, error = %source, "Store call failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Config(_) | AppError::Startup(_) | AppError::Io(_) => {
                error!(error = %self, "Unexpected error in request path");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
