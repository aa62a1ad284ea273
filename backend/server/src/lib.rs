//! Documentation of a small note-taking backend.
//!
//!
//!
//! # Resource API
//!
//! One collection, one record type. Each route makes exactly one store call.
//!
//! | Route | Store call | Success |
//! |---|---|---|
//! | `POST /notes` | `add` | the new note, with its generated `id` and `createdAt` |
//! | `GET /notes` | `list` | every note |
//! | `GET /notes/{id}` | `get` | the note, or `404 {"error":"Note not found"}` |
//! | `PUT /notes/{id}` | `update` | `{"message":"Note updated successfully"}` |
//! | `DELETE /notes/{id}` | `delete` | `{"message":"Note deleted successfully"}` |
//!
//! Store failures come back as `500 {"error": "Failed to <action> note(s)"}`, the
//! underlying error only goes to the log.
//!
//! PUT and DELETE on an id that does not exist still confirm unless
//! `MISSING_NOTE_POLICY=not_found` is set.
//!
//!
//!
//! # Notes
//!
//! ## No auth
//! Nothing here checks who is calling. Every route is open to anyone who can reach the port.
//!
//! ## Stale clients
//! Clients keep their own copy of the list and only splice in what their own requests return.
//! Two clients will drift until one of them refreshes.
//!
//!
//!
//! # Setup
//!
//! In-memory store.
//! ```sh
//! cargo run -p notes
//! ```
//!
//! Redis store.
//! ```sh
//! REDIS_URL=redis://127.0.0.1:6379 cargo run -p notes
//! ```
//!
//! Terminal client.
//! ```sh
//! cargo run -p client -- --api-url http://localhost:5000/notes
//! ```
//!
//! View docs.
//! ```sh
//! cargo doc --open
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    middleware,
    routing::get,
};

use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::fmt::MakeWriter;

pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod state;
pub mod utils;

use bank::NOTES_PATH;
use config::{Config, ConfigError, LogSettings, env_var};
use error::AppError;
use routes::{create_handler, delete_handler, get_handler, list_handler, update_handler};
use state::AppState;
use utils::{init_tracing, log_requests};

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(NOTES_PATH, get(list_handler).post(create_handler))
        .route(
            &format!("{NOTES_PATH}/{{id}}"),
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .layer(middleware::from_fn(log_requests))
        .layer(cors)
        .with_state(state)
}

/// Installs logging first so that config defaults and rejections are logged, then loads the config.
pub fn bootstrap<F, W>(lookup: F, writer: W) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    init_tracing(&LogSettings::from_lookup(&lookup), writer);

    Config::from_lookup(lookup)
}

pub async fn start_server() -> Result<(), AppError> {
    let config = bootstrap(env_var, std::io::stdout)?;

    info!("Initializing state...");
    let state = AppState::new(config).await?;

    info!("Starting server...");
    let router = app(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        } else {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
