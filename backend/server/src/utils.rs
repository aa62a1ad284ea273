use std::{
    fs::{File, OpenOptions},
    path::Path,
    sync::Arc,
    time::Instant,
};

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry,
    util::SubscriberInitExt,
};

use crate::config::LogSettings;

/// One access-log line per request.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        warn!(%method, %path, status, latency_ms, "Request failed");
    } else {
        info!(%method, %path, status, latency_ms, "Request served");
    }

    response
}

/// Console output per `settings.json`, plus error-level events appended to `settings.error_log`.
pub fn init_tracing<W>(settings: &LogSettings, writer: W)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = if settings.json {
        fmt::layer().json().with_writer(writer).boxed()
    } else {
        fmt::layer().with_writer(writer).boxed()
    };

    let (error_file, open_error) = match settings.error_log.as_deref().map(open_error_log) {
        Some(Ok(file)) => (Some(file), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };
    let error_layer = error_file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Arc::new(file))
            .with_filter(LevelFilter::ERROR)
    });

    let result = registry()
        .with(filter)
        .with(console)
        .with(error_layer)
        .try_init();

    if result.is_err() {
        warn!("Tracing subscriber already installed");
    }

    if let (Some(path), Some(e)) = (&settings.error_log, open_error) {
        warn!("Failed to open error log {}: {e}", path.display());
    }
}

fn open_error_log(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
