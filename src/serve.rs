//! Purpose: Provide the HTTP/JSON catalog server for swatchbook.
//! Exports: `ServeConfig`, `serve`, `validate_config`.
//! Role: Axum-based server exposing the palette listing, tag, and creation routes.
//! Invariants: Response bodies match the catalog wire contract; error bodies are
//! Invariants: `{ "message": ... }` and statuses follow `status_for` exactly.
//! Invariants: The server holds no mutable state; every request hits the store fresh.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use swatchbook::api::{Catalog, Error, ErrorKind, ListParams, PaletteDraft, POPULAR_TAG_LIMIT};
use swatchbook::paths;

#[derive(Clone, Debug)]
pub struct ServeConfig {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
    pub cors_allowed_origins: Vec<String>,
    pub max_body_bytes: u64,
}

struct AppState {
    catalog: Catalog,
}

pub async fn serve(config: ServeConfig) -> Result<(), Error> {
    validate_config(&config)?;

    init_tracing();

    let max_body_bytes: usize = config
        .max_body_bytes
        .try_into()
        .map_err(|_| Error::new(ErrorKind::Usage).with_message("--max-body-bytes is too large"))?;
    let cors = cors_layer(&config.cors_allowed_origins)?;

    let state = Arc::new(AppState {
        catalog: Catalog::open(paths::store_file(&config.data_dir)),
    });

    tracing::info!(bind = %config.bind, store = %state.catalog.store_path().display(), "listening");

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/palettes", get(list_palettes).post(create_palette))
        .route("/api/palettes/tags", get(distinct_tags))
        .route("/api/tags", get(distinct_tags))
        .route("/api/tags/popular", get(popular_tags))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to bind server")
                .with_source(err)
        })?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            result.map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("server failed")
                    .with_source(err)
            })?;
        }
        _ = shutdown_signal() => {
            let _ = shutdown_tx.send(());
            match tokio::time::timeout(Duration::from_secs(10), &mut server).await {
                Ok(result) => result.map_err(|err| {
                    Error::new(ErrorKind::Io)
                        .with_message("server failed")
                        .with_source(err)
                })?,
                Err(_) => {
                    return Err(Error::new(ErrorKind::Io).with_message("server shutdown timed out"));
                }
            }
        }
    };
    Ok(())
}

pub fn validate_config(config: &ServeConfig) -> Result<(), Error> {
    if config.max_body_bytes == 0 {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("--max-body-bytes must be greater than zero")
            .with_hint("Use a positive value like 262144."));
    }

    for origin in &config.cors_allowed_origins {
        if origin.parse::<HeaderValue>().is_err() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("invalid CORS origin {origin:?}"))
                .with_hint("Use a full origin like https://example.com."));
        }
    }

    Ok(())
}

// The catalog fronts a browser gallery; an empty allowlist keeps the
// original any-origin posture, an explicit list narrows it.
fn cors_layer(origins: &[String]) -> Result<CorsLayer, Error> {
    if origins.is_empty() {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }
    let mut values = Vec::with_capacity(origins.len());
    for origin in origins {
        values.push(origin.parse::<HeaderValue>().map_err(|_| {
            Error::new(ErrorKind::Usage).with_message(format!("invalid CORS origin {origin:?}"))
        })?);
    }
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(values))
        .allow_methods(Any)
        .allow_headers(Any))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        let mut signal = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler");
        signal.recv().await;
    };
    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    #[cfg(not(unix))]
    ctrl_c.await;
}

#[derive(Debug, Deserialize)]
struct PopularQuery {
    limit: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

async fn healthz() -> Response {
    json_response(StatusCode::OK, &json!({ "status": "ok" }))
}

async fn list_palettes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Response {
    match state.catalog.list(&params) {
        Ok(page) => json_response(StatusCode::OK, &page),
        Err(err) => error_response(err),
    }
}

async fn distinct_tags(State(state): State<Arc<AppState>>) -> Response {
    match state.catalog.distinct_tags() {
        Ok(tags) => json_response(StatusCode::OK, &tags),
        Err(err) => error_response(err),
    }
}

async fn popular_tags(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PopularQuery>,
) -> Response {
    let limit = query
        .limit
        .as_deref()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value >= 1)
        .unwrap_or(POPULAR_TAG_LIMIT);
    match state.catalog.popular_tags(limit) {
        Ok(ranked) => json_response(StatusCode::OK, &ranked),
        Err(err) => error_response(err),
    }
}

async fn create_palette(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PaletteDraft>, JsonRejection>,
) -> Response {
    // Axum's default rejection body is plain text; the catalog contract
    // wants `{ message }` with a 400 (or 413 when the body limit tripped).
    let Json(draft) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                return json_response(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    &ErrorBody {
                        message: "request body too large".to_string(),
                    },
                );
            }
            return error_response(
                Error::new(ErrorKind::Validation)
                    .with_message(format!("invalid request body: {}", rejection.body_text())),
            );
        }
    };
    match state.catalog.add(&draft) {
        Ok(palette) => json_response(StatusCode::CREATED, &palette),
        Err(err) => error_response(err),
    }
}

fn json_response<T: Serialize>(status: StatusCode, payload: &T) -> Response {
    let mut response = (status, Json(payload)).into_response();
    response
        .headers_mut()
        .insert("swatchbook-version", HeaderValue::from_static("0"));
    response
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::InvalidQuery | ErrorKind::Usage => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Permission | ErrorKind::Corrupt | ErrorKind::Io | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: Error) -> Response {
    let body = ErrorBody {
        message: err.message().unwrap_or("error").to_string(),
    };
    json_response(status_for(err.kind()), &body)
}
