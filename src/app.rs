use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::CorsLayer;

use crate::error::{AppError, Result};
use crate::snapshot::SnapshotCache;
use crate::worker::Event;

/// Shared with every request handler. The web view never touches the
/// workbook: reads come from the cache, refreshes are forwarded to the
/// foreground worker.
pub struct AppState {
    cache: Arc<SnapshotCache>,
    foreground: Option<Sender<Event>>,
}

impl AppState {
    pub fn new(cache: Arc<SnapshotCache>, foreground: Option<Sender<Event>>) -> Self {
        AppState { cache, foreground }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    message: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_landing))
        .route("/api/data", get(get_data))
        .route("/api/refresh", post(refresh_data))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the web view from a dedicated background thread.
///
/// Binding happens on the calling thread so that an address already in use
/// is reported to the caller.
pub fn spawn_server(
    addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = std::net::TcpListener::bind(addr)?;
    listener.set_nonblocking(true)?;
    let local = listener.local_addr()?;

    let handle = thread::Builder::new()
        .name("web".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("failed to start web runtime: {}", e);
                    return;
                }
            };
            let served = runtime.block_on(async move {
                let listener = TcpListener::from_std(listener)?;
                axum::serve(listener, router(state)).await
            });
            if let Err(e) = served {
                log::error!("web view stopped: {}", e);
            }
        })?;

    log::info!("web view listening on http://{}", local);
    Ok((local, handle))
}

async fn serve_landing() -> Html<&'static str> {
    Html(include_str!("./static/index.html"))
}

async fn get_data(State(state): State<Arc<AppState>>) -> Response {
    if !state.cache.is_attached() {
        return error(StatusCode::BAD_REQUEST, "No workbook loaded");
    }
    match state.cache.get() {
        Some(snapshot) => Json(&*snapshot).into_response(),
        None => error(StatusCode::NOT_FOUND, "No data available"),
    }
}

async fn refresh_data(State(state): State<Arc<AppState>>) -> Response {
    match request_refresh(&state).await {
        Ok(()) => Json(StatusResponse {
            status: "success".to_string(),
            message: "Données actualisées".to_string(),
        })
        .into_response(),
        Err(message) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StatusResponse {
                status: "error".to_string(),
                message,
            }),
        )
            .into_response(),
    }
}

async fn request_refresh(state: &AppState) -> std::result::Result<(), String> {
    let unavailable = || AppError::ForegroundUnavailable.to_string();
    let foreground = state.foreground.as_ref().ok_or_else(unavailable)?;
    let (tx, rx) = oneshot::channel();
    foreground
        .send(Event::Refresh(tx))
        .map_err(|_| unavailable())?;
    rx.await.map_err(|_| unavailable())?
}

fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
