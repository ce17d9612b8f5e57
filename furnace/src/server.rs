//! The development server: static files from the build output with pretty
//! URLs, plus a server-sent-events channel that tells pages to reload.

use std::convert::Infallible;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use kiln::error;
use kiln::error::{Chainable, Result};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

pub const RELOAD_PATH: &str = "/__furnace/reload";
pub const CLIENT_PATH: &str = "/__furnace/client.js";

const CLIENT: &str = include_str!("../assets/client.js");

#[derive(Debug, Clone)]
pub struct DevServer {
    roots: Arc<[PathBuf]>,
    reload: broadcast::Sender<()>,
}

impl DevServer {
    /// Serves files from `roots`, earlier roots first.
    pub fn new(roots: Vec<PathBuf>, reload: broadcast::Sender<()>) -> Self {
        DevServer { roots: roots.into(), reload }
    }

    /// Maps a percent-encoded request path to a file: `<root>/<path>`, then
    /// `<root>/<path>.html`, then `<root>/<path>/index.html`, for each root.
    pub fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let decoded = urlencoding::decode(url_path).ok()?;
        let relative = Path::new(decoded.trim_start_matches('/'));
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return None;
        }

        self.roots.iter()
            .flat_map(|root| {
                let path = root.join(relative);
                let mut html = path.clone().into_os_string();
                html.push(".html");
                [path.clone(), PathBuf::from(html), path.join("index.html")]
            })
            .find(|candidate| candidate.is_file())
    }

    pub fn router(self) -> Router {
        Router::new()
            .route(RELOAD_PATH, get(reload))
            .route(CLIENT_PATH, get(client))
            .fallback(file)
            .with_state(self)
    }

    pub async fn serve(self, addr: String) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&addr).await.chain_with(|| error! {
            "failed to start the development server",
            "address" => &addr,
        })?;

        tracing::info!("serving at http://{addr}");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown())
            .await
            .chain_with(|| error!("development server failed", "address" => &addr))
    }
}

async fn shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }

    tracing::info!("shutting down");
}

async fn reload(State(server): State<DevServer>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!("reload client connected");
    let stream = BroadcastStream::new(server.reload.subscribe())
        .filter_map(|message| message.ok().map(|()| Ok(Event::default().data("reload"))));

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn client() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript"), (header::CACHE_CONTROL, "no-cache")], CLIENT)
}

async fn file(State(server): State<DevServer>, uri: Uri) -> Response {
    let Some(path) = server.resolve(uri.path()) else {
        tracing::debug!("not found: {}", uri.path());
        return (StatusCode::NOT_FOUND, format!("not found: {}", uri.path())).into_response();
    };

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("failed to read {}: {e}", path.display());
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let content_type = content_type(&path);
    let body = match content_type.starts_with("text/html") {
        true => inject_reload_script(&bytes),
        false => bytes,
    };

    ([(header::CONTENT_TYPE, content_type), (header::CACHE_CONTROL, "no-cache")], body).into_response()
}

/// Adds the reload client before the last `</body>`, or at the end of the
/// document if there is none.
pub fn inject_reload_script(html: &[u8]) -> Vec<u8> {
    let html = String::from_utf8_lossy(html);
    let tag = format!(r#"<script src="{CLIENT_PATH}"></script>"#);
    let mut result = String::with_capacity(html.len() + tag.len() + 1);
    match html.rfind("</body>") {
        Some(i) => {
            result.push_str(&html[..i]);
            result.push_str(&tag);
            result.push_str(&html[i..]);
        }
        None => {
            result.push_str(&html);
            result.push('\n');
            result.push_str(&tag);
        }
    }

    result.into_bytes()
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).unwrap_or_default() {
        "html" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "application/javascript",
        "json" | "map" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "woff" => "font/woff",
        "ttf" => "font/ttf",
        "eot" => "application/vnd.ms-fontobject",
        _ => "application/octet-stream",
    }
}
