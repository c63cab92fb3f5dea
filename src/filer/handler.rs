//! File serving handlers with basic auth.

use std::path::{Component, Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::config::FilerConfig;
use crate::liveness::LivenessTracker;

/// Shared state for the filer handlers.
pub struct FilerState {
    root: PathBuf,
    username: String,
    password: String,
    tracker: Arc<LivenessTracker>,
}

impl FilerState {
    pub fn new(config: &FilerConfig, tracker: Arc<LivenessTracker>) -> Self {
        Self {
            root: config.root.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            tracker,
        }
    }
}

/// Build the filer router: every route behind basic auth, upload bodies
/// capped at `upload_limit` bytes.
pub fn router(state: Arc<FilerState>, upload_limit: usize) -> Router {
    let routes = get(serve_entry)
        .post(upload)
        .delete(delete_entry)
        .options(preflight);

    Router::new()
        .route("/", routes.clone())
        .route("/{*path}", routes)
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Check credentials and record activity before any handler runs.
///
/// Unauthenticated traffic is answered with a challenge and does NOT reset
/// the inactivity window.
async fn require_auth(
    State(state): State<Arc<FilerState>>,
    request: Request,
    next: Next,
) -> Response {
    if authorized(&state, request.headers()) {
        state.tracker.record();
        return next.run(request).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        [(
            header::WWW_AUTHENTICATE,
            r#"Basic realm="restricted", charset="UTF-8""#,
        )],
        "Unauthorized",
    )
        .into_response()
}

fn authorized(state: &FilerState, headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let Some(encoded) = value.strip_prefix("Basic ") else {
        return false;
    };
    let Ok(decoded) = BASE64.decode(encoded.trim()) else {
        return false;
    };
    let Ok(credentials) = String::from_utf8(decoded) else {
        return false;
    };

    match credentials.split_once(':') {
        Some((user, pass)) => user == state.username && pass == state.password,
        None => false,
    }
}

/// Join the request path onto the root, refusing anything that could step
/// outside it.
fn resolve(root: &FsPath, request_path: &str) -> Option<PathBuf> {
    let mut full = root.to_path_buf();
    for component in FsPath::new(request_path).components() {
        match component {
            Component::Normal(part) => full.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(full)
}

#[derive(Debug, Deserialize)]
struct ActionParams {
    action: Option<String>,
}

async fn serve_entry(
    State(state): State<Arc<FilerState>>,
    path: Option<Path<String>>,
    Query(params): Query<ActionParams>,
) -> Response {
    let rel = path.map(|Path(p)| p).unwrap_or_default();
    let Some(target) = resolve(&state.root, &rel) else {
        return (StatusCode::BAD_REQUEST, "Invalid path").into_response();
    };

    match params.action.as_deref() {
        Some("get") => get_file(&target).await,
        Some("list") => list_dir(&target).await,
        action => (
            StatusCode::BAD_REQUEST,
            format!("Unsupported action {}", action.unwrap_or_default()),
        )
            .into_response(),
    }
}

async fn get_file(target: &FsPath) -> Response {
    let meta = match tokio::fs::metadata(target).await {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return (StatusCode::NOT_FOUND, "Not Found").into_response();
        }
        Err(err) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal Server Error: {err}"),
            )
                .into_response();
        }
    };

    if meta.is_dir() {
        return (
            StatusCode::NOT_FOUND,
            format!("Path {} is a directory, not a file", target.display()),
        )
            .into_response();
    }

    match tokio::fs::read(target).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            bytes,
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal Server Error: {err}"),
        )
            .into_response(),
    }
}

#[derive(Debug, Serialize)]
struct ListEntry {
    name: String,
    #[serde(rename = "type")]
    kind: &'static str,
    size: u64,
    timestamp: String,
}

fn describe(name: String, meta: &std::fs::Metadata) -> ListEntry {
    let timestamp = meta
        .modified()
        .map(|t| DateTime::<Utc>::from(t).to_rfc3339())
        .unwrap_or_default();

    ListEntry {
        name,
        kind: if meta.is_dir() { "dir" } else { "file" },
        size: meta.len(),
        timestamp,
    }
}

async fn list_dir(target: &FsPath) -> Response {
    let mut entries = Vec::new();

    match tokio::fs::read_dir(target).await {
        Ok(mut dir) => {
            while let Ok(Some(entry)) = dir.next_entry().await {
                if let Ok(meta) = entry.metadata().await {
                    entries.push(describe(
                        entry.file_name().to_string_lossy().into_owned(),
                        &meta,
                    ));
                }
            }
        }
        // Listing a plain file yields a single entry describing it.
        Err(_) => match tokio::fs::metadata(target).await {
            Ok(meta) if !meta.is_dir() => {
                let name = target
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                entries.push(describe(name, &meta));
            }
            Ok(_) => {}
            Err(err) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal Server Error: {err}"),
                )
                    .into_response();
            }
        },
    }

    Json(entries).into_response()
}

async fn upload(
    State(state): State<Arc<FilerState>>,
    path: Option<Path<String>>,
    mut multipart: Multipart,
) -> Response {
    let rel = path.map(|Path(p)| p).unwrap_or_default();
    let Some(target) = resolve(&state.root, &rel) else {
        return (StatusCode::BAD_REQUEST, "Invalid path").into_response();
    };

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                // Only file parts are written; plain form fields are skipped.
                let Some(file_name) = field.file_name().map(sanitize_file_name) else {
                    continue;
                };
                if file_name.is_empty() {
                    continue;
                }

                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            format!("Parse multipart form error: {err}"),
                        )
                            .into_response();
                    }
                };

                if let Err(err) = tokio::fs::create_dir_all(&target).await {
                    return (StatusCode::BAD_REQUEST, format!("Upload file error: {err}"))
                        .into_response();
                }
                if let Err(err) = tokio::fs::write(target.join(&file_name), &bytes).await {
                    return (StatusCode::BAD_REQUEST, format!("Upload file error: {err}"))
                        .into_response();
                }
            }
            Ok(None) => break,
            Err(err) => {
                return (
                    StatusCode::BAD_REQUEST,
                    format!("Parse multipart form error: {err}"),
                )
                    .into_response();
            }
        }
    }

    StatusCode::OK.into_response()
}

/// Clients control the part's file name; keep only its final component.
fn sanitize_file_name(name: &str) -> String {
    FsPath::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

async fn delete_entry(
    State(state): State<Arc<FilerState>>,
    path: Option<Path<String>>,
) -> Response {
    let rel = path.map(|Path(p)| p).unwrap_or_default();
    let Some(target) = resolve(&state.root, &rel) else {
        return (StatusCode::BAD_REQUEST, "Invalid path").into_response();
    };

    let result = match tokio::fs::metadata(&target).await {
        Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(&target).await,
        Ok(_) => tokio::fs::remove_file(&target).await,
        // Removing something already absent is not an error.
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Delete file error: {err}"),
        )
            .into_response(),
    }
}

async fn preflight() -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (header::SERVER, "filer"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET,POST"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
        .into_response()
}
