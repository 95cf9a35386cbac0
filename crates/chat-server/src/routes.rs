use std::sync::Arc;

use axum::body::Body;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::{Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use protocol::api::{ChatRequest, ChatResponse, SessionView, UploadResponse};
use tracing::{info, warn};

use crate::conversation::ConversationManager;
use crate::error::ServiceError;
use crate::report::parse_scan_report;

const REPORT_FIELD: &str = "file";

#[derive(Clone)]
pub(crate) struct AppState {
    conversations: Arc<ConversationManager>,
    max_upload_bytes: usize,
}

impl AppState {
    pub(crate) fn new(conversations: Arc<ConversationManager>, max_upload_bytes: usize) -> Self {
        Self {
            conversations,
            max_upload_bytes,
        }
    }
}

pub(crate) fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;
    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload_report))
        .route("/upload/", post(upload_report))
        .route("/chat", post(chat))
        .route("/chat/", post(chat))
        .route("/sessions/:id", get(get_session))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
        .layer(middleware::from_fn(allow_cors))
        .layer(middleware::from_fn(log_http_request))
}

async fn health() -> &'static str {
    "ok"
}

async fn upload_report(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ServiceError> {
    let mut multipart =
        multipart.map_err(|rejection| ServiceError::MalformedInput(rejection.body_text()))?;
    let raw = read_report_field(&mut multipart, state.max_upload_bytes).await?;
    let response = ingest_report(&state.conversations, &raw).await?;
    let sessions = state.conversations.session_count().await;
    info!(
        session_id = %response.session_id,
        report_bytes = raw.len(),
        findings = response.vulnerabilities.len(),
        sessions,
        "report ingested"
    );
    Ok(Json(response))
}

/// Returns the bytes of the `file` field, or of the first file-like field
/// when no field carries that name.
async fn read_report_field(
    multipart: &mut Multipart,
    limit: usize,
) -> Result<Vec<u8>, ServiceError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| multipart_failure(err, limit))?
    {
        let is_report = field.name() == Some(REPORT_FIELD) || field.file_name().is_some();
        if !is_report {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|err| multipart_failure(err, limit))?;
        return Ok(bytes.to_vec());
    }
    Err(ServiceError::MissingFile)
}

fn multipart_failure(err: MultipartError, limit: usize) -> ServiceError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(limit, "upload exceeds body limit");
        return ServiceError::PayloadTooLarge { limit };
    }
    ServiceError::MalformedInput(err.body_text())
}

pub(crate) async fn ingest_report(
    conversations: &ConversationManager,
    raw: &[u8],
) -> Result<UploadResponse, ServiceError> {
    let findings = parse_scan_report(raw)?;
    let started = conversations.start_session(&findings).await?;
    Ok(UploadResponse {
        session_id: started.session_id,
        vulnerabilities: findings,
        analysis: started.analysis,
    })
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ServiceError> {
    let Json(request) =
        payload.map_err(|rejection| ServiceError::MalformedInput(rejection.body_text()))?;
    let response = state
        .conversations
        .chat(&request.session_id, request.message)
        .await?;
    Ok(Json(ChatResponse { response }))
}

async fn get_session(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SessionView>, ServiceError> {
    state
        .conversations
        .session_view(&session_id)
        .await
        .map(Json)
        .ok_or(ServiceError::SessionNotFound)
}

// Any origin may call the API. Preflight requests are answered here and never
// reach the routes.
async fn allow_cors(req: Request<Body>, next: Next) -> Response {
    let origin = req.headers().get(header::ORIGIN).cloned();
    if req.method() == Method::OPTIONS {
        let requested_headers = req
            .headers()
            .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned();
        let mut response = StatusCode::NO_CONTENT.into_response();
        let headers = response.headers_mut();
        apply_cors_headers(headers, origin);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            requested_headers.unwrap_or_else(|| HeaderValue::from_static("*")),
        );
        headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("600"));
        return response;
    }
    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut(), origin);
    response
}

fn apply_cors_headers(headers: &mut HeaderMap, origin: Option<HeaderValue>) {
    match origin {
        // Credentialed requests need the concrete origin echoed back.
        Some(origin) => {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
            headers.append(header::VARY, HeaderValue::from_static("origin"));
        }
        None => {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            );
        }
    }
}

async fn log_http_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    let status = response.status();
    info!(
        method = %method,
        uri = %uri,
        status = %status,
        "http request"
    );
    response
}
