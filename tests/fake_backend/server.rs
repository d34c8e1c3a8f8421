//! In-process fake surat backend
//!
//! The router mirrors the REST surface the client uses:
//!
//! ```text
//!   POST   /auth/login            -> {accessToken, userId, nama}
//!   POST   /auth/register         -> 201 {message}
//!   GET    /auth/users            -> [User]
//!   GET    /me/activity-logs      -> [ActivityLog]
//!   GET    /surat?type&status&search -> [Surat]
//!   POST   /surat  (multipart)    -> 201 {message, surat}
//!   PATCH  /surat/{id}/status     -> Surat
//!   DELETE /surat/{id}            -> {message}
//! ```
//!
//! Errors are JSON bodies of the form `{"message": ...}` like the real
//! backend. Every request passes through a recording layer first, which
//! also serves failures queued with `BackendBuilder::fail`.

use super::data::{Backend, RecordedRequest, Upload};
use super::handlers;
use axum::Router;
use axum::extract::{DefaultBodyLimit, Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use surat_client::Surat;
use tokio::net::TcpListener;

pub type Shared = Arc<Mutex<Backend>>;

/// Multipart uploads above the client's 5MB limit still reach the
/// handler, so the server accepts more than that.
const BODY_LIMIT: usize = 16 * 1024 * 1024;

/// A fake backend listening on localhost with an OS-assigned port.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Shared,
    /// Handle to the background task so it lives as long as the server.
    _handle: tokio::task::JoinHandle<()>,
}

impl FakeBackend {
    /// Start serving `backend` on `127.0.0.1:0`.
    ///
    /// The server runs until the `FakeBackend` is dropped and the test
    /// runtime shuts down.
    pub async fn start(backend: Backend) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind to ephemeral port");
        let addr = listener.local_addr().unwrap();
        let state: Shared = Arc::new(Mutex::new(backend));

        let app = Router::new()
            .route("/auth/login", post(handlers::login))
            .route("/auth/register", post(handlers::register))
            .route("/auth/users", get(handlers::users))
            .route("/me/activity-logs", get(handlers::activity_logs))
            .route("/surat", get(handlers::list_surat).post(handlers::send_surat))
            .route("/surat/{id}/status", patch(handlers::update_status))
            .route("/surat/{id}", axum::routing::delete(handlers::delete_surat))
            .layer(DefaultBodyLimit::max(BODY_LIMIT))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            _handle: handle,
        }
    }

    /// Base URL to hand to the client.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Requests matching `method` and `path`.
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// The most recent `POST /surat` submission.
    pub fn last_upload(&self) -> Option<Upload> {
        self.state.lock().unwrap().uploads.last().cloned()
    }

    /// JSON bodies received by `POST /auth/register`.
    pub fn registrations(&self) -> Vec<serde_json::Value> {
        self.state.lock().unwrap().registrations.clone()
    }

    /// Current server-side copy of a mail.
    pub fn mail(&self, id: &str) -> Option<Surat> {
        self.state
            .lock()
            .unwrap()
            .mail
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }
}

/// Record the request, then either serve a queued failure or pass it on.
async fn record(State(state): State<Shared>, req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let query = Query::<HashMap<String, String>>::try_from_uri(req.uri())
        .map(|Query(q)| q)
        .unwrap_or_default();
    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let failure = {
        let mut backend = state.lock().unwrap();
        backend.requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query,
            authorization,
        });
        backend.take_failure(&method, &path)
    };

    match failure {
        Some(failure) => handlers::failure_response(&failure).into_response(),
        None => next.run(req).await,
    }
}
