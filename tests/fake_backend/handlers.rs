//! Endpoint handlers for the fake backend
//!
//! Handlers lock the shared state briefly and never hold the guard
//! across an `.await`.

use super::data::{Account, Backend, Failure, Upload};
use super::server::Shared;
use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::{Value, json};
use std::collections::HashMap;
use surat_client::{Category, ReadStatus, Surat, User};

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Response for a failure queued with `BackendBuilder::fail`. Without a
/// message the body is plain text, like a proxy error page.
pub fn failure_response(failure: &Failure) -> Response {
    let status = StatusCode::from_u16(failure.status).unwrap();
    match &failure.message {
        Some(message) => error(status, message),
        None => (status, "Internal Server Error").into_response(),
    }
}

/// Resolve the bearer token to a user.
fn current_user(backend: &Backend, headers: &HeaderMap) -> Result<User, Response> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| backend.account_by_token(token))
        .map(|account| account.user.clone())
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Unauthorized"))
}

pub async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let backend = state.lock().unwrap();
    match backend.account_by_email(email) {
        Some(account) if account.password == password => Json(json!({
            "accessToken": account.token,
            "userId": account.user.id,
            "nama": account.user.name,
        }))
        .into_response(),
        _ => error(StatusCode::UNAUTHORIZED, "Email atau password salah"),
    }
}

pub async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut backend = state.lock().unwrap();
    backend.registrations.push(body.clone());

    let email = body["email"].as_str().unwrap_or_default().to_string();
    if backend.account_by_email(&email).is_some() {
        return error(StatusCode::CONFLICT, "Email sudah terdaftar");
    }

    let n = backend.accounts.len() + 1;
    backend.accounts.push(Account {
        user: User {
            id: format!("u{n}"),
            name: body["nama"].as_str().unwrap_or_default().to_string(),
            email,
        },
        password: body["password"].as_str().unwrap_or_default().to_string(),
        token: format!("t{n}"),
    });
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Registrasi berhasil" })),
    )
        .into_response()
}

pub async fn users(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let backend = state.lock().unwrap();
    if let Err(resp) = current_user(&backend, &headers) {
        return resp;
    }
    let users: Vec<&User> = backend.accounts.iter().map(|a| &a.user).collect();
    Json(users).into_response()
}

pub async fn activity_logs(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let backend = state.lock().unwrap();
    let me = match current_user(&backend, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let logs: Vec<_> = backend
        .activity
        .iter()
        .filter(|log| log.user_id.as_deref() == Some(me.id.as_str()))
        .collect();
    Json(logs).into_response()
}

pub async fn list_surat(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let backend = state.lock().unwrap();
    let me = match current_user(&backend, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let sent = params.get("type").map(String::as_str) == Some("sent");
    let status = params.get("status").map(String::as_str);
    let search = params
        .get("search")
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    let mut list: Vec<&Surat> = backend
        .mail
        .iter()
        .filter(|m| {
            if sent {
                m.sender.id == me.id
            } else {
                m.recipient.id == me.id
            }
        })
        .filter(|m| status.is_none_or(|s| m.status.as_str() == s))
        .filter(|m| {
            search.is_empty()
                || m.subject.to_lowercase().contains(&search)
                || m.body
                    .as_deref()
                    .is_some_and(|b| b.to_lowercase().contains(&search))
        })
        .collect();
    list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(list).into_response()
}

pub async fn send_surat(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let me = {
        let backend = state.lock().unwrap();
        match current_user(&backend, &headers) {
            Ok(user) => user,
            Err(resp) => return resp,
        }
    };

    let mut upload = Upload::default();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "pdfFile" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.unwrap();
            upload.file = Some((file_name, content_type, bytes.len()));
        } else {
            let text = field.text().await.unwrap();
            upload.fields.insert(name, text);
        }
    }

    let mut backend = state.lock().unwrap();
    backend.uploads.push(upload.clone());

    let field = |key: &str| upload.fields.get(key).cloned().unwrap_or_default();
    let Some(recipient) = backend
        .account_by_email(&field("penerimaEmail"))
        .map(|a| a.user.clone())
    else {
        return error(StatusCode::NOT_FOUND, "Penerima tidak ditemukan");
    };
    let Ok(category) = field("kategori_surat").parse::<Category>() else {
        return error(
            StatusCode::BAD_REQUEST,
            "kategori_surat must be one of: resmi, tidak resmi",
        );
    };
    if category == Category::Formal && upload.file.is_none() {
        return error(StatusCode::BAD_REQUEST, "File PDF wajib untuk surat resmi");
    }

    let id = format!("s{}", backend.next_id);
    backend.next_id += 1;
    let body = field("isi");
    let surat = Surat {
        id,
        subject: field("subject"),
        body: (!body.is_empty()).then_some(body),
        category,
        status: ReadStatus::Unread,
        pdf_path: upload
            .file
            .as_ref()
            .map(|(name, _, _)| format!("https://files.test/{name}")),
        sender_id: Some(me.id.clone()),
        sender: me,
        recipient_id: Some(recipient.id.clone()),
        recipient,
        created_at: Utc::now(),
    };
    backend.mail.push(surat.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Surat berhasil dikirim", "surat": surat })),
    )
        .into_response()
}

pub async fn update_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = state.lock().unwrap();
    let me = match current_user(&backend, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let Ok(status) = serde_json::from_value::<ReadStatus>(body["status_baca"].clone()) else {
        return error(StatusCode::BAD_REQUEST, "status_baca tidak valid");
    };
    match backend
        .mail
        .iter_mut()
        .find(|m| m.id == id && m.recipient.id == me.id)
    {
        Some(mail) => {
            mail.status = status;
            Json(mail.clone()).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Surat tidak ditemukan"),
    }
}

pub async fn delete_surat(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut backend = state.lock().unwrap();
    let me = match current_user(&backend, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let before = backend.mail.len();
    backend
        .mail
        .retain(|m| !(m.id == id && (m.sender.id == me.id || m.recipient.id == me.id)));
    if backend.mail.len() == before {
        return error(StatusCode::NOT_FOUND, "Surat tidak ditemukan");
    }
    Json(json!({ "message": "Surat berhasil dihapus" })).into_response()
}
