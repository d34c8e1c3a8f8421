//! REST client for the surat backend
//!
//! Every request goes through [`ApiClient::authed`], which reads the
//! bearer token from the [`TokenStore`] at call time. The client does
//! not retry and does not cache.

use crate::compose::{Letter, LetterKind, PDF_MIME};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::model::{ActivityLog, AuthResponse, SentSurat, Surat, User};
use crate::status::{MailboxKind, ReadStatus, StatusFilter};
use crate::store::TokenStore;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};

/// Parameters of a `GET /surat` list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuratQuery {
    pub kind: MailboxKind,
    pub status: StatusFilter,
    pub search: String,
}

impl SuratQuery {
    #[must_use]
    pub const fn new(kind: MailboxKind) -> Self {
        Self {
            kind,
            status: StatusFilter::All,
            search: String::new(),
        }
    }

    /// Query pairs in the order the backend documents them.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("type", self.kind.as_str().to_string())];
        if let Some(status) = self.status.query_value() {
            pairs.push(("status", status.to_string()));
        }
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        pairs
    }
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAccount {
    #[serde(rename = "nama")]
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct StatusUpdate {
    status_baca: ReadStatus,
}

/// HTTP gateway to the backend.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: &str, store: Arc<dyn TokenStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        }
    }

    #[must_use]
    pub fn from_config(config: &ClientConfig, store: Arc<dyn TokenStore>) -> Self {
        Self::new(&config.base_url, store)
    }

    /// Exchange credentials for a token
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the credentials are
    /// rejected.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let req = self
            .http
            .post(self.url("/auth/login"))
            .json(&Credentials { email, password });
        let auth: AuthResponse = self.send_json(req).await?;
        info!("Login accepted for user {}", auth.user_id);
        Ok(auth)
    }

    /// Create an account
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses
    /// the account.
    pub async fn register(&self, account: &NewAccount) -> Result<()> {
        let req = self.http.post(self.url("/auth/register")).json(account);
        self.send_empty(req).await
    }

    /// List every user (recipient candidates)
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let req = self.http.get(self.url("/auth/users"));
        self.send_json(req).await
    }

    /// Fetch the session user's audit trail
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    pub async fn activity_logs(&self) -> Result<Vec<ActivityLog>> {
        let req = self.http.get(self.url("/me/activity-logs"));
        self.send_json(req).await
    }

    /// List mail matching `query`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    pub async fn list_surat(&self, query: &SuratQuery) -> Result<Vec<Surat>> {
        let req = self.http.get(self.url("/surat")).query(&query.pairs());
        let list: Vec<Surat> = self.send_json(req).await?;
        debug!("Fetched {} {} mail(s)", list.len(), query.kind);
        Ok(list)
    }

    /// Send a validated letter as a multipart submission
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects
    /// the letter.
    pub async fn send_surat(&self, letter: &Letter) -> Result<SentSurat> {
        let mut form = Form::new()
            .text("penerimaEmail", letter.recipient_email.clone())
            .text("subject", letter.subject.clone())
            .text("isi", letter.body.clone())
            .text("kategori_surat", letter.category().as_str());

        if let LetterKind::Formal { attachment } = &letter.kind {
            let part = Part::bytes(attachment.bytes.clone())
                .file_name(attachment.file_name.clone())
                .mime_str(PDF_MIME)?;
            form = form.part("pdfFile", part);
        }

        let req = self.http.post(self.url("/surat")).multipart(form);
        let sent: SentSurat = self.send_json(req).await?;
        info!("Surat {} sent to {}", sent.surat.id, letter.recipient_email);
        Ok(sent)
    }

    /// Set the read status of a mail
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses
    /// the update.
    pub async fn update_status(&self, id: &str, status: ReadStatus) -> Result<()> {
        let req = self
            .http
            .patch(self.url(&format!("/surat/{id}/status")))
            .json(&StatusUpdate {
                status_baca: status,
            });
        self.send_empty(req).await?;
        debug!("Surat {} marked {}", id, status);
        Ok(())
    }

    /// Delete a mail
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses
    /// the deletion.
    pub async fn delete_surat(&self, id: &str) -> Result<()> {
        let req = self.http.delete(self.url(&format!("/surat/{id}")));
        self.send_empty(req).await?;
        info!("Surat {} deleted", id);
        Ok(())
    }

    // -- private helpers --

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the bearer token when one is stored.
    fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        match self.store.token()? {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Ok(builder),
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let resp = self.authed(builder)?.send().await?;
        debug!("{} {}", resp.status(), resp.url().path());
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(api_error(resp).await)
        }
    }

    async fn send_json<R: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<R> {
        let resp = self.send(builder).await?;
        resp.json::<R>()
            .await
            .map_err(|e| Error::Decode(format!("response body: {e}")))
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        self.send(builder).await.map(drop)
    }
}

/// Turn a non-2xx response into [`Error::Api`], keeping the server's
/// `message` field when the body carries one.
async fn api_error(resp: Response) -> Error {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Error::Api {
        status,
        message: server_message(&body),
    }
}

/// Extract `message` from a JSON error body.
///
/// The backend sends either a string or, for validation failures, a
/// list of strings.
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("message")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(serde_json::Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}
