//! Test data model for the fake backend
//!
//! ```ignore
//! let backend = BackendBuilder::new()
//!     .user("u1", "Budi", "budi@example.com", "rahasia")
//!     .user("u2", "Sari", "sari@example.com", "rahasia")
//!     .mail("s1", "u2", "u1", "Undangan", ReadStatus::Unread)
//!     .build();
//! ```
//!
//! Users are issued tokens `t1`, `t2`, ... in the order they are added.

use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use surat_client::{ActivityLog, Category, ReadStatus, Surat, User};

/// A registered account with its password and issued token.
#[derive(Debug, Clone)]
pub struct Account {
    pub user: User,
    pub password: String,
    pub token: String,
}

/// One request as seen by the server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
}

/// Multipart fields received by `POST /surat`.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub fields: HashMap<String, String>,
    /// `(file name, content type, size)` of the `pdfFile` part.
    pub file: Option<(String, String, usize)>,
}

/// A response to return once instead of handling the request.
#[derive(Debug, Clone)]
pub struct Failure {
    pub method: String,
    pub path: String,
    pub status: u16,
    pub message: Option<String>,
}

/// Complete backend state.
#[derive(Debug, Default)]
pub struct Backend {
    pub accounts: Vec<Account>,
    pub mail: Vec<Surat>,
    pub activity: Vec<ActivityLog>,
    pub requests: Vec<RecordedRequest>,
    pub uploads: Vec<Upload>,
    pub registrations: Vec<serde_json::Value>,
    pub failures: Vec<Failure>,
    pub next_id: usize,
}

impl Backend {
    pub fn account_by_token(&self, token: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.token == token)
    }

    pub fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.user.email == email)
    }

    fn user(&self, id: &str) -> User {
        self.accounts
            .iter()
            .find(|a| a.user.id == id)
            .map(|a| a.user.clone())
            .expect("mail refers to an unknown user id")
    }

    /// Take the first pending failure matching this request.
    pub fn take_failure(&mut self, method: &str, path: &str) -> Option<Failure> {
        let idx = self
            .failures
            .iter()
            .position(|f| f.method == method && f.path == path)?;
        Some(self.failures.remove(idx))
    }
}

/// Builder for constructing a `Backend` step by step.
pub struct BackendBuilder {
    backend: Backend,
    pending_mail: Vec<(String, String, String, String, ReadStatus, Category)>,
}

impl BackendBuilder {
    pub fn new() -> Self {
        Self {
            backend: Backend::default(),
            pending_mail: Vec::new(),
        }
    }

    /// Register a user. Its token is `t<n>` for the n-th user.
    pub fn user(mut self, id: &str, name: &str, email: &str, password: &str) -> Self {
        let token = format!("t{}", self.backend.accounts.len() + 1);
        self.backend.accounts.push(Account {
            user: User {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
            },
            password: password.to_string(),
            token,
        });
        self
    }

    /// Add an informal mail from `from` to `to`.
    pub fn mail(self, id: &str, from: &str, to: &str, subject: &str, status: ReadStatus) -> Self {
        self.mail_with(id, from, to, subject, status, Category::Informal)
    }

    /// Add a mail with an explicit category. Formal mail gets a PDF
    /// path.
    pub fn mail_with(
        mut self,
        id: &str,
        from: &str,
        to: &str,
        subject: &str,
        status: ReadStatus,
        category: Category,
    ) -> Self {
        self.pending_mail.push((
            id.to_string(),
            from.to_string(),
            to.to_string(),
            subject.to_string(),
            status,
            category,
        ));
        self
    }

    /// Add an activity entry for `user_id`.
    pub fn activity(
        mut self,
        id: &str,
        user_id: &str,
        action: &str,
        details: Option<serde_json::Value>,
    ) -> Self {
        self.backend.activity.push(ActivityLog {
            id: id.to_string(),
            user_id: Some(user_id.to_string()),
            action: action.to_string(),
            entity: Some("Surat".to_string()),
            entity_id: Some("s1".to_string()),
            details,
            ip_address: Some("127.0.0.1".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        });
        self
    }

    /// Make the next `method path` request fail with `status`.
    pub fn fail(mut self, method: &str, path: &str, status: u16, message: Option<&str>) -> Self {
        self.backend.failures.push(Failure {
            method: method.to_string(),
            path: path.to_string(),
            status,
            message: message.map(str::to_string),
        });
        self
    }

    /// Consume the builder and return the finished `Backend`.
    pub fn build(mut self) -> Backend {
        for (n, (id, from, to, subject, status, category)) in
            self.pending_mail.into_iter().enumerate()
        {
            let sender = self.backend.user(&from);
            let recipient = self.backend.user(&to);
            let minute = u32::try_from(n).unwrap();
            let pdf_path =
                (category == Category::Formal).then(|| format!("https://files.test/{id}.pdf"));
            self.backend.mail.push(Surat {
                id,
                body: Some(format!("Isi dari {subject}")),
                subject,
                category,
                status,
                pdf_path,
                sender_id: Some(sender.id.clone()),
                sender,
                recipient_id: Some(recipient.id.clone()),
                recipient,
                created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, minute, 0).unwrap(),
            });
        }
        self.backend.next_id = self.backend.mail.len() + 1;
        self.backend
    }
}
