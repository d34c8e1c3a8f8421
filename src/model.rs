//! Records exchanged with the backend

use crate::category::Category;
use crate::status::ReadStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body preview length in list rows, in characters.
const PREVIEW_CHARS: usize = 100;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(rename = "nama")]
    pub name: String,
    pub email: String,
}

impl User {
    /// `Name (email)` as shown in headers and recipient pickers.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.email)
    }
}

/// A mail record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surat {
    pub id: String,
    pub subject: String,
    #[serde(rename = "isi", default)]
    pub body: Option<String>,
    #[serde(rename = "kategori_surat")]
    pub category: Category,
    #[serde(rename = "status_baca")]
    pub status: ReadStatus,
    #[serde(rename = "pdf_file_path", default)]
    pub pdf_path: Option<String>,
    #[serde(rename = "pengirimId", default)]
    pub sender_id: Option<String>,
    #[serde(rename = "pengirim")]
    pub sender: User,
    #[serde(rename = "penerimaId", default)]
    pub recipient_id: Option<String>,
    #[serde(rename = "penerima")]
    pub recipient: User,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Surat {
    #[must_use]
    pub fn is_unread(&self) -> bool {
        self.status == ReadStatus::Unread
    }

    /// The attachment URL, only for formal mail that carries one.
    #[must_use]
    pub fn attachment(&self) -> Option<&str> {
        match (self.category, self.pdf_path.as_deref()) {
            (Category::Formal, Some(path)) if !path.is_empty() => Some(path),
            _ => None,
        }
    }

    /// Body preview for list rows.
    #[must_use]
    pub fn preview(&self) -> String {
        match self.body.as_deref() {
            Some(body) if !body.is_empty() => {
                if body.chars().count() > PREVIEW_CHARS {
                    let head: String = body.chars().take(PREVIEW_CHARS).collect();
                    format!("{head}...")
                } else {
                    body.to_string()
                }
            }
            _ => "(no content)".to_string(),
        }
    }
}

/// One entry of the user's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub action: String,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user_id: String,
    #[serde(rename = "nama")]
    pub name: String,
}

/// Response of `POST /surat`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SentSurat {
    #[serde(default)]
    pub message: Option<String>,
    pub surat: Surat,
}
