//! Read status (status baca) and list filters
//!
//! Provides a strongly-typed enum for the read state instead of raw
//! strings, plus the inbox status filter and mailbox kind that shape
//! the `GET /surat` query.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Read state of a surat.
///
/// # Examples
///
/// ```
/// use surat_client::ReadStatus;
///
/// assert_eq!(ReadStatus::Unread.as_str(), "belum dibaca");
/// assert_eq!(ReadStatus::Unread.toggled(), ReadStatus::Read);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadStatus {
    /// Mail has been opened (`dibaca`).
    #[serde(rename = "dibaca")]
    Read,
    /// Mail has not been opened yet (`belum dibaca`).
    #[serde(rename = "belum dibaca")]
    Unread,
}

impl ReadStatus {
    /// The wire representation used by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "dibaca",
            Self::Unread => "belum dibaca",
        }
    }

    /// The opposite state.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Read => Self::Unread,
            Self::Unread => Self::Read,
        }
    }
}

impl fmt::Display for ReadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbox status filter.
///
/// `All` sends no `status` parameter at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ReadStatus),
}

impl StatusFilter {
    /// The `status` query value, if any.
    #[must_use]
    pub const fn query_value(self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Only(status) => Some(status.as_str()),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "semua" => Ok(Self::All),
            "read" | "dibaca" => Ok(Self::Only(ReadStatus::Read)),
            "unread" | "belum dibaca" | "belum-dibaca" => Ok(Self::Only(ReadStatus::Unread)),
            other => Err(format!(
                "unknown status filter '{other}' (expected all, read or unread)"
            )),
        }
    }
}

/// Which side of the conversation a mailbox lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MailboxKind {
    /// Mail received by the session user.
    Inbox,
    /// Mail sent by the session user.
    Sent,
}

impl MailboxKind {
    /// The `type` query value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Sent => "sent",
        }
    }
}

impl fmt::Display for MailboxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
