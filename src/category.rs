//! Mail category (kategori surat)
//!
//! The backend stores the category as an Indonesian string. This
//! module gives it a strongly-typed enum so the formal/informal
//! distinction drives the compose rules instead of string compares.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of a surat.
///
/// Formal mail carries a PDF attachment; informal mail never does.
///
/// # Examples
///
/// ```
/// use surat_client::Category;
///
/// assert_eq!(Category::Formal.as_str(), "resmi");
/// assert_eq!("tidak resmi".parse::<Category>(), Ok(Category::Informal));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    /// Formal letter (`resmi`), requires a PDF attachment.
    #[serde(rename = "resmi")]
    Formal,
    /// Informal letter (`tidak resmi`).
    #[default]
    #[serde(rename = "tidak resmi")]
    Informal,
}

impl Category {
    /// The wire representation used by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Formal => "resmi",
            Self::Informal => "tidak resmi",
        }
    }

    /// Whether mail of this category must carry a PDF attachment.
    #[must_use]
    pub const fn requires_attachment(self) -> bool {
        matches!(self, Self::Formal)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts the wire names as well as `formal` / `informal`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resmi" | "formal" => Ok(Self::Formal),
            "tidak resmi" | "tidak-resmi" | "informal" => Ok(Self::Informal),
            other => Err(format!(
                "unknown category '{other}' (expected 'resmi' or 'tidak resmi')"
            )),
        }
    }
}
