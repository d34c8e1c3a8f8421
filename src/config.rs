//! Backend connection configuration

use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Connection configuration for the surat backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend, without a trailing `/`.
    pub base_url: String,
    /// Where the session token is persisted between runs.
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Build a configuration from explicit values.
    #[must_use]
    pub fn new(base_url: &str, session_file: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session_file: session_file.into(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// Reads from `.env` file if present. Required variables:
    /// - `SURAT_API_URL`
    ///
    /// Optional (with defaults):
    /// - `SURAT_SESSION_FILE` (default: `<data dir>/surat/session.json`)
    ///
    /// # Errors
    ///
    /// Returns an error if `SURAT_API_URL` is missing or not an
    /// http(s) URL.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let base_url =
            env::var("SURAT_API_URL").map_err(|_| Error::Config("SURAT_API_URL not set".into()))?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "Invalid SURAT_API_URL '{base_url}': expected an http(s) URL"
            )));
        }

        let session_file = env::var("SURAT_SESSION_FILE")
            .ok()
            .filter(|p| !p.is_empty())
            .map_or_else(default_session_file, PathBuf::from);

        Ok(Self::new(&base_url, session_file))
    }
}

fn default_session_file() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from(".surat-session.json"),
        |dir| dir.join("surat").join("session.json"),
    )
}
