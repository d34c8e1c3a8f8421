//! Activity log viewer

use crate::client::ApiClient;
use crate::error::Result;
use crate::model::ActivityLog;
use std::collections::HashSet;
use tracing::{debug, warn};

const LOAD_FAILED: &str = "Failed to load activity log.";

impl ActivityLog {
    /// `mail_sent` -> `MAIL SENT`.
    #[must_use]
    pub fn action_label(&self) -> String {
        self.action.replace('_', " ").to_uppercase()
    }

    /// `entity (ID: id)`, only when both are known.
    #[must_use]
    pub fn entity_label(&self) -> Option<String> {
        match (self.entity.as_deref(), self.entity_id.as_deref()) {
            (Some(entity), Some(id)) => Some(format!("{entity} (ID: {id})")),
            _ => None,
        }
    }

    /// Details worth a show/hide toggle: a non-empty JSON object.
    #[must_use]
    pub fn has_details(&self) -> bool {
        self.details
            .as_ref()
            .and_then(serde_json::Value::as_object)
            .is_some_and(|o| !o.is_empty())
    }

    /// Pretty-printed details, if any.
    #[must_use]
    pub fn details_pretty(&self) -> Option<String> {
        if !self.has_details() {
            return None;
        }
        self.details
            .as_ref()
            .and_then(|d| serde_json::to_string_pretty(d).ok())
    }
}

/// Handle for one in-flight activity fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityTicket {
    generation: u64,
}

/// The activity page: fetched list plus per-entry expansion.
#[derive(Debug, Default)]
pub struct ActivityViewer {
    entries: Vec<ActivityLog>,
    loading: bool,
    error: Option<String>,
    generation: u64,
    expanded: HashSet<String>,
}

impl ActivityViewer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)load the log. Expansion of entries that are still present
    /// survives the reload.
    pub async fn refresh(&mut self, client: &ApiClient) {
        let ticket = self.begin_fetch();
        let result = client.activity_logs().await;
        self.apply(&ticket, result);
    }

    /// Start a fetch. Any earlier ticket becomes stale.
    pub fn begin_fetch(&mut self) -> ActivityTicket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        debug!("Fetching activity (generation {})", self.generation);
        ActivityTicket {
            generation: self.generation,
        }
    }

    /// Apply a fetch result. Returns `false` and leaves the viewer
    /// untouched when `ticket` has been superseded.
    pub fn apply(&mut self, ticket: &ActivityTicket, result: Result<Vec<ActivityLog>>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "Discarding stale activity response (generation {}, latest {})",
                ticket.generation, self.generation
            );
            return false;
        }
        self.loading = false;
        match result {
            Ok(entries) => {
                self.expanded
                    .retain(|id| entries.iter().any(|e| &e.id == id));
                self.entries = entries;
            }
            Err(e) => {
                warn!("Loading activity failed: {}", e);
                self.error = Some(e.user_message(LOAD_FAILED));
            }
        }
        true
    }

    #[must_use]
    pub fn entries(&self) -> &[ActivityLog] {
        &self.entries
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Show or hide the details of entry `id`. Entries without
    /// details cannot be expanded. Returns the new expansion state.
    pub fn toggle_details(&mut self, id: &str) -> bool {
        let expandable = self
            .entries
            .iter()
            .any(|e| e.id == id && e.has_details());
        if !expandable {
            return false;
        }
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    /// Expand every entry that has details.
    pub fn expand_all(&mut self) {
        self.expanded = self
            .entries
            .iter()
            .filter(|e| e.has_details())
            .map(|e| e.id.clone())
            .collect();
    }

    #[must_use]
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }
}
