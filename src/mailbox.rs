//! Mailbox list controller (inbox and sent pages)
//!
//! A page owns its list state, its query (status filter and search
//! term) and the [`MailDetail`] opened from it. Every mutation is
//! followed by a full refetch; nothing is patched locally except the
//! status shown in an open detail view.
//!
//! Fetches are split into [`MailboxPage::begin_fetch`] and
//! [`MailboxPage::apply`] so that a surface running several fetches at
//! once only ever applies the latest one.

use crate::client::{ApiClient, SuratQuery};
use crate::detail::MailDetail;
use crate::error::{Error, Result};
use crate::model::Surat;
use crate::status::{MailboxKind, ReadStatus, StatusFilter};
use tracing::{debug, warn};

/// Gate for destructive actions.
pub trait Confirm: Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool + Sync> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Prompt shown before deleting a mail.
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this mail?";

/// Lifecycle of the list.
#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    Idle,
    Loading,
    Loaded(Vec<Surat>),
    Failed(String),
}

/// Handle for one in-flight list fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    query: SuratQuery,
}

impl FetchTicket {
    #[must_use]
    pub const fn query(&self) -> &SuratQuery {
        &self.query
    }
}

/// One mailbox page.
#[derive(Debug)]
pub struct MailboxPage {
    query: SuratQuery,
    state: ListState,
    generation: u64,
    detail: MailDetail,
}

impl MailboxPage {
    #[must_use]
    pub fn inbox() -> Self {
        Self::new(MailboxKind::Inbox)
    }

    #[must_use]
    pub fn sent() -> Self {
        Self::new(MailboxKind::Sent)
    }

    #[must_use]
    pub const fn new(kind: MailboxKind) -> Self {
        Self {
            query: SuratQuery::new(kind),
            state: ListState::Idle,
            generation: 0,
            detail: MailDetail::new(),
        }
    }

    /// Set the initial status filter without fetching.
    #[must_use]
    pub fn with_filter(mut self, filter: StatusFilter) -> Self {
        if self.query.kind == MailboxKind::Inbox {
            self.query.status = filter;
        }
        self
    }

    /// Set the initial search term without fetching.
    #[must_use]
    pub fn with_search(mut self, term: &str) -> Self {
        self.query.search = term.trim().to_string();
        self
    }

    #[must_use]
    pub const fn kind(&self) -> MailboxKind {
        self.query.kind
    }

    #[must_use]
    pub const fn query(&self) -> &SuratQuery {
        &self.query
    }

    #[must_use]
    pub const fn state(&self) -> &ListState {
        &self.state
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, ListState::Loading)
    }

    /// The page-level error message, if the last fetch failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ListState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// Mail from the last successful fetch.
    #[must_use]
    pub fn items(&self) -> &[Surat] {
        match &self.state {
            ListState::Loaded(items) => items,
            _ => &[],
        }
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Surat> {
        self.items().iter().find(|s| s.id == id)
    }

    #[must_use]
    pub const fn detail(&self) -> &MailDetail {
        &self.detail
    }

    /// Start a fetch for the current query. Any earlier ticket becomes
    /// stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.state = ListState::Loading;
        debug!(
            "Fetching {} (generation {})",
            self.query.kind, self.generation
        );
        FetchTicket {
            generation: self.generation,
            query: self.query.clone(),
        }
    }

    /// Apply a fetch result. Returns `false` and leaves the state
    /// untouched when `ticket` has been superseded.
    pub fn apply(&mut self, ticket: &FetchTicket, result: Result<Vec<Surat>>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "Discarding stale {} response (generation {}, latest {})",
                ticket.query.kind, ticket.generation, self.generation
            );
            return false;
        }
        self.state = match result {
            Ok(items) => ListState::Loaded(items),
            Err(e) => {
                warn!("Loading {} failed: {}", self.query.kind, e);
                ListState::Failed(e.user_message(self.load_fallback()))
            }
        };
        true
    }

    /// Fetch the list for the current query.
    pub async fn refresh(&mut self, client: &ApiClient) {
        let ticket = self.begin_fetch();
        let result = client.list_surat(ticket.query()).await;
        self.apply(&ticket, result);
    }

    /// Change the status filter and refetch. The sent page has no
    /// status filter; the call is ignored there.
    pub async fn set_filter(&mut self, client: &ApiClient, filter: StatusFilter) {
        if self.query.kind != MailboxKind::Inbox {
            warn!("Status filter ignored on the {} page", self.query.kind);
            return;
        }
        self.query.status = filter;
        self.refresh(client).await;
    }

    /// Submit a search term and refetch.
    pub async fn submit_search(&mut self, client: &ApiClient, term: &str) {
        self.query.search = term.trim().to_string();
        self.refresh(client).await;
    }

    /// Show `surat` in the detail view. Unread inbox mail is marked
    /// read once and the list refetched.
    pub async fn open(&mut self, client: &ApiClient, surat: Surat) {
        let mark = self.query.kind == MailboxKind::Inbox && surat.is_unread();
        let id = surat.id.clone();
        self.detail.show(surat);
        if !mark {
            return;
        }
        match client.update_status(&id, ReadStatus::Read).await {
            Ok(()) => {
                self.detail.set_status(&id, ReadStatus::Read);
                self.refresh(client).await;
            }
            Err(e) => warn!("Could not mark {} as read: {}", id, e),
        }
    }

    /// Close the detail view. No request is made.
    pub fn close_detail(&mut self) {
        self.detail.close();
    }

    /// Flip the read status of a listed inbox mail.
    ///
    /// # Errors
    ///
    /// Returns an error on the sent page, if the id is not listed, or
    /// if the update fails. Once a request is made the list is
    /// refetched either way.
    pub async fn toggle_read(&mut self, client: &ApiClient, id: &str) -> Result<ReadStatus> {
        if self.query.kind != MailboxKind::Inbox {
            return Err(Error::InvalidAction(format!(
                "read status cannot be changed on the {} page",
                self.query.kind
            )));
        }
        let current = self.find(id).map(|s| s.status).ok_or_else(|| not_listed(id))?;
        let next = current.toggled();
        self.set_status(client, id, next).await?;
        Ok(next)
    }

    /// "Mark unread" from the detail view.
    ///
    /// # Errors
    ///
    /// Returns an error if no read mail is open or the update fails.
    pub async fn mark_unread_from_detail(&mut self, client: &ApiClient) -> Result<()> {
        if !self.detail.can_mark_unread() {
            return Err(Error::InvalidAction("no read mail is open".to_string()));
        }
        let id = self
            .detail
            .selected()
            .map(|s| s.id.clone())
            .ok_or_else(|| Error::InvalidAction("no mail is open".to_string()))?;
        self.set_status(client, &id, ReadStatus::Unread).await
    }

    /// Delete a mail after confirmation. Closes the detail view if it
    /// shows that mail.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] when not confirmed, or the request
    /// error. The list is refetched after any attempted delete.
    pub async fn delete(
        &mut self,
        client: &ApiClient,
        id: &str,
        confirm: &dyn Confirm,
    ) -> Result<()> {
        if !confirm.confirm(DELETE_PROMPT) {
            debug!("Delete of {} cancelled", id);
            return Err(Error::Cancelled);
        }
        let result = client.delete_surat(id).await;
        if result.is_ok() {
            self.detail.close_if_showing(id);
        }
        self.refresh(client).await;
        result
    }

    // -- private helpers --

    async fn set_status(&mut self, client: &ApiClient, id: &str, status: ReadStatus) -> Result<()> {
        let result = client.update_status(id, status).await;
        if result.is_ok() {
            self.detail.set_status(id, status);
        }
        self.refresh(client).await;
        result
    }

    const fn load_fallback(&self) -> &'static str {
        match self.query.kind {
            MailboxKind::Inbox => "Failed to load inbox.",
            MailboxKind::Sent => "Failed to load sent mail.",
        }
    }
}

fn not_listed(id: &str) -> Error {
    Error::InvalidAction(format!("mail {id} is not in this list"))
}
