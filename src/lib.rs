//! Surat mail client library
//!
//! A client for the surat internal mail backend: users send and read
//! letters ("surat"), optionally with a PDF attachment, and browse
//! their activity log. All persistence and authorization live in the
//! REST backend; this crate holds the client-side state.
//!
//! - [`ApiClient`] talks to the backend, attaching the bearer token
//!   kept in a [`TokenStore`].
//! - [`SessionContext`] owns the login state and gates pages.
//! - [`MailboxPage`], [`ComposeForm`] and [`ActivityViewer`] are the
//!   page controllers, each independent of any UI toolkit.

mod activity;
mod auth;
mod category;
mod client;
mod compose;
mod config;
mod detail;
mod error;
mod mailbox;
mod model;
mod session;
mod status;
mod store;

pub use activity::{ActivityTicket, ActivityViewer};
pub use auth::{FormErrors, LoginForm, RegisterForm, SubmitError};
pub use category::Category;
pub use client::{ApiClient, NewAccount, SuratQuery};
pub use compose::{
    ComposeForm, Field, FieldError, Letter, LetterKind, MAX_ATTACHMENT_BYTES, PDF_MIME,
    PdfAttachment, SelectedFile, ValidationErrors, check_attachment,
};
pub use config::ClientConfig;
pub use detail::{AttachmentView, MailDetail};
pub use error::{Error, Result};
pub use mailbox::{Confirm, DELETE_PROMPT, FetchTicket, ListState, MailboxPage};
pub use model::{ActivityLog, AuthResponse, SentSurat, Surat, User};
pub use session::{Gate, Route, Session, SessionContext};
pub use status::{MailboxKind, ReadStatus, StatusFilter};
pub use store::{FileTokenStore, MemoryTokenStore, StoredSession, TokenStore};
