//! Compose form
//!
//! [`ComposeForm`] holds what the user has typed so far; it is allowed
//! to be incomplete or wrong. [`ComposeForm::validate`] turns it into a
//! [`Letter`], whose [`LetterKind`] makes "formal without a PDF"
//! unrepresentable. Only a `Letter` can be sent.

use crate::category::Category;
use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::model::{SentSurat, Surat, User};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// The only accepted attachment type.
pub const PDF_MIME: &str = "application/pdf";

/// Attachment size limit (5 MB).
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

const TOO_LARGE: &str = "PDF must be at most 5MB.";
const SEND_FAILED: &str = "Failed to send mail.";
const DIRECTORY_FAILED: &str = "Failed to load recipients.";

/// A file picked by the user, not yet checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    #[must_use]
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, detecting PDFs by extension or by the
    /// `%PDF-` magic bytes. Files over [`MAX_ATTACHMENT_BYTES`] are
    /// refused before their content is read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an oversized file, or an I/O
    /// error if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let len = tokio::fs::metadata(path).await?.len();
        if !usize::try_from(len).is_ok_and(|n| n <= MAX_ATTACHMENT_BYTES) {
            let mut errors = ValidationErrors::default();
            errors.push(Field::Attachment, TOO_LARGE);
            return Err(Error::Validation(errors));
        }
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "attachment".to_string(), |n| n.to_string_lossy().into_owned());
        let by_extension = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        let mime = if by_extension || bytes.starts_with(b"%PDF-") {
            PDF_MIME
        } else {
            "application/octet-stream"
        };
        Ok(Self::new(file_name, mime, bytes))
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// A PDF that passed the type and size checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Category-dependent part of a letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LetterKind {
    Informal,
    Formal { attachment: PdfAttachment },
}

/// A letter ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Letter {
    pub recipient_email: String,
    pub subject: String,
    /// Empty when the user wrote no body.
    pub body: String,
    pub kind: LetterKind,
}

impl Letter {
    #[must_use]
    pub const fn category(&self) -> Category {
        match self.kind {
            LetterKind::Informal => Category::Informal,
            LetterKind::Formal { .. } => Category::Formal,
        }
    }
}

/// Form fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Recipient,
    Subject,
    Attachment,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Recipient => "recipient",
            Self::Subject => "subject",
            Self::Attachment => "attachment",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// All field errors of one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    fn push(&mut self, field: Field, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message reported for `field`.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Type and size checks for a picked file.
///
/// # Errors
///
/// Returns the attachment field error when the file is not a PDF or
/// exceeds [`MAX_ATTACHMENT_BYTES`].
pub fn check_attachment(file: &SelectedFile) -> std::result::Result<PdfAttachment, FieldError> {
    let fail = |message: &str| FieldError {
        field: Field::Attachment,
        message: message.to_string(),
    };
    if file.mime != PDF_MIME {
        return Err(fail("Only PDF files are allowed."));
    }
    if file.size() > MAX_ATTACHMENT_BYTES {
        return Err(fail(TOO_LARGE));
    }
    Ok(PdfAttachment {
        file_name: file.file_name.clone(),
        bytes: file.bytes.clone(),
    })
}

/// `local@domain.tld` with the usual address characters.
#[must_use]
pub fn is_valid_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    let host_ok = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || ".-".contains(c));
    let tld_ok = tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic());
    local_ok && host_ok && tld_ok
}

/// State of the compose dialog.
#[derive(Debug, Clone, Default)]
pub struct ComposeForm {
    pub recipient_email: String,
    pub subject: String,
    pub body: String,
    pub category: Category,
    attachment: Option<SelectedFile>,
    /// Recipients offered while the form is open; `None` when closed.
    directory: Option<Vec<User>>,
    server_error: Option<String>,
}

impl ComposeForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the form and load the recipient directory, leaving out
    /// `current_user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be fetched; the form
    /// stays open with the failure recorded in
    /// [`server_error`](Self::server_error).
    pub async fn open(&mut self, client: &ApiClient, current_user: &User) -> Result<()> {
        self.server_error = None;
        self.directory = Some(Vec::new());
        match client.list_users().await {
            Ok(users) => {
                let users: Vec<User> = users.into_iter().filter(|u| u.id != current_user.id).collect();
                debug!("Loaded {} recipient(s)", users.len());
                self.directory = Some(users);
                Ok(())
            }
            Err(e) => {
                warn!("Recipient directory unavailable: {}", e);
                self.server_error = Some(DIRECTORY_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Close the form, dropping the directory and all input.
    pub fn close(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.directory.is_some()
    }

    /// Recipients offered while open.
    #[must_use]
    pub fn directory(&self) -> &[User] {
        self.directory.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn server_error(&self) -> Option<&str> {
        self.server_error.as_deref()
    }

    #[must_use]
    pub const fn attachment(&self) -> Option<&SelectedFile> {
        self.attachment.as_ref()
    }

    /// Switch category. A previously picked file is kept so that
    /// switching back to formal restores it.
    pub const fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    /// Pick a file, reporting its type and size problems straight
    /// away. The file is kept even when it fails the checks.
    ///
    /// # Errors
    ///
    /// Returns the attachment field error for a non-PDF or oversized
    /// file.
    pub fn select_attachment(&mut self, file: SelectedFile) -> std::result::Result<(), FieldError> {
        let checked = check_attachment(&file).map(drop);
        self.attachment = Some(file);
        checked
    }

    pub fn clear_attachment(&mut self) {
        self.attachment = None;
    }

    /// Check every field and build the letter.
    ///
    /// # Errors
    ///
    /// Returns every failing field. The attachment is only checked
    /// while the category is formal.
    pub fn validate(&self) -> std::result::Result<Letter, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let recipient = self.recipient_email.trim();
        if recipient.is_empty() {
            errors.push(Field::Recipient, "Recipient is required.");
        } else if !is_valid_email(recipient) {
            errors.push(Field::Recipient, "Invalid email address.");
        } else if !self.directory().iter().any(|u| u.email == recipient) {
            errors.push(Field::Recipient, "Recipient must be a registered user.");
        }

        if self.subject.trim().is_empty() {
            errors.push(Field::Subject, "Subject is required.");
        }

        let kind = match self.category {
            Category::Informal => Some(LetterKind::Informal),
            Category::Formal => match &self.attachment {
                None => {
                    errors.push(Field::Attachment, "A PDF is required for formal mail.");
                    None
                }
                Some(file) => match check_attachment(file) {
                    Ok(attachment) => Some(LetterKind::Formal { attachment }),
                    Err(e) => {
                        errors.push(e.field, e.message);
                        None
                    }
                },
            },
        };

        match kind {
            Some(kind) if errors.is_empty() => Ok(Letter {
                recipient_email: recipient.to_string(),
                subject: self.subject.clone(),
                body: self.body.clone(),
                kind,
            }),
            _ => Err(errors),
        }
    }

    /// Validate and send. On success `on_sent` receives the created
    /// mail and the form is reset and closed. On failure the input is
    /// left untouched for a retry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without any request when a field
    /// is invalid, or the request error when the backend refuses.
    pub async fn submit<F>(&mut self, client: &ApiClient, on_sent: F) -> Result<SentSurat>
    where
        F: FnOnce(&Surat) + Send,
    {
        let letter = self.validate().map_err(Error::Validation)?;
        self.server_error = None;

        match client.send_surat(&letter).await {
            Ok(sent) => {
                info!("Compose submitted ({})", letter.category());
                on_sent(&sent.surat);
                self.close();
                Ok(sent)
            }
            Err(e) => {
                self.server_error = Some(e.user_message(SEND_FAILED));
                Err(e)
            }
        }
    }
}
