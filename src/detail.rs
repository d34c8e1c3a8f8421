//! Mail detail viewer
//!
//! Holds the mail currently opened from a list, or nothing. Opening
//! and closing are local; the network side effects (auto mark-as-read)
//! belong to the owning [`MailboxPage`](crate::MailboxPage).

use crate::model::Surat;
use crate::status::ReadStatus;

/// How the attachment of an opened mail is presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentView {
    /// Embedded preview of the PDF at `url`, with a download link.
    Preview { url: String },
    /// Preview unsupported by the surface; only the link is offered.
    Link { url: String, notice: String },
}

impl AttachmentView {
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Preview { url } | Self::Link { url, .. } => url,
        }
    }
}

/// The detail dialog.
#[derive(Debug, Clone, Default)]
pub struct MailDetail {
    selected: Option<Surat>,
}

impl MailDetail {
    #[must_use]
    pub const fn new() -> Self {
        Self { selected: None }
    }

    pub fn show(&mut self, surat: Surat) {
        self.selected = Some(surat);
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    #[must_use]
    pub const fn selected(&self) -> Option<&Surat> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn is_showing(&self, id: &str) -> bool {
        self.selected.as_ref().is_some_and(|s| s.id == id)
    }

    /// Reflect a status change made elsewhere if `id` is on screen.
    pub fn set_status(&mut self, id: &str, status: ReadStatus) {
        if let Some(surat) = self.selected.as_mut().filter(|s| s.id == id) {
            surat.status = status;
        }
    }

    /// Close the dialog if it shows `id`. Returns whether it did.
    pub fn close_if_showing(&mut self, id: &str) -> bool {
        let showing = self.is_showing(id);
        if showing {
            self.selected = None;
        }
        showing
    }

    /// "Mark unread" is only offered for mail that has been read.
    #[must_use]
    pub fn can_mark_unread(&self) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|s| s.status == ReadStatus::Read)
    }

    /// Attachment presentation for the opened mail.
    #[must_use]
    pub fn attachment_view(&self, preview_supported: bool) -> Option<AttachmentView> {
        let url = self.selected.as_ref()?.attachment()?.to_string();
        Some(if preview_supported {
            AttachmentView::Preview { url }
        } else {
            AttachmentView::Link {
                notice: format!("PDF preview is not supported here. Open {url} to view it."),
                url,
            }
        })
    }
}
