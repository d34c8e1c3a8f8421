//! Login and registration forms

use crate::client::{ApiClient, NewAccount};
use crate::compose::is_valid_email;
use crate::error::{Error, Result};
use crate::model::User;
use crate::session::{Route, SessionContext};
use std::fmt;
use tracing::info;

const LOGIN_FAILED: &str = "Login failed. Please try again.";
const REGISTER_FAILED: &str = "Registration failed. Please try again.";
const MIN_PASSWORD_CHARS: usize = 6;

/// Field-scoped messages for the auth forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl FormErrors {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.confirm_password.is_none()
    }

    /// All messages, in field order.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        [
            &self.name,
            &self.email,
            &self.password,
            &self.confirm_password,
        ]
        .into_iter()
        .filter_map(Option::as_deref)
        .collect()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

/// Why a form submission did not go through.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Rejected before any request.
    #[error("{0}")]
    Invalid(FormErrors),
    /// The request failed; `message` is what to show the user.
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: Error,
    },
}

impl SubmitError {
    /// The text to show the user.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// The login page.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    #[must_use]
    pub fn validate(&self) -> FormErrors {
        FormErrors {
            email: self
                .email
                .trim()
                .is_empty()
                .then(|| "Email is required.".to_string()),
            password: self
                .password
                .is_empty()
                .then(|| "Password is required.".to_string()),
            ..FormErrors::default()
        }
    }

    /// Log in and start the session. The backend does not echo the
    /// email, so the submitted one is recorded for the user.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Invalid`] for empty fields, or
    /// [`SubmitError::Failed`] when the backend refuses.
    pub async fn submit(
        &self,
        client: &ApiClient,
        session: &SessionContext,
    ) -> std::result::Result<Route, SubmitError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(SubmitError::Invalid(errors));
        }
        self.start_session(client, session)
            .await
            .map(|()| Route::Inbox)
            .map_err(|source| SubmitError::Failed {
                message: source.user_message(LOGIN_FAILED),
                source,
            })
    }

    async fn start_session(&self, client: &ApiClient, session: &SessionContext) -> Result<()> {
        let email = self.email.trim();
        let auth = client.login(email, &self.password).await?;
        let user = User {
            id: auth.user_id,
            name: auth.name,
            email: email.to_string(),
        };
        session.login(auth.access_token, user).await
    }
}

/// The registration page.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    #[must_use]
    pub fn validate(&self) -> FormErrors {
        let email = self.email.trim();
        FormErrors {
            name: self
                .name
                .trim()
                .is_empty()
                .then(|| "Name is required.".to_string()),
            email: if email.is_empty() {
                Some("Email is required.".to_string())
            } else if is_valid_email(email) {
                None
            } else {
                Some("Invalid email address.".to_string())
            },
            password: if self.password.is_empty() {
                Some("Password is required.".to_string())
            } else if self.password.chars().count() < MIN_PASSWORD_CHARS {
                Some(format!(
                    "Password must be at least {MIN_PASSWORD_CHARS} characters."
                ))
            } else {
                None
            },
            confirm_password: if self.confirm_password.is_empty() {
                Some("Password confirmation is required.".to_string())
            } else if self.confirm_password == self.password {
                None
            } else {
                Some("Passwords do not match.".to_string())
            },
        }
    }

    /// Create the account. The confirmation never leaves the client.
    /// On success the user is sent to the login page.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Invalid`] for bad fields, or
    /// [`SubmitError::Failed`] when the backend refuses.
    pub async fn submit(&self, client: &ApiClient) -> std::result::Result<Route, SubmitError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(SubmitError::Invalid(errors));
        }
        let account = NewAccount {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        };
        match client.register(&account).await {
            Ok(()) => {
                info!("Registered {}", account.email);
                Ok(Route::Login)
            }
            Err(source) => Err(SubmitError::Failed {
                message: source.user_message(REGISTER_FAILED),
                source,
            }),
        }
    }
}
