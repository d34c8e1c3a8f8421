//! Application-scoped authentication state
//!
//! [`SessionContext`] is created once, hydrated from the durable
//! [`TokenStore`], and shared (behind an `Arc`) with every page
//! controller that needs to know who is logged in. Only [`login`] and
//! [`logout`] write to it.
//!
//! [`login`]: SessionContext::login
//! [`logout`]: SessionContext::logout

use crate::error::{Error, Result};
use crate::model::User;
use crate::store::{StoredSession, TokenStore};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Pages of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    /// The mailbox root.
    Inbox,
    Sent,
    Activity,
}

impl Route {
    /// Whether the page is only reachable with a session.
    #[must_use]
    pub const fn requires_auth(self) -> bool {
        !matches!(self, Self::Login | Self::Register)
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Loading,
    Anonymous,
    Authenticated(Session),
}

/// Outcome of checking a route against the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Session not yet known; render nothing.
    Pending,
    /// Go elsewhere instead.
    Redirect(Route),
    Allow,
}

/// Process-wide session holder.
pub struct SessionContext {
    store: Arc<dyn TokenStore>,
    state: RwLock<State>,
}

impl SessionContext {
    /// A context in the loading state. Call [`hydrate`](Self::hydrate)
    /// before gating any page.
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            state: RwLock::new(State::Loading),
        }
    }

    /// The store this context writes to.
    #[must_use]
    pub fn store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.store)
    }

    /// Restore the session from durable storage.
    ///
    /// A malformed store entry is treated as "logged out" and cleared
    /// rather than failing startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or cleared.
    pub async fn hydrate(&self) -> Result<()> {
        let restored = match self.store.load() {
            Ok(stored) => stored,
            Err(Error::Storage(msg)) => {
                warn!("Discarding unreadable session: {}", msg);
                self.store.clear()?;
                None
            }
            Err(e) => return Err(e),
        };

        let mut state = self.state.write().await;
        *state = restored.map_or(State::Anonymous, |s| {
            debug!("Session restored for {}", s.user.email);
            State::Authenticated(Session {
                access_token: s.access_token,
                user: s.user,
            })
        });
        Ok(())
    }

    /// Record a fresh login and persist the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be persisted.
    pub async fn login(&self, access_token: String, user: User) -> Result<()> {
        let stored = StoredSession { access_token, user };
        self.store.save(&stored)?;
        info!("Logged in as {}", stored.user.email);
        *self.state.write().await = State::Authenticated(Session {
            access_token: stored.access_token,
            user: stored.user,
        });
        Ok(())
    }

    /// Forget the session and clear the durable token.
    ///
    /// # Errors
    ///
    /// Returns an error if the durable token cannot be cleared.
    pub async fn logout(&self) -> Result<()> {
        self.store.clear()?;
        *self.state.write().await = State::Anonymous;
        info!("Logged out");
        Ok(())
    }

    pub async fn is_loading(&self) -> bool {
        matches!(*self.state.read().await, State::Loading)
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(*self.state.read().await, State::Authenticated(_))
    }

    /// The current user, if logged in.
    pub async fn user(&self) -> Option<User> {
        match &*self.state.read().await {
            State::Authenticated(session) => Some(session.user.clone()),
            State::Loading | State::Anonymous => None,
        }
    }

    /// The current user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthenticated`] without a session.
    pub async fn require_user(&self) -> Result<User> {
        self.user().await.ok_or(Error::NotAuthenticated)
    }

    /// Decide whether `route` may be shown now.
    pub async fn gate(&self, route: Route) -> Gate {
        match (&*self.state.read().await, route.requires_auth()) {
            (State::Loading, _) => Gate::Pending,
            (State::Anonymous, true) => Gate::Redirect(Route::Login),
            _ => Gate::Allow,
        }
    }
}
