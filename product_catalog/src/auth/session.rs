//! Shared session object: token store, validator, and observable state.

use super::{
    models::{EndReason, SessionEvent, SessionState, User},
    store::TokenStore,
    validator::TokenValidator,
};
use crate::errors::{ClientError, ClientResult};
use tokio::sync::{broadcast, watch};

const EVENT_CAPACITY: usize = 16;

/// Client-side session
///
/// Constructed explicitly and shared through `Arc`; every component that
/// reads or ends the session holds the same instance. Two `Session`s never
/// share state unless they share a storage backend.
pub struct Session {
    store: TokenStore,
    validator: TokenValidator,
    state: watch::Sender<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Create an anonymous session over the given store
    ///
    /// Nothing is read from storage until [`Session::restore`] runs.
    pub fn new(store: TokenStore, validator: TokenValidator) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            validator,
            state,
            events,
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Receive lifecycle events, including "login required" signals
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Load a previously persisted session
    ///
    /// A stored token that still passes validation makes the session
    /// authenticated, using the stored profile or, failing that, the profile
    /// carried in the token claims. Anything else, including storage contents
    /// that can no longer be read, is purged.
    ///
    /// # Errors
    ///
    /// * `ClientError::Storage` - Stale data could not be removed
    pub fn restore(&self) -> ClientResult<SessionState> {
        let stored = match self.store.current() {
            Ok(stored) => stored,
            Err(ClientError::Storage(reason)) => {
                tracing::warn!(%reason, "Discarding unreadable stored session");
                self.store.reset()?;
                None
            }
            Err(e) => return Err(e),
        };

        let user = stored.and_then(|stored| {
            let claims = self.validator.decode(&stored.token).ok()?;
            if !self.validator.is_unexpired(&claims) {
                return None;
            }
            let user = stored.user.or_else(|| claims.user());
            if user.is_none() {
                tracing::warn!("Stored token carries no user profile");
            }
            user
        });

        let state = match user {
            Some(user) => {
                tracing::info!(username = %user.username, "Restored stored session");
                SessionState::authenticated(user)
            }
            None => {
                self.store.clear()?;
                SessionState::default()
            }
        };

        self.state.send_replace(state.clone());
        Ok(state)
    }

    /// Replace whatever session exists with a new token and user
    pub fn establish(&self, token: &str, user: User) -> ClientResult<()> {
        self.store.save(token, &user)?;
        tracing::info!(user_id = user.id, username = %user.username, "Session established");
        self.state
            .send_replace(SessionState::authenticated(user.clone()));
        let _ = self.events.send(SessionEvent::LoggedIn(user));
        Ok(())
    }

    /// Drop the stored token and become anonymous
    ///
    /// Always leaves the in-memory state anonymous; a storage failure while
    /// clearing is logged and the session still ends.
    pub fn end(&self, reason: EndReason) {
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "Failed to clear stored session");
        }

        self.state.send_replace(SessionState::default());

        let event = match reason {
            EndReason::Logout => {
                tracing::info!("Logged out");
                SessionEvent::LoggedOut
            }
            EndReason::Expired | EndReason::Rejected => {
                tracing::warn!(?reason, "Session ended, login required");
                SessionEvent::LoginRequired(reason)
            }
        };
        let _ = self.events.send(event);
    }

    /// The stored token if it is present and unexpired
    ///
    /// # Errors
    ///
    /// * `ClientError::SessionExpired` - No usable token; the session has been ended
    /// * `ClientError::Storage` - The store could not be read
    pub fn valid_token(&self) -> ClientResult<String> {
        match self.store.token()? {
            Some(token) if self.validator.is_valid(&token) => Ok(token),
            _ => {
                self.end(EndReason::Expired);
                Err(ClientError::SessionExpired)
            }
        }
    }
}
