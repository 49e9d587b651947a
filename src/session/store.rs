use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::identity::{AuthBackend, AuthResponse, LoginRequest, RegisterRequest, Session, User};
use super::shell::{Notice, Route, Shell};
use super::storage::SessionStorage;
use super::token::decode_claims;
use crate::constants::{
    LOGIN_FAILED_DEFAULT, LOGIN_SUCCESS_NOTICE, REGISTER_FAILED_DEFAULT, REGISTER_SUCCESS_NOTICE,
    SESSION_EXPIRED_NOTICE, TOKEN_KEY, USER_KEY,
};
use crate::utils::{AuthFailure, SessionError, StorageError};

/// Where the session lifecycle currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// `initialize` has not finished yet
    Uninitialized,
    Anonymous,
    Authenticated(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// Result of the startup check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    NoSession,
    Restored(User),
    /// A stored session was stale or unreadable and has been cleared
    Expired,
}

/// Why a session is being cleared without the user asking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryReason {
    /// Stored token expired before startup
    Stale,
    /// Stored token could not be decoded
    Undecodable,
    /// The server rejected the token on a request
    Rejected,
}

/// Single source of truth for who is logged in
pub struct SessionStore {
    state: RwLock<SessionState>,
    storage: Box<dyn SessionStorage>,
    backend: Arc<dyn AuthBackend>,
    shell: Arc<dyn Shell>,
}

impl SessionStore {
    pub fn new(
        storage: Box<dyn SessionStorage>,
        backend: Arc<dyn AuthBackend>,
        shell: Arc<dyn Shell>,
    ) -> Self {
        Self {
            state: RwLock::new(SessionState::Uninitialized),
            storage,
            backend,
            shell,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    /// False until the startup check has run
    pub fn is_ready(&self) -> bool {
        !matches!(*self.state.read(), SessionState::Uninitialized)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.read(), SessionState::Authenticated(_))
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().session().map(|s| s.token.clone())
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.read().session().map(|s| s.user.clone())
    }

    /// Restore the persisted session, dropping it if the token is stale
    pub fn initialize(&self) -> InitOutcome {
        self.initialize_at(Utc::now())
    }

    pub fn initialize_at(&self, now: DateTime<Utc>) -> InitOutcome {
        {
            let state = self.state.read();
            if !matches!(*state, SessionState::Uninitialized) {
                return match &*state {
                    SessionState::Authenticated(session) => {
                        InitOutcome::Restored(session.user.clone())
                    }
                    _ => InitOutcome::NoSession,
                };
            }
        }

        let Some(session) = self.read_persisted() else {
            *self.state.write() = SessionState::Anonymous;
            debug!("No stored session");
            return InitOutcome::NoSession;
        };

        let reason = match decode_claims(&session.token) {
            Ok(claims) if !claims.is_expired_at(now) => None,
            Ok(claims) => {
                debug!(exp = claims.exp, "Stored token is past its expiry");
                Some(ExpiryReason::Stale)
            }
            Err(e) => {
                debug!(error = %e, "Stored token could not be decoded");
                Some(ExpiryReason::Undecodable)
            }
        };

        match reason {
            None => {
                info!(user = %session.user.id, "Restored stored session");
                let user = session.user.clone();
                *self.state.write() = SessionState::Authenticated(session);
                InitOutcome::Restored(user)
            }
            Some(reason) => {
                self.force_clear(reason);
                InitOutcome::Expired
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(SessionError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = self.backend.login(&request).await;
        self.complete_auth(
            result,
            LOGIN_SUCCESS_NOTICE,
            LOGIN_FAILED_DEFAULT,
            Route::Landing,
        )
    }

    /// Create an account; success counts as a login
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        photo_url: Option<&str>,
    ) -> Result<User, SessionError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(SessionError::Validation(
                "Name, email and password are required".to_string(),
            ));
        }

        let request = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            photo_url: photo_url
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        };
        let result = self.backend.register(&request).await;
        self.complete_auth(
            result,
            REGISTER_SUCCESS_NOTICE,
            REGISTER_FAILED_DEFAULT,
            Route::Events,
        )
    }

    /// End the session at the user's request. Never fails.
    pub fn logout(&self) {
        let was_authenticated = self.is_authenticated();
        self.clear();
        if was_authenticated {
            info!("Logged out");
            self.shell.navigate(Route::Login { session_expired: false });
        }
    }

    /// Clear the session, tell the user it expired and send them to login.
    ///
    /// Both the startup check and the request gateway end up here.
    pub fn force_clear(&self, reason: ExpiryReason) {
        warn!(?reason, "Session expired, clearing stored credentials");
        self.clear();
        self.shell.notify(Notice::info(SESSION_EXPIRED_NOTICE));
        self.shell.navigate(Route::Login { session_expired: true });
    }

    fn complete_auth(
        &self,
        result: Result<AuthResponse, AuthFailure>,
        success_notice: &str,
        failure_default: &str,
        destination: Route,
    ) -> Result<User, SessionError> {
        let response = match result {
            Ok(response) => response,
            Err(failure) => {
                let error = match failure {
                    AuthFailure::Rejected { status, message } => {
                        debug!(status, "Credentials rejected");
                        SessionError::Credentials(
                            message.unwrap_or_else(|| failure_default.to_string()),
                        )
                    }
                    AuthFailure::Network(detail) => SessionError::Network(detail),
                };
                self.shell.notify(Notice::error(error.message()));
                return Err(error);
            }
        };

        let session = Session::from(response);
        if let Err(e) = self.persist(&session) {
            let error = SessionError::Storage(e.to_string());
            self.shell.notify(Notice::error(error.message()));
            return Err(error);
        }

        info!(user = %session.user.id, "Session established");
        let user = session.user.clone();
        *self.state.write() = SessionState::Authenticated(session);
        self.shell.notify(Notice::success(success_notice));
        self.shell.navigate(destination);
        Ok(user)
    }

    fn persist(&self, session: &Session) -> Result<(), StorageError> {
        let user_json =
            serde_json::to_string(&session.user).map_err(|e| StorageError::Format(e.to_string()))?;
        self.storage
            .write_all(&[(TOKEN_KEY, session.token.as_str()), (USER_KEY, user_json.as_str())])
    }

    /// Read the stored pair; anything short of a complete, parseable pair
    /// counts as no session and is wiped.
    fn read_persisted(&self) -> Option<Session> {
        let token = self.read_entry(TOKEN_KEY);
        let user = self.read_entry(USER_KEY);

        match (token, user) {
            (None, None) => None,
            (Some(token), Some(raw_user)) => match serde_json::from_str::<User>(&raw_user) {
                Ok(user) => Some(Session { token, user }),
                Err(e) => {
                    warn!(error = %e, "Stored user record is unreadable, discarding session");
                    self.wipe_storage();
                    None
                }
            },
            _ => {
                warn!("Stored session is missing half of its entries, discarding it");
                self.wipe_storage();
                None
            }
        }
    }

    fn read_entry(&self, key: &str) -> Option<String> {
        match self.storage.read(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "Could not read stored session entry");
                None
            }
        }
    }

    fn clear(&self) {
        self.wipe_storage();
        *self.state.write() = SessionState::Anonymous;
    }

    fn wipe_storage(&self) {
        if let Err(e) = self.storage.remove_all(&[TOKEN_KEY, USER_KEY]) {
            warn!(error = %e, "Could not remove stored session");
        }
    }
}
