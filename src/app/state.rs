use anyhow::{Context, Result};
use std::sync::Arc;

use crate::api::{AuthApi, EventsApi, Gateway};
use crate::app::Config;
use crate::session::{
    AuthBackend, FileStorage, InitOutcome, SessionStorage, SessionStore, Shell,
};

/// Application context handed to the front end
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Who is logged in
    pub session: Arc<SessionStore>,
    /// Events endpoints behind the authorized gateway
    pub events: EventsApi,
    /// What the startup check found
    pub init_outcome: InitOutcome,
}

impl AppState {
    /// Wire file-backed storage and the HTTP backend, then run the startup check
    pub fn bootstrap(config: Config, shell: Arc<dyn Shell>) -> Result<Self> {
        let session_path = config.storage.session_path()?;
        let storage = Box::new(FileStorage::new(session_path));
        let backend =
            Arc::new(AuthApi::new(&config.api).context("Failed to build auth client")?);
        Self::with_parts(config, storage, backend, shell)
    }

    /// Same as [`AppState::bootstrap`] with caller-supplied storage and backend
    pub fn with_parts(
        config: Config,
        storage: Box<dyn SessionStorage>,
        backend: Arc<dyn AuthBackend>,
        shell: Arc<dyn Shell>,
    ) -> Result<Self> {
        let session = Arc::new(SessionStore::new(storage, backend, shell));
        let gateway =
            Gateway::new(&config.api, session.clone()).context("Failed to build API client")?;
        let init_outcome = session.initialize();

        Ok(Self {
            config,
            session,
            events: EventsApi::new(gateway),
            init_outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemoryStorage, RecordingShell, SessionState, SilentShell};
    use crate::utils::AuthFailure;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct Offline;

    #[async_trait]
    impl AuthBackend for Offline {
        async fn login(
            &self,
            _request: &crate::session::LoginRequest,
        ) -> Result<crate::session::AuthResponse, AuthFailure> {
            Err(AuthFailure::Network("offline".into()))
        }

        async fn register(
            &self,
            _request: &crate::session::RegisterRequest,
        ) -> Result<crate::session::AuthResponse, AuthFailure> {
            Err(AuthFailure::Network("offline".into()))
        }
    }

    #[test]
    fn test_bootstrap_is_ready_and_anonymous() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.dir = Some(temp_dir.path().to_path_buf());

        let state = AppState::bootstrap(config, Arc::new(RecordingShell::default())).unwrap();

        assert!(state.session.is_ready());
        assert_eq!(state.init_outcome, InitOutcome::NoSession);
        assert_eq!(state.session.state(), SessionState::Anonymous);
    }

    #[test]
    fn test_with_parts_shares_one_session() {
        let state = AppState::with_parts(
            Config::default(),
            Box::new(MemoryStorage::new()),
            Arc::new(Offline),
            Arc::new(SilentShell),
        )
        .unwrap();

        assert!(Arc::ptr_eq(&state.session, state.events.gateway().session()));
    }
}
