use std::fmt;

use crate::constants::{EVENTS_ROUTE, LANDING_ROUTE, LOGIN_ROUTE, SESSION_EXPIRED_QUERY};

/// How loud a notice should be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    /// Passive information, e.g. a session that quietly expired
    Info,
    Error,
}

/// A short message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Places the session layer can send the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Events,
    /// Login screen; `session_expired` adds an advisory marker
    Login { session_expired: bool },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Landing => LANDING_ROUTE.to_string(),
            Self::Events => EVENTS_ROUTE.to_string(),
            Self::Login { session_expired: false } => LOGIN_ROUTE.to_string(),
            Self::Login { session_expired: true } => {
                format!("{}?{}", LOGIN_ROUTE, SESSION_EXPIRED_QUERY)
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// The presentation layer as seen from the session: it shows notices and
/// follows navigation requests.
pub trait Shell: Send + Sync {
    fn notify(&self, notice: Notice);

    fn navigate(&self, route: Route);
}

/// Shell that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentShell;

impl Shell for SilentShell {
    fn notify(&self, _notice: Notice) {}

    fn navigate(&self, _route: Route) {}
}

#[cfg(test)]
pub(crate) use recording::RecordingShell;

#[cfg(test)]
mod recording {
    use super::*;
    use parking_lot::Mutex;

    /// Shell that remembers what it was asked to do
    #[derive(Debug, Default)]
    pub(crate) struct RecordingShell {
        pub notices: Mutex<Vec<Notice>>,
        pub routes: Mutex<Vec<Route>>,
    }

    impl RecordingShell {
        pub fn notices(&self) -> Vec<Notice> {
            self.notices.lock().clone()
        }

        pub fn routes(&self) -> Vec<Route> {
            self.routes.lock().clone()
        }
    }

    impl Shell for RecordingShell {
        fn notify(&self, notice: Notice) {
            self.notices.lock().push(notice);
        }

        fn navigate(&self, route: Route) {
            self.routes.lock().push(route);
        }
    }
}
