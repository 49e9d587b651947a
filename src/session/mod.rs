/// Session management module - Gateway

mod identity;
mod shell;
mod storage;
mod store;
mod token;

pub use identity::{AuthBackend, AuthResponse, LoginRequest, RegisterRequest, Session, User};
pub use shell::{Notice, NoticeLevel, Route, Shell, SilentShell};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use store::{ExpiryReason, InitOutcome, SessionState, SessionStore};
pub use token::{decode_claims, TokenClaims};

#[cfg(test)]
pub(crate) use shell::RecordingShell;
#[cfg(test)]
pub(crate) use token::make_token;
