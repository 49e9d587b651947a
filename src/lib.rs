pub mod api;
pub mod app;
pub mod cli;
pub mod constants;
pub mod events;
pub mod session;
pub mod utils;

pub use api::{AuthApi, EventsApi, Gateway};
pub use app::{load_config, AppState, Config};
pub use events::{DateFilter, Event, EventDraft, EventPage, EventQuery};
pub use session::{Session, SessionState, SessionStore, Shell, User};
pub use utils::{ApiError, SessionError};
