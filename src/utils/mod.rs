// Gateway module for utils - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod errors;
mod logger;

// Public re-exports - the ONLY way to access utils functionality
pub(crate) use errors::payload_message;
pub use errors::{server_message, ApiError, AuthFailure, SessionError, StorageError, TokenError};
pub use logger::init_logger;
