/// Backend API module - Gateway

mod auth;
mod events;
mod gateway;

pub use auth::AuthApi;
pub use events::EventsApi;
pub use gateway::{build_client, endpoint, Gateway};
