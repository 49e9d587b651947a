/// Event listing helpers - Gateway

mod filter;
mod model;
mod pagination;

pub use filter::{filter_events, DateFilter};
pub use model::{Event, EventDraft, EventPage, EventQuery, UserRef};
pub use pagination::{PageItem, Pagination};
