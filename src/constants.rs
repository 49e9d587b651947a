/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const LOGIN_PATH: &str = "auth/login";
pub const REGISTER_PATH: &str = "auth/register";
pub const EVENTS_PATH: &str = "events";
pub const MY_EVENTS_PATH: &str = "events/my-events";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

// Persisted session layout
pub const SESSION_FILE_NAME: &str = "session.toml";
pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

// Server signals
pub const TOKEN_INVALID_MSG: &str = "Token is not valid";

// User-facing messages
pub const SESSION_EXPIRED_NOTICE: &str = "Your session has expired. Please log in again.";
pub const LOGIN_SUCCESS_NOTICE: &str = "Login successful!";
pub const REGISTER_SUCCESS_NOTICE: &str = "Registration successful!";
pub const LOGIN_FAILED_DEFAULT: &str = "Login failed";
pub const REGISTER_FAILED_DEFAULT: &str = "Registration failed";
pub const REQUEST_FAILED_DEFAULT: &str = "Request failed";
pub const NETWORK_ERROR_MSG: &str = "Network error";

// Routes
pub const LANDING_ROUTE: &str = "/";
pub const EVENTS_ROUTE: &str = "/events";
pub const LOGIN_ROUTE: &str = "/login";
pub const SESSION_EXPIRED_QUERY: &str = "session=expired";

// Listing
pub const DEFAULT_PAGE_SIZE: u32 = 6;
pub const MAX_VISIBLE_PAGES: u32 = 5;
