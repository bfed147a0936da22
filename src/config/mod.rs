pub mod env;

pub use env::{
    default_scopes, parse_scopes, WhoopConfig, DEFAULT_API_BASE_URL, DEFAULT_AUTH_URL,
    DEFAULT_CALLBACK_PORT, DEFAULT_REDIRECT_URI, DEFAULT_SCOPES, DEFAULT_TIMEOUT_SECS,
    DEFAULT_TOKEN_URL,
};
