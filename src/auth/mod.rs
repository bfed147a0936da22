pub mod callback;
pub mod oauth;
pub mod token;

pub use callback::{CallbackResult, CallbackServer};
pub use oauth::Authenticator;
pub use token::{Credential, TokenStore};
