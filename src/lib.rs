//! Cliente tipado da API WHOOP v2
//!
//! Autenticação OAuth2 (authorization code) com renovação automática do token,
//! acessores para ciclos, sono, recuperação, treinos e perfil do usuário, e streams
//! que percorrem coleções paginadas.
//!
//! ```no_run
//! use futures_util::TryStreamExt;
//! use whoop_client::{WhoopClient, WhoopConfig};
//!
//! # async fn run() -> whoop_client::WhoopResult<()> {
//! let config = WhoopConfig::from_env()?;
//! let mut client = WhoopClient::with_tokens(config, "access-token", "refresh-token")?;
//!
//! let profile = client.get_profile_basic().await?;
//! println!("{} {}", profile.first_name, profile.last_name);
//!
//! let cycles: Vec<_> = client.iterate_cycles(None, None, None).try_collect().await?;
//! println!("{} ciclos", cycles.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

pub use auth::{Authenticator, Credential, TokenStore};
pub use client::{CollectionParams, WhoopClient};
pub use config::WhoopConfig;
pub use error::{AuthError, AuthResult, WhoopError, WhoopResult};
pub use models::ValidationError;
