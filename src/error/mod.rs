//! Tipos de erro do cliente WHOOP

pub mod auth_error;

pub use auth_error::{AuthError, AuthResult};

use crate::models::ValidationError;
use thiserror::Error;

/// Erros do cliente WHOOP
#[derive(Debug, Error)]
pub enum WhoopError {
    /// Falha de autenticação (endpoint de token ou ausência de credencial)
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Resposta não-2xx de um endpoint de recurso
    #[error("WHOOP API error (status {status}): {body}")]
    Http { status: u16, body: String },

    /// Corpo da resposta não corresponde ao formato esperado
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Erro de transporte (conexão, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl WhoopError {
    /// Status HTTP associado ao erro, se houver
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Auth(e) => e.status(),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// O recurso pedido não existe (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

/// Tipo Result padrão para o crate
pub type WhoopResult<T> = Result<T, WhoopError>;
