use thiserror::Error;

/// Tipos de erro específicos para autenticação OAuth2
#[derive(Error, Debug)]
pub enum AuthError {
    /// Endpoint de token respondeu com status não-2xx (troca de código ou refresh)
    #[error("token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    #[error("no access token available")]
    NoAccessToken,

    #[error("access token expired and no refresh token is available")]
    TokenExpired,

    #[error("invalid OAuth2 state")]
    InvalidState,

    #[error("access denied by the user")]
    AccessDenied,

    #[error("authorization code missing: {0}")]
    InvalidCode(String),

    #[error("callback server error: {0}")]
    CallbackServerError(String),

    #[error("timed out waiting for authorization")]
    Timeout,

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("environment variable error: {0}")]
    EnvError(String),
}

impl AuthError {
    pub fn token_endpoint(status: u16, body: impl Into<String>) -> Self {
        Self::TokenEndpoint {
            status,
            body: body.into(),
        }
    }

    pub fn env_error(msg: impl Into<String>) -> Self {
        Self::EnvError(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn callback_error(msg: impl Into<String>) -> Self {
        Self::CallbackServerError(msg.into())
    }

    /// Status HTTP devolvido pelo endpoint de token, quando houver
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::TokenEndpoint { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Tipo de resultado padrão para operações de autenticação
pub type AuthResult<T> = Result<T, AuthError>;
