use std::env;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{AuthError, AuthResult};

pub const DEFAULT_AUTH_URL: &str = "https://api.prod.whoop.com/oauth/oauth2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://api.prod.whoop.com/oauth/oauth2/token";
pub const DEFAULT_API_BASE_URL: &str = "https://api.prod.whoop.com/developer";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8888/callback";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CALLBACK_PORT: u16 = 8888;

/// Escopos pedidos quando nenhum outro é configurado
pub const DEFAULT_SCOPES: &[&str] = &[
    "read:recovery",
    "read:cycles",
    "read:workout",
    "read:sleep",
    "read:profile",
    "read:body_measurement",
];

/// Configuração do cliente WHOOP (credenciais do app OAuth2 e endpoints)
#[derive(Debug, Clone, PartialEq)]
pub struct WhoopConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub api_base_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub timeout: Duration,
    pub callback_port: u16,
}

impl WhoopConfig {
    /// Configuração em código com todos os valores padrão
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scopes: default_scopes(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            callback_port: DEFAULT_CALLBACK_PORT,
        }
    }

    /// Carrega a configuração das variáveis de ambiente (e do `.env`, se existir)
    pub fn from_env() -> AuthResult<Self> {
        // Nos testes as variáveis são definidas diretamente
        if cfg!(not(test)) && Path::new(".env").exists() {
            dotenvy::dotenv()
                .map_err(|e| AuthError::config_error(format!("failed to load .env: {}", e)))?;
            debug!("📄 Arquivo .env carregado");
        }

        let client_id = Self::get_env_var("WHOOP_CLIENT_ID")?;
        let client_secret = Self::get_env_var("WHOOP_CLIENT_SECRET")?;
        let redirect_uri = Self::optional_env_var("WHOOP_REDIRECT_URI")
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());

        let mut config = Self::new(client_id, client_secret, redirect_uri);

        if let Some(raw) = Self::optional_env_var("WHOOP_SCOPES") {
            config.scopes = parse_scopes(&raw);
        }
        if let Some(url) = Self::optional_env_var("WHOOP_API_BASE_URL") {
            config.api_base_url = url;
        }
        if let Some(url) = Self::optional_env_var("WHOOP_AUTH_URL") {
            config.auth_url = url;
        }
        if let Some(url) = Self::optional_env_var("WHOOP_TOKEN_URL") {
            config.token_url = url;
        }

        if let Some(raw) = Self::optional_env_var("WHOOP_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_timeout_secs(&raw)?);
        }

        config.callback_port = Self::optional_env_var("WHOOP_CALLBACK_PORT")
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_CALLBACK_PORT);

        info!("Configuração WHOOP carregada ({})", config.api_base_url);
        Ok(config)
    }

    fn get_env_var(key: &str) -> AuthResult<String> {
        env::var(key).map_err(|_| AuthError::env_error(format!("{} not set", key)))
    }

    /// Variável opcional; string vazia conta como ausente
    fn optional_env_var(key: &str) -> Option<String> {
        env::var(key).ok().filter(|value| !value.trim().is_empty())
    }

    /// Valida se todas as configurações obrigatórias estão presentes
    pub fn validate(&self) -> AuthResult<()> {
        if self.client_id.is_empty() {
            return Err(AuthError::config_error("WHOOP_CLIENT_ID is required"));
        }

        if self.client_secret.is_empty() {
            return Err(AuthError::config_error("WHOOP_CLIENT_SECRET is required"));
        }

        if !self.redirect_uri.starts_with("http://") && !self.redirect_uri.starts_with("https://")
        {
            return Err(AuthError::config_error(format!(
                "WHOOP_REDIRECT_URI must be an http(s) URL: {}",
                self.redirect_uri
            )));
        }

        if self.timeout.is_zero() {
            return Err(AuthError::config_error("request timeout must be greater than zero"));
        }

        Ok(())
    }

    /// Monta a URL completa de um caminho da API
    pub fn get_api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Substitui os escopos; uma lista vazia volta para [`DEFAULT_SCOPES`]
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = or_default_scopes(scopes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_oauth_urls(mut self, auth_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self.token_url = token_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_callback_port(mut self, port: u16) -> Self {
        self.callback_port = port;
        self
    }
}

pub fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|scope| scope.to_string()).collect()
}

/// Separa escopos por espaço ou vírgula; sem nenhum escopo, usa os padrões
pub fn parse_scopes(raw: &str) -> Vec<String> {
    or_default_scopes(
        raw.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|scope| !scope.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn or_default_scopes(scopes: Vec<String>) -> Vec<String> {
    if scopes.is_empty() {
        default_scopes()
    } else {
        scopes
    }
}

fn parse_timeout_secs(raw: &str) -> AuthResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(AuthError::config_error(
            "WHOOP_TIMEOUT_SECS must be greater than zero",
        )),
        Ok(secs) => Ok(secs),
        Err(_) => Err(AuthError::config_error(format!(
            "WHOOP_TIMEOUT_SECS is not a number of seconds: {}",
            raw
        ))),
    }
}
