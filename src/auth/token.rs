use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Record;

/// Margem de renovação antecipada aplicada a todo token (5 minutos)
pub const EXPIRY_BUFFER_SECS: i64 = 300;

/// Credencial OAuth2 devolvida pelo endpoint de token
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub token_type: String,
    /// Segundos até a expiração, contados a partir da emissão
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Escopos concedidos, separados por espaço
    #[serde(default)]
    pub scope: Option<String>,
}

impl Credential {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in: u64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "bearer".to_string(),
            expires_in,
            refresh_token,
            scope: None,
        }
    }

    /// Valor do header `Authorization` para chamadas à API
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

// Tokens nunca aparecem em logs
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"***")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("scope", &self.scope)
            .finish()
    }
}

impl Record for Credential {
    const NAME: &'static str = "Credential";
}

#[derive(Debug, Clone, PartialEq)]
struct StoredToken {
    credential: Credential,
    expires_at: DateTime<Utc>,
}

/// Armazena a credencial atual junto com o instante em que deixa de ser usável
///
/// Credencial e expiração são sempre gravadas na mesma chamada.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStore {
    current: Option<StoredToken>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Substitui a sessão atual
    pub fn store(&mut self, credential: Credential) {
        self.store_at(credential, Utc::now());
    }

    pub fn store_at(&mut self, credential: Credential, issued_at: DateTime<Utc>) {
        let expires_at = expiry_instant(issued_at, credential.expires_in);
        self.current = Some(StoredToken {
            credential,
            expires_at,
        });
    }

    /// Grava uma credencial renovada, mantendo o refresh token anterior
    /// quando o servidor não envia um novo
    pub fn renew(&mut self, credential: Credential) {
        self.renew_at(credential, Utc::now());
    }

    pub fn renew_at(&mut self, mut credential: Credential, issued_at: DateTime<Utc>) {
        if credential.refresh_token.is_none() {
            credential.refresh_token = self.refresh_token().map(str::to_string);
        }
        self.store_at(credential, issued_at);
    }

    /// Sem credencial conta como expirado
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match &self.current {
            Some(stored) => now >= stored.expires_at,
            None => true,
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.current.as_ref().map(|stored| &stored.credential)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.credential().map(|c| c.access_token.as_str())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.credential().and_then(|c| c.refresh_token.as_deref())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.current.as_ref().map(|stored| stored.expires_at)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

fn expiry_instant(issued_at: DateTime<Utc>, expires_in: u64) -> DateTime<Utc> {
    let lifetime = i64::try_from(expires_in)
        .unwrap_or(i64::MAX)
        .saturating_sub(EXPIRY_BUFFER_SECS);

    TimeDelta::try_seconds(lifetime)
        .and_then(|delta| issued_at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
