use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::token::{Credential, TokenStore};
use crate::config::{default_scopes, WhoopConfig};
use crate::error::{AuthError, WhoopResult};
use crate::models::decode;

/// Validade assumida para sessões restauradas sem `expires_in`
pub const DEFAULT_RESTORED_EXPIRES_IN: u64 = 3600;

/// Fluxo OAuth2 authorization-code da WHOOP
///
/// É dono exclusivo do [`TokenStore`]; apenas [`exchange_code`](Self::exchange_code) e
/// [`refresh`](Self::refresh) fazem I/O de rede.
#[derive(Debug, Clone)]
pub struct Authenticator {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: Vec<String>,
    auth_url: String,
    token_url: String,
    http: reqwest::Client,
    store: TokenStore,
}

impl Authenticator {
    pub fn new(config: &WhoopConfig, http: reqwest::Client) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: if config.scopes.is_empty() {
                default_scopes()
            } else {
                config.scopes.clone()
            },
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            http,
            store: TokenStore::new(),
        }
    }

    /// Gera a URL de consentimento para onde o usuário deve ser enviado
    ///
    /// Os parâmetros seguem a codificação `application/x-www-form-urlencoded`
    /// (espaços viram `+`), na ordem `response_type`, `client_id`, `redirect_uri`,
    /// `scope` e, se informado, `state`.
    pub fn build_authorization_url(&self, state: Option<&str>) -> WhoopResult<Url> {
        let mut url = Url::parse(&self.auth_url)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", &self.redirect_uri)
                .append_pair("scope", &self.scopes.join(" "));
            if let Some(state) = state.filter(|s| !s.is_empty()) {
                query.append_pair("state", state);
            }
        }
        Ok(url)
    }

    /// Troca o código de autorização por uma credencial e a armazena
    pub async fn exchange_code(&mut self, code: &str) -> WhoopResult<Credential> {
        info!("🔄 Trocando código de autorização por token...");

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        let credential = self.request_token(&params).await?;
        self.store.store(credential.clone());

        info!("✅ Token de acesso obtido");
        Ok(credential)
    }

    /// Renova a credencial com um refresh token
    ///
    /// Se a resposta não trouxer um novo `refresh_token`, o anterior continua
    /// armazenado. O valor retornado é a resposta do servidor como recebida.
    pub async fn refresh(&mut self, refresh_token: &str) -> WhoopResult<Credential> {
        info!("🔄 Renovando token de acesso...");

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let credential = self.request_token(&params).await?;
        self.store.renew(credential.clone());

        info!("✅ Token renovado");
        Ok(credential)
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> WhoopResult<Credential> {
        debug!("POST {}", self.token_url);

        let response = self.http.post(&self.token_url).form(params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("❌ Endpoint de token respondeu {}", status);
            return Err(AuthError::token_endpoint(status.as_u16(), body).into());
        }

        let body = response.bytes().await?;
        Ok(decode::<Credential>(&body)?)
    }

    /// Restaura uma sessão já obtida (por exemplo, lida de um arquivo)
    pub fn set_credential(
        &mut self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in: Option<u64>,
    ) {
        let credential = Credential::new(
            access_token,
            Some(refresh_token.into()),
            expires_in.unwrap_or(DEFAULT_RESTORED_EXPIRES_IN),
        );
        self.store.store(credential);
    }

    pub fn is_expired(&self) -> bool {
        self.store.is_expired()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.store.access_token()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.store.refresh_token()
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.store.credential()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.store.expires_at()
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Descarta a sessão atual (logout local)
    pub fn clear(&mut self) {
        self.store.clear();
    }
}
