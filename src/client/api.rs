use std::time::Duration;

use reqwest::{Client, Method, Response};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::auth::{Authenticator, CallbackServer, Credential};
use crate::config::WhoopConfig;
use crate::error::{AuthError, WhoopError, WhoopResult};
use crate::models::{
    decode, Cycle, CycleCollection, Page, Record, Recovery, RecoveryCollection, Sleep,
    SleepCollection, UserBasicProfile, UserBodyMeasurement, WorkoutCollection, WorkoutV2,
};

use super::params::CollectionParams;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Coleção paginada da API: caminho do endpoint + tipo de registro
pub trait Collection {
    const PATH: &'static str;
    type Record: Record;
}

/// Ciclos fisiológicos (`/v2/cycle`)
#[derive(Debug, Clone, Copy)]
pub struct Cycles;

/// Sonos (`/v2/activity/sleep`)
#[derive(Debug, Clone, Copy)]
pub struct Sleeps;

/// Recuperações (`/v2/activity/recovery`)
#[derive(Debug, Clone, Copy)]
pub struct Recoveries;

/// Treinos (`/v2/activity/workout`)
#[derive(Debug, Clone, Copy)]
pub struct Workouts;

impl Collection for Cycles {
    const PATH: &'static str = "/v2/cycle";
    type Record = Cycle;
}

impl Collection for Sleeps {
    const PATH: &'static str = "/v2/activity/sleep";
    type Record = Sleep;
}

impl Collection for Recoveries {
    const PATH: &'static str = "/v2/activity/recovery";
    type Record = Recovery;
}

impl Collection for Workouts {
    const PATH: &'static str = "/v2/activity/workout";
    type Record = WorkoutV2;
}

/// Cliente HTTP da API WHOOP v2
///
/// Os métodos recebem `&mut self` porque uma chamada pode renovar o token armazenado.
/// Para compartilhar um cliente entre tasks, envolva-o em `tokio::sync::Mutex`.
#[derive(Debug, Clone)]
pub struct WhoopClient {
    config: WhoopConfig,
    http: Client,
    auth: Authenticator,
}

impl WhoopClient {
    /// Cria um cliente sem sessão; use [`login_interactive`](Self::login_interactive) ou
    /// [`exchange_code`](Self::exchange_code) para autenticar
    pub fn new(config: WhoopConfig) -> WhoopResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        let auth = Authenticator::new(&config, http.clone());

        Ok(Self { config, http, auth })
    }

    /// Cria um cliente com uma sessão restaurada
    pub fn with_tokens(
        config: WhoopConfig,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> WhoopResult<Self> {
        let mut client = Self::new(config)?;
        client.auth.set_credential(access_token, refresh_token, None);
        Ok(client)
    }

    /// Restaura a sessão apenas quando os dois tokens são informados
    pub fn with_session(
        config: WhoopConfig,
        access_token: Option<String>,
        refresh_token: Option<String>,
    ) -> WhoopResult<Self> {
        match (access_token, refresh_token) {
            (Some(access), Some(refresh)) => Self::with_tokens(config, access, refresh),
            _ => Self::new(config),
        }
    }

    pub fn config(&self) -> &WhoopConfig {
        &self.config
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.auth
    }

    pub fn authenticator_mut(&mut self) -> &mut Authenticator {
        &mut self.auth
    }

    pub fn authorization_url(&self, state: Option<&str>) -> WhoopResult<Url> {
        self.auth.build_authorization_url(state)
    }

    pub async fn exchange_code(&mut self, code: &str) -> WhoopResult<Credential> {
        self.auth.exchange_code(code).await
    }

    /// Renova a sessão atual com o refresh token armazenado
    pub async fn refresh(&mut self) -> WhoopResult<Credential> {
        let refresh_token = self
            .auth
            .refresh_token()
            .map(str::to_string)
            .ok_or(AuthError::TokenExpired)?;
        self.auth.refresh(&refresh_token).await
    }

    /// Fluxo completo no navegador: URL de consentimento, callback local e troca do código
    pub async fn login_interactive(&mut self) -> WhoopResult<Credential> {
        info!("🔑 Iniciando autenticação OAuth2 da WHOOP...");

        let state = Uuid::new_v4().to_string();
        let auth_url = self.authorization_url(Some(&state))?;
        let callback_path = Url::parse(self.auth.redirect_uri())?.path().to_string();

        let server = CallbackServer::new(self.config.callback_port, state).with_path(callback_path);
        let server_handle = tokio::spawn(server.start_and_wait());

        if let Err(e) = webbrowser::open(auth_url.as_str()) {
            warn!("⚠️ Não foi possível abrir o navegador automaticamente: {}", e);
            info!("🔗 Abra manualmente o link: {}", auth_url);
        } else {
            info!("🌐 Navegador aberto, aguardando autorização do usuário...");
        }

        let callback = server_handle
            .await
            .map_err(|e| AuthError::callback_error(format!("callback task failed: {}", e)))??;

        self.exchange_code(&callback.code).await
    }

    /// Garante um access token utilizável, renovando-o se preciso
    async fn ensure_fresh_token(&mut self) -> WhoopResult<String> {
        if self.auth.is_expired() {
            match self.auth.refresh_token().map(str::to_string) {
                Some(refresh_token) => {
                    debug!("Token expirado, renovando antes da requisição");
                    self.auth.refresh(&refresh_token).await?;
                }
                None if self.auth.access_token().is_some() => {
                    return Err(AuthError::TokenExpired.into());
                }
                None => {}
            }
        }

        self.auth
            .access_token()
            .map(str::to_string)
            .ok_or(WhoopError::Auth(AuthError::NoAccessToken))
    }

    /// Executa uma requisição autenticada contra a API
    ///
    /// Respostas não-2xx viram [`WhoopError::Http`]; não há nova tentativa.
    pub async fn authorized_request(
        &mut self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> WhoopResult<Response> {
        let access_token = self.ensure_fresh_token().await?;
        let url = self.config.get_api_url(path);

        debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("❌ {} {} respondeu {}", method, path, status);
            return Err(WhoopError::Http {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Response status: {}", status);
        Ok(response)
    }

    async fn get<T: Record>(&mut self, path: &str, query: &[(&str, String)]) -> WhoopResult<T> {
        let response = self.authorized_request(Method::GET, path, query, None).await?;
        let body = response.bytes().await?;
        Ok(decode(&body)?)
    }

    /// Busca uma página de qualquer coleção
    pub async fn fetch_page<C: Collection>(
        &mut self,
        params: &CollectionParams,
    ) -> WhoopResult<Page<C::Record>> {
        self.get(C::PATH, &params.to_query()).await
    }

    pub async fn get_cycle_by_id(&mut self, cycle_id: i64) -> WhoopResult<Cycle> {
        self.get(&format!("/v2/cycle/{}", cycle_id), &[]).await
    }

    pub async fn get_cycle_collection(
        &mut self,
        params: &CollectionParams,
    ) -> WhoopResult<CycleCollection> {
        self.fetch_page::<Cycles>(params).await
    }

    /// Sono que encerrou o ciclo
    pub async fn get_sleep_for_cycle(&mut self, cycle_id: i64) -> WhoopResult<Sleep> {
        self.get(&format!("/v2/cycle/{}/sleep", cycle_id), &[]).await
    }

    pub async fn get_recovery_collection(
        &mut self,
        params: &CollectionParams,
    ) -> WhoopResult<RecoveryCollection> {
        self.fetch_page::<Recoveries>(params).await
    }

    pub async fn get_recovery_for_cycle(&mut self, cycle_id: i64) -> WhoopResult<Recovery> {
        self.get(
            &format!("/v2/activity/recovery/cycle/{}/recovery", cycle_id),
            &[],
        )
        .await
    }

    pub async fn get_sleep_by_id(&mut self, sleep_id: &str) -> WhoopResult<Sleep> {
        let path = format!("/v2/activity/sleep/{}", urlencoding::encode(sleep_id));
        self.get(&path, &[]).await
    }

    pub async fn get_sleep_collection(
        &mut self,
        params: &CollectionParams,
    ) -> WhoopResult<SleepCollection> {
        self.fetch_page::<Sleeps>(params).await
    }

    pub async fn get_body_measurement(&mut self) -> WhoopResult<UserBodyMeasurement> {
        self.get("/v2/user/measurement/body", &[]).await
    }

    pub async fn get_profile_basic(&mut self) -> WhoopResult<UserBasicProfile> {
        self.get("/v2/user/profile/basic", &[]).await
    }

    pub async fn get_workout_by_id(&mut self, workout_id: &str) -> WhoopResult<WorkoutV2> {
        let path = format!("/v2/activity/workout/{}", urlencoding::encode(workout_id));
        self.get(&path, &[]).await
    }

    pub async fn get_workout_collection(
        &mut self,
        params: &CollectionParams,
    ) -> WhoopResult<WorkoutCollection> {
        self.fetch_page::<Workouts>(params).await
    }
}
