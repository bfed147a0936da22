use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use warp::Filter;

use crate::error::{AuthError, AuthResult};

/// Tempo máximo de espera pela autorização do usuário
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Servidor HTTP local que recebe o redirecionamento do OAuth2
pub struct CallbackServer {
    port: u16,
    path: String,
    state: String,
    timeout: Duration,
}

/// Resultado do callback OAuth2
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackResult {
    pub code: String,
    pub state: String,
}

impl CallbackServer {
    pub fn new(port: u16, state: impl Into<String>) -> Self {
        Self {
            port,
            path: "/callback".to_string(),
            state: state.into(),
            timeout: CALLBACK_TIMEOUT,
        }
    }

    /// Caminho do callback; deve coincidir com o da redirect URI registrada
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Inicia o servidor e aguarda um único callback
    pub async fn start_and_wait(self) -> AuthResult<CallbackResult> {
        let (tx, rx) = oneshot::channel::<AuthResult<CallbackResult>>();
        let tx = Arc::new(Mutex::new(Some(tx)));
        let expected_state = self.state.clone();
        let expected_path = self.path.clone();

        let callback_route = warp::path::full()
            .and(warp::query::<HashMap<String, String>>())
            .and_then(move |full: warp::path::FullPath, params: HashMap<String, String>| {
                let tx = tx.clone();
                let expected_state = expected_state.clone();
                let expected_path = expected_path.clone();

                async move {
                    if full.as_str() != expected_path {
                        return Err(warp::reject::not_found());
                    }

                    debug!("Callback OAuth2 recebido em {}", full.as_str());
                    let result = Self::process_callback(&params, &expected_state);
                    let is_success = result.is_ok();

                    if let Ok(mut sender) = tx.lock() {
                        if let Some(tx) = sender.take() {
                            let _ = tx.send(result);
                        }
                    }

                    let html_response = if is_success {
                        warp::reply::html(SUCCESS_PAGE)
                    } else {
                        warp::reply::html(ERROR_PAGE)
                    };
                    Ok::<_, warp::Rejection>(html_response)
                }
            });

        let status_route = warp::path::end().map(|| warp::reply::html(WAITING_PAGE));

        let routes = callback_route
            .or(status_route)
            .with(warp::filters::trace::request());

        let addr = ([127, 0, 0, 1], self.port);
        let (actual_addr, server_future) = warp::serve(routes)
            .try_bind_ephemeral(addr)
            .map_err(|e| AuthError::callback_error(format!("failed to bind callback server: {}", e)))?;

        info!("🌐 Servidor de callback aguardando em http://{}{}", actual_addr, self.path);

        let server_task = tokio::spawn(server_future);
        let result = tokio::time::timeout(self.timeout, rx).await;
        server_task.abort();

        match result {
            Ok(Ok(callback_result)) => callback_result,
            Ok(Err(_)) => Err(AuthError::callback_error("callback channel closed")),
            Err(_) => {
                warn!("⏰ Tempo esgotado aguardando autorização");
                Err(AuthError::Timeout)
            }
        }
    }

    /// Valida os parâmetros do redirecionamento
    pub fn process_callback(
        params: &HashMap<String, String>,
        expected_state: &str,
    ) -> AuthResult<CallbackResult> {
        if let Some(error) = params.get("error") {
            return match error.as_str() {
                "access_denied" => Err(AuthError::AccessDenied),
                other => Err(AuthError::callback_error(format!(
                    "authorization server returned error: {}",
                    other
                ))),
            };
        }

        // Proteção CSRF antes de aceitar qualquer código
        let received_state = params.get("state").ok_or(AuthError::InvalidState)?;
        if received_state != expected_state {
            return Err(AuthError::InvalidState);
        }

        let code = params
            .get("code")
            .filter(|code| !code.is_empty())
            .ok_or_else(|| AuthError::InvalidCode("code parameter not present in callback".to_string()))?;

        info!("✅ Callback OAuth2 validado");

        Ok(CallbackResult {
            code: code.clone(),
            state: received_state.clone(),
        })
    }
}

const WAITING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>WHOOP - Aguardando Autorização</title>
    <meta charset="UTF-8">
    <style>
        body { font-family: Arial, sans-serif; background: #101518; color: #fff; text-align: center; padding: 40px; }
    </style>
</head>
<body>
    <h1>Aguardando autorização da WHOOP...</h1>
    <p>Conclua o consentimento na aba aberta pelo navegador.</p>
</body>
</html>
"#;

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>WHOOP - Autorização Concluída</title>
    <meta charset="UTF-8">
    <style>
        body { font-family: Arial, sans-serif; background: #101518; color: #fff; text-align: center; padding: 40px; }
        h1 { color: #00f19f; }
    </style>
</head>
<body>
    <h1>Autorização concluída</h1>
    <p>Você já pode fechar esta janela e voltar ao terminal.</p>
    <script>setTimeout(() => window.close(), 3000);</script>
</body>
</html>
"#;

const ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>WHOOP - Falha na Autorização</title>
    <meta charset="UTF-8">
    <style>
        body { font-family: Arial, sans-serif; background: #101518; color: #fff; text-align: center; padding: 40px; }
        h1 { color: #ff5a5f; }
    </style>
</head>
<body>
    <h1>Falha na autorização</h1>
    <p>Verifique o terminal para mais detalhes e tente novamente.</p>
</body>
</html>
"#;
