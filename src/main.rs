use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use futures_util::TryStreamExt;
use serde::Serialize;
use serde_json::{json, Value};

use whoop_client::client::{
    Collection, Cycles, Recoveries, Sleeps, Workouts, DEFAULT_LIMIT, DEFAULT_PAGE_SIZE,
};
use whoop_client::utils::init_tracing;
use whoop_client::{CollectionParams, Credential, WhoopClient, WhoopConfig};

/// WHOOP CLI - consulta a API WHOOP v2 pela linha de comando
#[derive(Parser)]
#[command(name = "whoop")]
#[command(version)]
#[command(about = "CLI para a API WHOOP v2", long_about = None)]
struct Cli {
    /// Access token de uma sessão existente (ou WHOOP_ACCESS_TOKEN)
    #[arg(long, env = "WHOOP_ACCESS_TOKEN", global = true, hide_env_values = true)]
    access_token: Option<String>,

    /// Refresh token de uma sessão existente (ou WHOOP_REFRESH_TOKEN)
    #[arg(long, env = "WHOOP_REFRESH_TOKEN", global = true, hide_env_values = true)]
    refresh_token: Option<String>,

    /// Formato de saída (json, pretty)
    #[arg(short = 'o', long, default_value = "pretty", global = true)]
    output: OutputFormat,

    /// Modo verbose para debug
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, PartialEq)]
enum OutputFormat {
    Json,
    Pretty,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "pretty" => Ok(OutputFormat::Pretty),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

/// Filtros comuns às coleções
#[derive(Args, Debug, Clone)]
struct CollectionArgs {
    /// Registros por página (máximo 25)
    #[arg(short = 'l', long)]
    limit: Option<u32>,

    /// Início do intervalo (RFC 3339)
    #[arg(long)]
    start: Option<DateTime<Utc>>,

    /// Fim do intervalo (RFC 3339)
    #[arg(long)]
    end: Option<DateTime<Utc>>,

    /// Cursor devolvido pela página anterior
    #[arg(long, conflicts_with = "all")]
    next_token: Option<String>,

    /// Percorre todas as páginas
    #[arg(long)]
    all: bool,
}

impl CollectionArgs {
    fn page_params(&self) -> CollectionParams {
        CollectionParams {
            limit: self.limit.unwrap_or(DEFAULT_LIMIT),
            start: self.start,
            end: self.end,
            next_token: self.next_token.clone(),
        }
    }

    fn walk_params(&self) -> CollectionParams {
        CollectionParams {
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            next_token: None,
            ..self.page_params()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Mostra a URL de consentimento OAuth2
    AuthUrl {
        /// Valor de state para proteção CSRF
        #[arg(long)]
        state: Option<String>,
    },

    /// Autentica no navegador e imprime a credencial obtida
    Login,

    /// Troca um código de autorização por uma credencial
    Exchange {
        #[arg(short = 'c', long)]
        code: String,
    },

    /// Renova a sessão com o refresh token
    Refresh,

    /// Perfil básico do usuário
    Profile,

    /// Medidas corporais do usuário
    Body,

    /// Ciclo fisiológico por ID
    Cycle {
        #[arg(long)]
        id: i64,
    },

    /// Lista ciclos fisiológicos
    Cycles(CollectionArgs),

    /// Sono associado a um ciclo
    CycleSleep {
        #[arg(long)]
        id: i64,
    },

    /// Recuperação associada a um ciclo
    CycleRecovery {
        #[arg(long)]
        id: i64,
    },

    /// Sono por ID
    Sleep {
        #[arg(long)]
        id: String,
    },

    /// Lista sonos
    Sleeps(CollectionArgs),

    /// Lista recuperações
    Recoveries(CollectionArgs),

    /// Treino por ID
    Workout {
        #[arg(long)]
        id: String,
    },

    /// Lista treinos
    Workouts(CollectionArgs),
}

/// Estrutura para resposta padronizada
#[derive(Serialize)]
struct CliResponse {
    success: bool,
    data: Option<Value>,
    error: Option<String>,
    /// Presente quando o comando obteve ou renovou a credencial
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<Credential>,
}

impl CliResponse {
    fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            session: None,
        }
    }

    fn error(msg: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg),
            session: None,
        }
    }
}

#[tokio::main]
async fn main() {
    // Variáveis do .env precisam existir antes do parse (tokens via env)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output_format = cli.output.clone();

    let response = match execute_command(&cli).await {
        Ok(response) => response,
        Err(e) => CliResponse::error(format!("{:#}", e)),
    };

    let exit_code = if response.success { 0 } else { 1 };
    output_response(response, &output_format);
    std::process::exit(exit_code);
}

async fn execute_command(cli: &Cli) -> anyhow::Result<CliResponse> {
    let config = WhoopConfig::from_env().context("failed to load WHOOP configuration")?;
    let mut client =
        WhoopClient::with_session(config, cli.access_token.clone(), cli.refresh_token.clone())?;

    let token_before = client.authenticator().access_token().map(str::to_string);

    let data = match &cli.command {
        Commands::AuthUrl { state } => {
            let url = client.authorization_url(state.as_deref())?;
            json!({ "url": url.as_str() })
        }
        Commands::Login => serde_json::to_value(client.login_interactive().await?)?,
        Commands::Exchange { code } => serde_json::to_value(client.exchange_code(code).await?)?,
        Commands::Refresh => serde_json::to_value(client.refresh().await?)?,
        Commands::Profile => serde_json::to_value(client.get_profile_basic().await?)?,
        Commands::Body => serde_json::to_value(client.get_body_measurement().await?)?,
        Commands::Cycle { id } => serde_json::to_value(client.get_cycle_by_id(*id).await?)?,
        Commands::Cycles(args) => list::<Cycles>(&mut client, args).await?,
        Commands::CycleSleep { id } => {
            serde_json::to_value(client.get_sleep_for_cycle(*id).await?)?
        }
        Commands::CycleRecovery { id } => {
            serde_json::to_value(client.get_recovery_for_cycle(*id).await?)?
        }
        Commands::Sleep { id } => serde_json::to_value(client.get_sleep_by_id(id).await?)?,
        Commands::Sleeps(args) => list::<Sleeps>(&mut client, args).await?,
        Commands::Recoveries(args) => list::<Recoveries>(&mut client, args).await?,
        Commands::Workout { id } => serde_json::to_value(client.get_workout_by_id(id).await?)?,
        Commands::Workouts(args) => list::<Workouts>(&mut client, args).await?,
    };

    let mut response = CliResponse::success(data);

    let token_after = client.authenticator().access_token().map(str::to_string);
    if token_after.is_some() && token_after != token_before {
        response.session = client.authenticator().credential().cloned();
    }

    Ok(response)
}

async fn list<C>(client: &mut WhoopClient, args: &CollectionArgs) -> anyhow::Result<Value>
where
    C: Collection + 'static,
    C::Record: Serialize,
{
    if args.all {
        let records: Vec<C::Record> = client.iterate::<C>(args.walk_params()).try_collect().await?;
        let count = records.len();
        Ok(json!({ "records": records, "count": count }))
    } else {
        let page = client.fetch_page::<C>(&args.page_params()).await?;
        Ok(serde_json::to_value(page)?)
    }
}

fn output_response(response: CliResponse, format: &OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string(&response) {
            Ok(body) => println!("{}", body),
            Err(e) => eprintln!("❌ Erro ao serializar resposta: {}", e),
        },
        OutputFormat::Pretty => {
            if response.success {
                if let Some(data) = &response.data {
                    println!("✅ Sucesso!");
                    print_pretty(data);
                }
                if let Some(session) = &response.session {
                    println!("🔑 Nova sessão (guarde estes tokens):");
                    print_pretty(session);
                }
            } else if let Some(error) = response.error {
                eprintln!("❌ Erro: {}", error);
            }
        }
    }
}

fn print_pretty<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(body) => println!("{}", body),
        Err(e) => eprintln!("❌ Erro ao serializar resposta: {}", e),
    }
}
