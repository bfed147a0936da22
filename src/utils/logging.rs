use tracing_subscriber::EnvFilter;

/// Filtro padrão quando `RUST_LOG` não está definido
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Filtro de logs: `RUST_LOG` tem prioridade; `--verbose` troca o padrão para `debug`
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Inicializa o subscriber global do tracing (logs em stderr)
pub fn init_tracing(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
