use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod page;
mod routing;
mod server;
mod templates;

/// Config file used when no path is given on the command line (extension optional)
const DEFAULT_CONFIG_PATH: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Tokio runtime, thread count from `server.workers` when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg)).inspect_err(|e| {
        logger::log_error(&format!("Startup failed: {e}"));
    })
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;

    // Templates and the route grammar are compiled once; failures are fatal
    let templates =
        templates::MiniJinjaEngine::new().map_err(config::StartupError::Templates)?;
    let state = Arc::new(config::AppState::new(cfg, Arc::new(templates))?);
    state.prepare_storage().await?;

    let listener = server::create_listener(addr)?;
    logger::log_server_start(&addr, &state.config);

    server::run_server_loop(listener, state).await;
    Ok(())
}
