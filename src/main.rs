use sprout_brain::advisor::Advisor;
use sprout_brain::portfolio_index::PortfolioIndex;
use sprout_core::config::Config;
use sprout_invest::client::InvestClient;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::var("SPROUT_CONFIG").unwrap_or_else(|_| "sprout.toml".to_string());

    let config = Config::load(Path::new(&config_path)).unwrap_or_else(|e| {
        eprintln!("fatal: failed to load config: {e}");
        std::process::exit(1);
    });

    if config.llm.api_key.is_empty() && config.llm.provider != "ollama" {
        eprintln!("fatal: SPROUT_LLM_API_KEY is not set");
        std::process::exit(1);
    }

    let invest = InvestClient::new(
        &config.invest.base_url,
        config.invest.api_key.clone(),
        Duration::from_secs(config.invest.timeout_secs),
    )
    .unwrap_or_else(|e| {
        eprintln!("fatal: failed to create account client: {e}");
        std::process::exit(1);
    });

    let index = PortfolioIndex::load(&config.brain.portfolio_index_path).unwrap_or_else(|e| {
        eprintln!("fatal: failed to load portfolio index: {e}");
        std::process::exit(1);
    });

    let advisor = Arc::new(Advisor::from_config(
        &config,
        Arc::new(invest),
        Arc::new(index),
    ));

    let clients = config.registered_clients();
    if clients.is_empty() {
        tracing::warn!("no clients configured; every message will be ignored");
    }
    for client_id in &clients {
        advisor.register_client(client_id).await;
    }

    tracing::info!(clients = clients.len(), port = config.whatsapp.port, "sprout: starting");

    if let Err(e) = sprout_whatsapp::webhook::serve(config.whatsapp.port, advisor).await {
        eprintln!("fatal: webhook error: {e}");
        std::process::exit(1);
    }
}
