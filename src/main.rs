use omega_analyst::analyst::{AnalystFactory, AnalystHandle};
use omega_analyst::api::{run_server, AppState};
use omega_analyst::config::AppConfig;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Setup Logging
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Omega Analyst...");

    // Load Configuration
    let config = AppConfig::load()?;
    info!("Loaded Configuration: {:?}", config);

    info!("Using LLM Model: {} @ {}", config.analyst.model, config.analyst.base_url);

    let factory = AnalystFactory::new(config.analyst.clone());
    let state = Arc::new(AppState {
        analyst: AnalystHandle::new(factory),
    });

    let status = state.analyst.get().status();
    if status.enabled {
        info!("🧠 AI panels enabled");
    } else {
        info!("ℹ️ No API key found - AI panels will report the service as disabled");
    }

    info!("Initializing API Server...");
    run_server(state, &config.server.bind_addr).await?;

    Ok(())
}
