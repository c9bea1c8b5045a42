use anyhow::Context;
use barbican_cache::{
    api::start_api_server,
    config::AppConfig,
    observability::{init_logging, log_config_info},
    startup::build_resolver,
    APP_NAME, VERSION,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists; must happen before any config is read
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let config = AppConfig::from_env().context("loading configuration")?;
    init_logging(&config.observability).context("initializing logging")?;

    info!(app_name = APP_NAME, version = VERSION, "Starting Barbican cache");
    log_config_info(&config);

    let resolver = build_resolver(&config).await.context("building resolver")?;

    let report = match resolver.load_all().await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Initial container load failed");
            return Err(e).context("loading containers from Barbican");
        }
    };
    for warning in &report.warnings {
        warn!(?warning, "Skipped record during initial load");
    }
    info!(
        containers = report.containers_loaded,
        secrets = report.secrets_loaded,
        clean = report.is_clean(),
        "Initial load complete"
    );

    start_api_server(config.server.clone(), resolver).await.context("serving API")?;
    Ok(())
}
