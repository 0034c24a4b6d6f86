use std::future::Future;

use storegate_api::ApiServer;
use storegate_config::ProxyConfig;
use storegate_telemetry::{
    DEFAULT_LOG_LEVEL, GlobalContextGuard, LogFormat, LoggingConfig, Metrics, build_sha,
};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Dependencies required to bootstrap the proxy.
pub(crate) struct BootstrapDependencies {
    config: ProxyConfig,
    telemetry: Metrics,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the binary entrypoint.
    pub(crate) fn from_env() -> AppResult<Self> {
        let config =
            ProxyConfig::from_env().map_err(|err| AppError::config("config.from_env", err))?;
        Self::new(config)
    }

    pub(crate) fn new(config: ProxyConfig) -> AppResult<Self> {
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        Ok(Self { config, telemetry })
    }

    fn logging(&self) -> LoggingConfig<'_> {
        LoggingConfig {
            level: self.config.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL),
            format: self
                .config
                .log_format
                .as_deref()
                .map_or_else(LogFormat::infer, LogFormat::from_name),
            build_sha: build_sha(),
        }
    }
}

/// Entry point for the Storegate boot sequence.
///
/// # Errors
///
/// Returns an error if configuration loading, logging setup, or the listener fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    storegate_telemetry::init_logging(&dependencies.logging())
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    run_app_with(dependencies, shutdown_signal()).await
}

/// Boot sequence that relies entirely on injected dependencies to simplify testing.
pub(crate) async fn run_app_with<F>(
    dependencies: BootstrapDependencies,
    shutdown: F,
) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let _context = GlobalContextGuard::new("bootstrap");
    info!("Storegate proxy bootstrap starting");

    let BootstrapDependencies { config, telemetry } = dependencies;
    let api = ApiServer::new(&config, telemetry)
        .map_err(|err| AppError::api_server("api_server.new", err))?;

    let addr = config.socket_addr();
    if !addr.ip().is_loopback() {
        warn!(addr = %addr, "proxy listener is reachable beyond loopback");
    }
    info!(addr = %addr, "Launching API listener");

    api.serve(addr, shutdown)
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err))?;
    info!("API server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to install ctrl-c handler; serving until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
