//! Traffic light control server binary.
//!
//! Wires the traffic light service to the HTTP control API and runs both
//! until the process is asked to stop.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `trafficlight-config.yaml` (or the path in
//!    `TRAFFICLIGHT_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the traffic light service
//! 4. Spawn the automatic cycle task
//! 5. Serve the control API until Ctrl-C or SIGTERM
//! 6. Stop the cycle task and exit

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use trafficlight_api::{AppState, ServerConfig};
use trafficlight_core::config::LoggingConfig;
use trafficlight_core::{TrafficLightConfig, TrafficLightService};

use crate::error::StartupError;

/// Config file looked up in the working directory when
/// `TRAFFICLIGHT_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "trafficlight-config.yaml";

/// Environment variable naming an explicit config file.
const CONFIG_PATH_ENV: &str = "TRAFFICLIGHT_CONFIG";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, logging setup, or the server fails.
#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;

    info!("trafficlight-server starting");
    match &config_path {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        host = config.server.host,
        port = config.server.port,
        cycle_interval_ms = config.timing.cycle_interval_ms,
        pedestrian_wait_ms = config.timing.pedestrian_wait_ms,
        "Effective configuration"
    );

    // 3. Create the service.
    let service = Arc::new(TrafficLightService::new(&config.timing)?);

    // 4. Start the automatic cycle.
    let cycle = service.spawn_cycle();

    // 5. Serve the control API.
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let state = Arc::new(AppState::new(Arc::clone(&service)));
    let served = trafficlight_api::start_server(&server_config, state, shutdown_signal()).await;

    // 6. Stop the cycle whether or not serving succeeded.
    cycle.abort();
    let last = service.status().await;
    info!(final_state = %last.state(), "trafficlight-server shutdown complete");

    served?;
    Ok(())
}

/// Load configuration, returning the file it came from if any.
///
/// An explicit `TRAFFICLIGHT_CONFIG` path must exist. The default path is
/// optional; when it is absent, defaults plus environment overrides apply.
fn load_config() -> Result<(TrafficLightConfig, Option<PathBuf>), StartupError> {
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(explicit) => {
            let path = PathBuf::from(explicit);
            let config = TrafficLightConfig::from_file(&path)?;
            Ok((config, Some(path)))
        }
        None => load_optional_config(Path::new(DEFAULT_CONFIG_PATH)),
    }
}

/// Load `path` if it exists, otherwise fall back to defaults.
fn load_optional_config(
    path: &Path,
) -> Result<(TrafficLightConfig, Option<PathBuf>), StartupError> {
    if path.exists() {
        let config = TrafficLightConfig::from_file(path)?;
        Ok((config, Some(path.to_path_buf())))
    } else {
        Ok((TrafficLightConfig::parse("")?, None))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), StartupError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| StartupError::Logging {
            message: format!("invalid log level {:?}: {e}", logging.level),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| StartupError::Logging {
        message: e.to_string(),
    })
}

/// Resolve when the process receives Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_optional_config_falls_back_to_defaults() {
        let result = load_optional_config(Path::new("/nonexistent/trafficlight-config.yaml"));
        assert!(matches!(
            result,
            Ok((ref config, None)) if config.timing.cycle_interval_ms == 5_000
        ));
    }
}
