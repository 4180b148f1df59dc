use std::path::PathBuf;
use std::sync::Arc;

use airmx::mqtt::{run_session, MqttTransport};
use airmx::{Airmx, Config};
use color_eyre::{eyre::eyre, Result};
use rumqttc::AsyncClient;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const REQUESTS_CAP: usize = 100;
const DEFAULT_LOG_FILTER: &str = "info";

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let path = config_path()?;
    let config = Config::load(&path).await?;

    let (client, event_loop) = AsyncClient::new(config.mqtt.options(), REQUESTS_CAP);
    let airmx = Arc::new(Airmx::with_settings(
        MqttTransport::new(client),
        config.devices.clone(),
        config.adapter,
    ));
    register_listeners(&airmx);

    let shutdown = CancellationToken::new();
    let session = tokio::spawn(run_session(
        event_loop,
        airmx.clone(),
        config.mqtt.reconnect_delay(),
        shutdown.clone(),
    ));

    info!(
        "Listening on {}:{} for {} device(s)",
        config.mqtt.host,
        config.mqtt.port,
        config.devices.len()
    );

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| eyre!("Failed to listen for Ctrl-C: {}", e))?;
    info!("Ctrl-C received, shutting down");
    shutdown.cancel();

    if let Err(e) = session.await {
        error!("MQTT session task failed: {}", e);
    }
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_env_filter(log_filter())
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();
}

/// `RUST_LOG` when it is set and valid, `info` otherwise.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// First argument, then `AIRMX_CONFIG`, then the per-user config directory.
fn config_path() -> Result<PathBuf> {
    if let Some(arg) = std::env::args_os().nth(1) {
        return Ok(PathBuf::from(arg));
    }
    if let Some(env) = std::env::var_os("AIRMX_CONFIG") {
        return Ok(PathBuf::from(env));
    }
    Config::default_path().ok_or_else(|| eyre!("Could not determine a config directory"))
}

fn register_listeners(airmx: &Airmx<MqttTransport>) {
    airmx
        .on_eagle_update(|status| {
            info!(
                device_id = status.device_id(),
                power = status.power(),
                mode = ?status.mode(),
                cadr = status.cadr(),
                heater = status.heat_status(),
                denoise = status.denoise(),
                temperature = status.temperature(),
                "Eagle status"
            );
            Ok(())
        })
        .on_snow_update(|status| {
            info!(
                device_id = status.device_id(),
                temperature = status.temperature(),
                humidity = status.humidity(),
                pm25 = status.pm25(),
                co2 = status.co2(),
                tvoc = status.tvoc(),
                battery = status.battery(),
                "Snow status"
            );
            Ok(())
        });
}
