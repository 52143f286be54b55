// # weatherd - Weather Add-on Daemon
//
// Thin integration layer around weather-core. All polling and property
// logic lives in the library.
//
// The weatherd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Loading the add-on preferences from the settings file
// 3. Initializing logging and the runtime
// 4. Starting the poller and stopping it on a signal
//
// ## Configuration
//
// - `WEATHERD_SETTINGS_PATH`: Preferences file
//   (default `$WEBTHINGS_HOME/config/candle-weather.json`, with
//   `WEBTHINGS_HOME` defaulting to `~/.webthings`; `WEATHERD_HOME` overrides both)
// - `WEATHERD_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `WEATHERD_BASE_URL`: Upstream feed override (default: public WMO feed)
//
// The "Debugging" preference raises the log level to debug.
//
// ## Example
//
// ```bash
// export WEATHERD_SETTINGS_PATH=/home/pi/.webthings/config/candle-weather.json
// export WEATHERD_LOG_LEVEL=info
//
// weatherd
// ```

mod host;

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use weather_core::settings::{FileSettingsStore, load_config};
use weather_core::traits::WeatherSource;
use weather_core::{Poller, PollerEvent};

use crate::host::LogHost;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Settings file name inside the gateway's config directory
const SETTINGS_FILE_NAME: &str = "candle-weather.json";

/// Upper bound on waiting for the poller after a stop request
///
/// Covers the one-second tick plus one in-flight cycle.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum WeatherdExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<WeatherdExitCode> for ExitCode {
    fn from(code: WeatherdExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon configuration from the environment
struct Config {
    settings_path: PathBuf,
    log_level: String,
    base_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let settings_path = match env::var("WEATHERD_SETTINGS_PATH") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_settings_path()?,
        };

        Ok(Self {
            settings_path,
            log_level: env::var("WEATHERD_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            base_url: env::var("WEATHERD_BASE_URL").ok().filter(|u| !u.trim().is_empty()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.settings_path.as_os_str().is_empty() {
            anyhow::bail!("WEATHERD_SETTINGS_PATH cannot be empty");
        }

        if let Some(ref url) = self.base_url
            && !url.starts_with("https://")
            && !url.starts_with("http://")
        {
            anyhow::bail!("WEATHERD_BASE_URL must use HTTP or HTTPS scheme. Got: {}", url);
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "WEATHERD_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Configured level, raised to debug when the add-on's debugging switch is on
    fn tracing_level(&self, debug_preference: bool) -> Level {
        let level = match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        if debug_preference && level != Level::TRACE {
            Level::DEBUG
        } else {
            level
        }
    }
}

/// `$WEATHERD_HOME`, else `$WEBTHINGS_HOME`, else `$HOME/.webthings`; then
/// `config/candle-weather.json` inside it
fn default_settings_path() -> Result<PathBuf> {
    let home = env::var("WEATHERD_HOME")
        .or_else(|_| env::var("WEBTHINGS_HOME"))
        .map(PathBuf::from)
        .or_else(|_| {
            env::var("HOME")
                .map(|home| PathBuf::from(home).join(".webthings"))
                .map_err(|_| {
                    anyhow::anyhow!("Cannot locate settings: set WEATHERD_SETTINGS_PATH or HOME")
                })
        })?;

    Ok(home.join("config").join(SETTINGS_FILE_NAME))
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return WeatherdExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return WeatherdExitCode::ConfigError.into();
    }

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            return WeatherdExitCode::RuntimeError.into();
        }
    };

    // Preferences decide the log level, so they load before tracing starts
    let store = FileSettingsStore::new(&config.settings_path);
    let (weather_config, settings_error) = rt.block_on(load_config(&store));

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.tracing_level(weather_config.debug))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return WeatherdExitCode::ConfigError.into();
    }

    info!("Starting weatherd daemon");
    match settings_error {
        Some(e) => warn!(
            "Could not load settings from {}: {}. Using defaults.",
            config.settings_path.display(),
            e
        ),
        None => debug!("Settings path: {}", config.settings_path.display()),
    }
    info!(
        "City {}, {} units, update every {:?}",
        weather_config.location_id,
        if weather_config.is_metric() { "metric" } else { "imperial" },
        weather_config.poll_interval()
    );

    let result = rt.block_on(async {
        let source = match weather_source(&config) {
            Ok(source) => source,
            Err(e) => {
                error!("Startup error: {}", e);
                return WeatherdExitCode::ConfigError;
            }
        };

        let host = Arc::new(LogHost::new());
        let (poller, events) = match Poller::new(source, host, weather_config) {
            Ok(parts) => parts,
            Err(e) => {
                error!("Startup error: {}", e);
                return WeatherdExitCode::ConfigError;
            }
        };

        if let Err(e) = run_daemon(poller, events).await {
            error!("Daemon error: {}", e);
            WeatherdExitCode::RuntimeError
        } else {
            WeatherdExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build the compiled-in weather source
#[cfg(feature = "wmo")]
fn weather_source(config: &Config) -> Result<Box<dyn WeatherSource>> {
    let source = match &config.base_url {
        Some(url) => weather_source_wmo::WmoWeatherSource::with_base_url(url.clone()),
        None => weather_source_wmo::WmoWeatherSource::new(),
    };
    info!("Weather source: {}", source.base_url());
    Ok(Box::new(source))
}

#[cfg(not(feature = "wmo"))]
fn weather_source(_config: &Config) -> Result<Box<dyn WeatherSource>> {
    anyhow::bail!("No weather source compiled in; rebuild with the `wmo` feature")
}

/// Run the poller until a shutdown signal arrives
async fn run_daemon(mut poller: Poller, mut events: mpsc::Receiver<PollerEvent>) -> Result<()> {
    let stop = poller.stop_handle();

    let event_logger = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                PollerEvent::SectionFailed { section, error } => {
                    debug!("{} unavailable this cycle: {}", section, error)
                }
                PollerEvent::CycleCompleted { cycle, changed } if changed > 0 => {
                    info!("Cycle {}: {} change(s)", cycle, changed)
                }
                other => debug!("Poller event: {:?}", other),
            }
        }
    });

    let mut poller_task = tokio::spawn(async move { poller.run().await });

    tokio::select! {
        received = wait_for_shutdown() => {
            info!("Received shutdown signal: {}", received?);
            info!("Shutting down daemon");
            stop.stop();
        }
        joined = &mut poller_task => {
            event_logger.abort();
            return match joined {
                Ok(Ok(())) => Err(anyhow::anyhow!("Poller exited without a stop request")),
                Ok(Err(e)) => Err(e.into()),
                Err(e) => Err(anyhow::anyhow!("Poller task failed: {}", e)),
            };
        }
    }

    let joined = tokio::time::timeout(SHUTDOWN_TIMEOUT, poller_task)
        .await
        .map_err(|_| anyhow::anyhow!("Shutdown timeout after {:?}", SHUTDOWN_TIMEOUT))?;

    match joined {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(e.into()),
        Err(e) => return Err(anyhow::anyhow!("Poller task failed: {}", e)),
    }

    // The poller dropped its sender, so the logger drains and exits
    let _ = event_logger.await;
    info!("Daemon stopped");

    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(signal)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(log_level: &str) -> Config {
        Config {
            settings_path: PathBuf::from("/tmp/candle-weather.json"),
            log_level: log_level.to_string(),
            base_url: None,
        }
    }

    #[test]
    fn debugging_preference_raises_level() {
        assert_eq!(config("info").tracing_level(false), Level::INFO);
        assert_eq!(config("info").tracing_level(true), Level::DEBUG);
        assert_eq!(config("error").tracing_level(true), Level::DEBUG);
        assert_eq!(config("trace").tracing_level(true), Level::TRACE);
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(config("info").validate().is_ok());
        assert!(config("loud").validate().is_err());

        let mut bad_url = config("info");
        bad_url.base_url = Some("ftp://example.org/".to_string());
        assert!(bad_url.validate().is_err());
    }
}
