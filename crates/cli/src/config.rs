use config::{Config as ConfigLoader, Environment, File, FileFormat};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::Error;
use fx_arb_core::DuplicatePolicy;

pub const DEFAULT_CONFIG_FILE: &str = "Config.toml";
pub const DEFAULT_ENDPOINT: &str = "https://v6.exchangerate-api.com/v6";

/// Rate-provider settings. Passed explicitly to the fetchers; nothing reads
/// credentials from process-wide state after loading.
#[derive(Deserialize, Clone)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub request_timeout_ms: u64,
    pub max_concurrent_requests: usize,
}

impl ProviderConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    pub relaxation_tolerance: f64,
    pub duplicate_policy: DuplicatePolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulatorConfig {
    pub seed: u64,
    pub fluctuation_bps: f64,
    /// When set, the first three requested currencies form a loop paying this multiplier.
    pub planted_multiplier: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub provider: ProviderConfig,
    pub engine: EngineConfig,
    pub simulator: SimulatorConfig,
}

/// Loads configuration from an optional TOML file and `FXARB_*` environment variables.
///
/// Without an explicit `path`, `Config.toml` in the working directory is used
/// if it exists. Environment keys use `__` between section and field, e.g.
/// `FXARB_PROVIDER__API_KEY`.
pub fn load_config(path: Option<&Path>) -> Result<Config, Error> {
    let config_file_path: PathBuf = match path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::ConfigLoadError(format!(
                    "Configuration file not found at path: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => env::current_dir()
            .map_err(|e| {
                Error::ConfigLoadError(format!("Failed to determine current directory: {}", e))
            })?
            .join(DEFAULT_CONFIG_FILE),
    };

    let s = ConfigLoader::builder()
        .set_default("provider.endpoint", DEFAULT_ENDPOINT)
        .and_then(|b| b.set_default("provider.request_timeout_ms", 5_000u64))
        .and_then(|b| b.set_default("provider.max_concurrent_requests", 4u64))
        .and_then(|b| b.set_default("engine.relaxation_tolerance", 1e-12))
        .and_then(|b| b.set_default("engine.duplicate_policy", "last_write_wins"))
        .and_then(|b| b.set_default("simulator.seed", 7u64))
        .and_then(|b| b.set_default("simulator.fluctuation_bps", 5.0))
        .map_err(|e| Error::ConfigLoadError(e.to_string()))?
        .add_source(
            File::from(config_file_path.as_path())
                .format(FileFormat::Toml)
                .required(false),
        )
        .add_source(
            Environment::with_prefix("FXARB")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| Error::ConfigLoadError(e.to_string()))?;

    let app_config: Config = s
        .try_deserialize()
        .map_err(|e| Error::ConfigLoadError(format!("Failed to deserialize config: {}", e)))?;

    if app_config.provider.max_concurrent_requests == 0 {
        return Err(Error::ConfigLoadError(
            "provider.max_concurrent_requests must be at least 1".to_string(),
        ));
    }

    let tolerance = app_config.engine.relaxation_tolerance;
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(Error::ConfigLoadError(format!(
            "engine.relaxation_tolerance must be a finite value >= 0, got {}",
            tolerance
        )));
    }

    Ok(app_config)
}
