//! Application configuration.
//!
//! Resolution order: built-in defaults, then `fitfoodie.toml` (in the data
//! directory, or wherever `FITFOODIE_CONFIG` points), then environment
//! variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::gateway::{GatewaySettings, Provider};

pub const CONFIG_FILE_NAME: &str = "fitfoodie.toml";
pub const DATABASE_FILE_NAME: &str = "fitfoodie.db";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub provider: Provider,
    pub model: String,
    /// Empty when no key is configured; the gateway refuses to start then
    pub api_key: String,
    pub base_url: Option<Url>,
    pub data_dir: PathBuf,
    pub request_timeout_secs: u64,
}

/// On-disk shape of `fitfoodie.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    provider: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    data_dir: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Resolve configuration with `env` standing in for the environment.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let env_data_dir = var("FITFOODIE_DATA_DIR").map(PathBuf::from);
        let base_dir = match &env_data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir()?,
        };

        let file = match var("FITFOODIE_CONFIG") {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.exists() {
                    bail!("Config file {:?} (from FITFOODIE_CONFIG) does not exist", path);
                }
                read_file_config(&path)?
            }
            None => {
                let path = base_dir.join(CONFIG_FILE_NAME);
                if path.exists() {
                    read_file_config(&path)?
                } else {
                    debug!("No config file at {:?}, using defaults", path);
                    FileConfig::default()
                }
            }
        };

        let provider = match var("FITFOODIE_PROVIDER").or(file.provider) {
            Some(name) => name
                .parse::<Provider>()
                .with_context(|| format!("Invalid provider '{}'", name))?,
            None => Provider::Gemini,
        };

        let model = var("FITFOODIE_MODEL")
            .or(file.model)
            .unwrap_or_else(|| provider.default_model().to_string());

        let api_key = var("FITFOODIE_API_KEY")
            .or_else(|| {
                (provider == Provider::Gemini)
                    .then(|| var("GOOGLE_GENAI_API_KEY"))
                    .flatten()
            })
            .or(file.api_key)
            .unwrap_or_default();

        let base_url = file
            .base_url
            .map(|raw| Url::parse(&raw).with_context(|| format!("Invalid base_url '{}'", raw)))
            .transpose()?;

        let request_timeout_secs = file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }

        let data_dir = env_data_dir.or(file.data_dir).unwrap_or(base_dir);

        let config = Self {
            provider,
            model,
            api_key,
            base_url,
            data_dir,
            request_timeout_secs,
        };
        info!(
            "Config: provider '{}', model '{}', data dir {:?}",
            config.provider, config.model, config.data_dir
        );
        Ok(config)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE_NAME)
    }

    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            provider: self.provider,
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let Some(data_dir) = dirs::data_dir() else {
        bail!("Could not determine the platform data directory; set FITFOODIE_DATA_DIR");
    };
    Ok(data_dir.join("fitfoodie"))
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {:?}", path))?;
    let config: FileConfig =
        toml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))?;
    debug!("Loaded config file {:?}", path);
    Ok(config)
}
