use crate::cli::ConnectionArgs;
use anyhow::{Context, Result};
use opsman::{ClientConfig, Credentials, normalize_target};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("omen"))
}

/// Get the default config file path
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Connection settings read from `config.toml`
///
/// Every key is optional; flags and environment variables take precedence.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub target: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub skip_ssl_validation: Option<bool>,
    pub request_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load config from a file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config format in {}", path.display()))
    }

    /// Load the explicit config file, or the default one if it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let path = config_path()?;
        if path.exists() {
            log::debug!("Loading config from {}", path.display());
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }
}

fn pick<'a>(flag: Option<&'a String>, file: Option<&'a String>) -> Option<&'a str> {
    flag.filter(|v| !v.is_empty()).or(file).map(String::as_str)
}

/// Build the client configuration from flags/env layered over the file
pub fn resolve(args: &ConnectionArgs, file: &FileConfig) -> Result<ClientConfig> {
    let target = normalize_target(pick(args.target.as_ref(), file.target.as_ref()))?;
    let credentials = Credentials::from_parts(
        pick(args.username.as_ref(), file.username.as_ref()),
        pick(args.password.as_ref(), file.password.as_ref()),
        pick(args.client_id.as_ref(), file.client_id.as_ref()),
        pick(args.client_secret.as_ref(), file.client_secret.as_ref()),
    )?;

    let mut config = ClientConfig::new(target, credentials);
    config.skip_ssl_validation =
        args.skip_ssl_validation || file.skip_ssl_validation.unwrap_or(false);
    if let Some(secs) = file.request_timeout_secs {
        config.default_timeout = Duration::from_secs(secs);
    }
    Ok(config)
}
