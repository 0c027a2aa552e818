//! Provider configuration loading
//!
//! Loads [`ProviderConfig`] (or any deserialisable type) from YAML, TOML or
//! JSON files through the `config` crate.
//!
//! ## Features
//!
//! - Auto-detection of format from file extension
//! - Environment variable substitution (`${VAR}` and `$VAR` syntax)
//! - `MESHFORM_`-prefixed environment overrides (`__` separates nesting)

use crate::conns::ProviderConfig;
use crate::error::{KernelError, KernelResult};
use config::{Config as Cfg, Environment, File, FileFormat};
use error_stack::{Report, ResultExt};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::LazyLock;


/// Prefix of environment overrides read by [`load_provider_config`].
pub const ENV_PREFIX: &str = "MESHFORM";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parsing error: {0}")]
    Parse(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The file parsed but a field value is unusable.
    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)\b")
        .expect("env var pattern is valid")
});

/// Detect configuration format from file extension
///
/// - YAML: `.yaml`, `.yml`
/// - TOML: `.toml`
/// - JSON: `.json`
pub fn detect_format(path: &str) -> ConfigResult<FileFormat> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ConfigError::UnsupportedFormat("No file extension found".to_string()))?;

    match ext.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "toml" => Ok(FileFormat::Toml),
        "json" => Ok(FileFormat::Json),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}

/// Substitute `${VAR}` and `$VAR` references with environment values.
///
/// Unset variables are left as written.
pub fn substitute_env_vars(content: &str) -> String {
    ENV_VAR
        .replace_all(content, |caps: &regex::Captures| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Load configuration from a string with explicit format
pub fn from_str<T>(content: &str, format: FileFormat) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let substituted = substitute_env_vars(content);

    Cfg::builder()
        .add_source(File::from_str(&substituted, format))
        .build()
        .map_err(|e| ConfigError::Parse(e.to_string()))?
        .try_deserialize()
        .map_err(|e| ConfigError::Serialization(e.to_string()))
}

/// Load configuration with environment variable overrides
///
/// For a field `endpoint_url` with prefix `APP` the variable is
/// `APP_ENDPOINT_URL`; `__` separates nested keys.
pub fn load_with_env<T>(path: &str, env_prefix: &str) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    let substituted = substitute_env_vars(&content);

    Cfg::builder()
        .add_source(File::from_str(&substituted, format))
        .add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .map_err(|e| ConfigError::Parse(e.to_string()))?
        .try_deserialize()
        .map_err(|e| ConfigError::Serialization(e.to_string()))
}

/// Load and validate the provider configuration at `path`.
pub fn load_provider_config(path: &str) -> KernelResult<ProviderConfig> {
    let config: ProviderConfig = load_with_env(path, ENV_PREFIX)
        .map_err(KernelError::from)
        .map_err(Report::new)
        .attach_with(|| format!("loading provider config from {path}"))?;

    validate_provider_config(&config)
        .map_err(KernelError::from)
        .map_err(Report::new)
        .attach_with(|| format!("validating provider config from {path}"))?;

    tracing::debug!(
        region = %config.region,
        account_id = %config.account_id,
        "loaded provider config"
    );
    Ok(config)
}

/// Required fields must be non-empty; the account id must be 12 digits.
pub fn validate_provider_config(config: &ProviderConfig) -> ConfigResult<()> {
    if config.region.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field: "region",
            reason: "must not be empty".to_string(),
        });
    }
    if config.account_id.len() != 12 || !config.account_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::Invalid {
            field: "account_id",
            reason: format!("expected 12 digits, got '{}'", config.account_id),
        });
    }
    Ok(())
}
