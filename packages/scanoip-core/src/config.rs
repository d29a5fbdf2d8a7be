//! Probe settings
//!
//! Loaded with priority:
//! 1. Environment variables (`SCANOIP_PING_ATTEMPTS`, `SCANOIP_PING_WAIT_SECS`, `SCANOIP_VENDOR_LOOKUP`)
//! 2. Config file (~/.config/scanoip/config.toml)
//! 3. Default values

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Echo requests sent to each host
pub const DEFAULT_PING_ATTEMPTS: u32 = 2;

const ENV_PING_ATTEMPTS: &str = "SCANOIP_PING_ATTEMPTS";
const ENV_PING_WAIT_SECS: &str = "SCANOIP_PING_WAIT_SECS";
const ENV_VENDOR_LOOKUP: &str = "SCANOIP_VENDOR_LOOKUP";

/// Configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    probe: Option<ProbeSection>,
}

#[derive(Debug, Deserialize, Default)]
struct ProbeSection {
    attempts: Option<u32>,
    wait_secs: Option<u64>,
    vendor_lookup: Option<bool>,
}

/// Runtime probe configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub ping_attempts: u32,
    /// Per-reply wait handed to ping; `None` keeps the system default
    pub ping_wait_secs: Option<u64>,
    pub vendor_lookup: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ping_attempts: DEFAULT_PING_ATTEMPTS,
            ping_wait_secs: None,
            vendor_lookup: true,
        }
    }
}

/// Get the path to the configuration file
fn get_config_file_path() -> Option<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .map(|p| p.join("scanoip").join("config.toml"))
}

/// Parse config file content.
pub fn parse_config_file(content: &str) -> Result<ConfigFile, toml::de::Error> {
    toml::from_str(content)
}

/// Load configuration from the config file
fn load_config_file() -> Option<ConfigFile> {
    let path = get_config_file_path()?;

    if !path.exists() {
        return None;
    }

    match fs::read_to_string(&path) {
        Ok(content) => match parse_config_file(&content) {
            Ok(config) => {
                tracing::debug!("Loaded config from {:?}", path);
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to parse config file {:?}: {}", path, e);
                None
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read config file {:?}: {}", path, e);
            None
        }
    }
}

/// Parse an environment value, ignoring blanks and logging garbage.
fn parse_env<T: std::str::FromStr>(name: &str, value: Option<String>) -> Option<T> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("Ignoring invalid value {:?} for {}", value, name);
            None
        }
    }
}

/// Merge environment values, the config file and defaults into a [`ScanConfig`].
///
/// `env` looks up a variable by name.
pub fn resolve_scan_config<F>(env: F, file: Option<ConfigFile>) -> ScanConfig
where
    F: Fn(&str) -> Option<String>,
{
    let file = file.and_then(|f| f.probe).unwrap_or_default();
    let defaults = ScanConfig::default();

    let ping_attempts = parse_env(ENV_PING_ATTEMPTS, env(ENV_PING_ATTEMPTS))
        .filter(|attempts: &u32| *attempts > 0)
        .or(file.attempts.filter(|attempts| *attempts > 0))
        .unwrap_or(defaults.ping_attempts);

    let ping_wait_secs = parse_env(ENV_PING_WAIT_SECS, env(ENV_PING_WAIT_SECS))
        .or(file.wait_secs)
        .or(defaults.ping_wait_secs);

    let vendor_lookup = parse_env(ENV_VENDOR_LOOKUP, env(ENV_VENDOR_LOOKUP))
        .or(file.vendor_lookup)
        .unwrap_or(defaults.vendor_lookup);

    ScanConfig {
        ping_attempts,
        ping_wait_secs,
        vendor_lookup,
    }
}

/// Load the probe configuration from the process environment and config file.
pub fn load_scan_config() -> ScanConfig {
    let config = resolve_scan_config(|name| std::env::var(name).ok(), load_config_file());
    tracing::debug!("Using scan config: {:?}", config);
    config
}

/// Get the path to the config file for documentation purposes
pub fn get_config_file_path_string() -> String {
    get_config_file_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "~/.config/scanoip/config.toml".to_string())
}
