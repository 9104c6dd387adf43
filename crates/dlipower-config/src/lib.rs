//! Persisted configuration for the dlipower client.
//!
//! A flat JSON file (`~/.dlipower.conf`, or `$DLIPOWER_CONFIG`) holding the
//! switch address, account, and timing, layered under `DLIPOWER_*`
//! environment variables and command-line overrides, and translated into
//! `dlipower_core::SwitchConfig`.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dlipower_core::config::{
    DEFAULT_CYCLETIME, DEFAULT_HOSTNAME, DEFAULT_PASSWORD, DEFAULT_RETRIES, DEFAULT_TIMEOUT,
    DEFAULT_USERID,
};
use dlipower_core::{Credentials, SwitchConfig};

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV: &str = "DLIPOWER_CONFIG";

/// Older name for [`CONFIG_ENV`], still honored when it is unset.
pub const LEGACY_CONFIG_ENV: &str = "ZTDLIPOWER_CONFIG";

/// Prefix for per-setting environment overrides (`DLIPOWER_HOSTNAME`, ...).
pub const ENV_PREFIX: &str = "DLIPOWER_";

const CONFIG_FILE_NAME: &str = ".dlipower.conf";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── File format ─────────────────────────────────────────────────────

/// Contents of the config file. Times are in seconds.
///
/// Fields are declared in key order so the written file is sorted.
#[derive(Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FileConfig {
    pub cycletime: f64,
    pub hostname: String,
    pub password: String,
    pub retries: u32,
    pub timeout: f64,
    pub userid: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            cycletime: DEFAULT_CYCLETIME.as_secs_f64(),
            hostname: DEFAULT_HOSTNAME.into(),
            password: DEFAULT_PASSWORD.into(),
            retries: DEFAULT_RETRIES,
            timeout: DEFAULT_TIMEOUT.as_secs_f64(),
            userid: DEFAULT_USERID.into(),
        }
    }
}

impl fmt::Debug for FileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileConfig")
            .field("cycletime", &self.cycletime)
            .field("hostname", &self.hostname)
            .field("password", &"[REDACTED]")
            .field("retries", &self.retries)
            .field("timeout", &self.timeout)
            .field("userid", &self.userid)
            .finish()
    }
}

impl FileConfig {
    /// These settings with `overrides` applied, as they would be saved.
    pub fn merged(&self, overrides: &Overrides) -> FileConfig {
        FileConfig {
            cycletime: overrides.cycletime.unwrap_or(self.cycletime),
            hostname: overrides
                .hostname
                .clone()
                .unwrap_or_else(|| self.hostname.clone()),
            password: overrides.password.as_ref().map_or_else(
                || self.password.clone(),
                |p| p.expose_secret().to_owned(),
            ),
            retries: overrides.retries.unwrap_or(self.retries),
            timeout: overrides.timeout.unwrap_or(self.timeout),
            userid: overrides
                .userid
                .clone()
                .unwrap_or_else(|| self.userid.clone()),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// `$DLIPOWER_CONFIG` if set, then `$ZTDLIPOWER_CONFIG`, otherwise
/// `~/.dlipower.conf`.
pub fn config_path() -> PathBuf {
    config_path_with(std::env::var_os)
}

fn config_path_with(lookup: impl Fn(&'static str) -> Option<OsString>) -> PathBuf {
    [CONFIG_ENV, LEGACY_CONFIG_ENV]
        .into_iter()
        .find_map(|name| lookup(name).filter(|p| !p.is_empty()))
        .map_or_else(
            || {
                BaseDirs::new().map_or_else(
                    || PathBuf::from(CONFIG_FILE_NAME),
                    |dirs| dirs.home_dir().join(CONFIG_FILE_NAME),
                )
            },
            PathBuf::from,
        )
}

// ── Config loading ──────────────────────────────────────────────────

fn file_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(FileConfig::default()))
        .merge(Json::file(path))
}

/// Load settings from `path`, then `DLIPOWER_*` environment variables.
///
/// A missing file yields the defaults; a malformed one is an error.
pub fn load_config_from(path: &Path) -> Result<FileConfig, ConfigError> {
    let config: FileConfig = file_figment(path)
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
        .extract()?;
    Ok(config)
}

/// Load from the canonical path.
pub fn load_config() -> Result<FileConfig, ConfigError> {
    load_config_from(&config_path())
}

/// Load only what is stored in `path`, without environment overrides.
///
/// This is the base for `--save-settings`, so that `DLIPOWER_*` values
/// never end up persisted.
pub fn load_saved_config_from(path: &Path) -> Result<FileConfig, ConfigError> {
    let config: FileConfig = file_figment(path).extract()?;
    Ok(config)
}

pub fn load_saved_config() -> Result<FileConfig, ConfigError> {
    load_saved_config_from(&config_path())
}

// ── Config saving ───────────────────────────────────────────────────

/// Write `cfg` to `path` as pretty-printed JSON with sorted keys.
///
/// Keys already in the file that `FileConfig` does not know are kept. The
/// file is left readable by its owner only.
pub fn save_config_to(cfg: &FileConfig, path: &Path) -> Result<(), ConfigError> {
    let mut document: BTreeMap<String, serde_json::Value> = std::fs::read_to_string(path)
        .ok()
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or_default();

    if let serde_json::Value::Object(fields) = serde_json::to_value(cfg)? {
        document.extend(fields);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(&document)?;
    let mut file = open_private(path)?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Write `cfg` to the canonical path.
pub fn save_config(cfg: &FileConfig) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Open `path` for writing as an empty file readable by its owner only.
///
/// An existing file is tightened to 0600 before it is truncated, so nothing
/// is ever written to it under a looser mode.
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(false);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let file = options.open(path)?;
    restrict_permissions(&file)?;
    file.set_len(0)?;
    Ok(file)
}

#[cfg(unix)]
fn restrict_permissions(file: &std::fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &std::fs::File) -> std::io::Result<()> {
    Ok(())
}

// ── Resolution ──────────────────────────────────────────────────────

/// Settings given explicitly (command line), taking precedence over the
/// file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub hostname: Option<String>,
    pub userid: Option<String>,
    pub password: Option<SecretString>,
    pub timeout: Option<f64>,
    pub cycletime: Option<f64>,
    pub retries: Option<u32>,
    pub use_https: bool,
}

/// Combine file settings and overrides into a `SwitchConfig`.
pub fn resolve(file: &FileConfig, overrides: &Overrides) -> Result<SwitchConfig, ConfigError> {
    let merged = file.merged(overrides);

    if merged.hostname.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "hostname".into(),
            reason: "must not be empty".into(),
        });
    }
    if merged.retries == 0 {
        return Err(ConfigError::Validation {
            field: "retries".into(),
            reason: "must be at least 1".into(),
        });
    }

    let timeout = seconds("timeout", merged.timeout)?;
    if timeout.is_zero() {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be greater than 0".into(),
        });
    }

    Ok(SwitchConfig {
        hostname: merged.hostname.trim().to_owned(),
        credentials: Credentials::new(merged.userid, merged.password),
        timeout,
        cycletime: seconds("cycletime", merged.cycletime)?,
        retries: merged.retries,
        use_https: overrides.use_https,
    })
}

fn seconds(field: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("{value} is not a valid number of seconds ({e})"),
    })
}
