//! # Backend Configuration
//!
//! Which backend variant to run and how to tune it.
//!
//! Defaults suit a local simulation. Environment variables override them one
//! by one; a malformed value is logged and ignored so a typo never stops the
//! process from starting with otherwise sane settings. `validate` catches
//! combinations that cannot work.

use crate::adapters::RetryPolicy;
use crate::domain::FeeSchedule;
use shared_types::{Address, Amount};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Backend variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process simulation.
    #[default]
    Simulation,
    /// Remote chain node over JSON-RPC.
    Remote,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulation" | "sim" | "mock" => Ok(Self::Simulation),
            "remote" => Ok(Self::Remote),
            other => Err(format!("unknown backend kind {:?}", other)),
        }
    }
}

/// Remote node settings.
#[derive(Debug, Clone, Default)]
pub struct RemoteConfig {
    /// JSON-RPC endpoint URL.
    pub endpoint: Option<String>,
    /// Bearer token sent with every request.
    pub auth_token: Option<String>,
    /// Per-call deadline and retry policy.
    pub retry: RetryPolicy,
}

/// Complete backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Variant to build.
    pub kind: BackendKind,
    /// Payload directory of the simulation; `None` keeps payloads in memory.
    pub data_dir: Option<PathBuf>,
    /// Storage fee schedule of the simulation.
    pub fees: FeeSchedule,
    /// Address credited with storage fees; `None` uses the simulation default.
    pub fee_collector: Option<Address>,
    /// Remote node settings.
    pub remote: RemoteConfig,
    /// Period of the sealing worker.
    pub sealing_interval: Duration,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Balances minted into a fresh simulation.
    pub genesis: Vec<(Address, Amount)>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Simulation,
            data_dir: Some(PathBuf::from("./data/content")),
            fees: FeeSchedule::default(),
            fee_collector: None,
            remote: RemoteConfig::default(),
            sealing_interval: Duration::from_secs(5),
            log_level: "info".to_string(),
            genesis: Vec::new(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Remote backend selected without an endpoint.
    #[error("FH_BACKEND=remote requires FH_REMOTE_ENDPOINT")]
    MissingEndpoint,

    /// Endpoint is not an HTTP(S) URL.
    #[error("Remote endpoint {0:?} must start with http:// or https://")]
    InvalidEndpoint(String),

    /// A remote call could never complete.
    #[error("Call timeout must be greater than zero")]
    ZeroTimeout,

    /// The sealing worker would spin.
    #[error("Sealing interval must be greater than zero")]
    ZeroSealingInterval,
}

impl BackendConfig {
    /// Defaults overlaid with `FH_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(kind) = parsed(&lookup, "FH_BACKEND") {
            config.kind = kind;
        }
        if let Some(dir) = lookup("FH_DATA_DIR") {
            config.data_dir = match dir.trim() {
                "" | ":memory:" => None,
                path => Some(PathBuf::from(path)),
            };
        }
        if let Some(endpoint) = lookup("FH_REMOTE_ENDPOINT") {
            config.remote.endpoint = Some(endpoint.trim().to_string());
        }
        if let Some(token) = lookup("FH_REMOTE_TOKEN") {
            config.remote.auth_token = Some(token);
        }
        if let Some(ms) = parsed::<u64>(&lookup, "FH_CALL_TIMEOUT_MS") {
            config.remote.retry.call_timeout = Duration::from_millis(ms);
        }
        if let Some(retries) = parsed(&lookup, "FH_MAX_RETRIES") {
            config.remote.retry.max_retries = retries;
        }
        if let Some(fee) = amount(&lookup, "FH_STORAGE_BASE_FEE") {
            config.fees.base_fee = fee;
        }
        if let Some(fee) = amount(&lookup, "FH_STORAGE_FEE_PER_KIB") {
            config.fees.per_kib_fee = fee;
        }
        if let Some(collector) = parsed(&lookup, "FH_FEE_COLLECTOR") {
            config.fee_collector = Some(collector);
        }
        if let Some(ms) = parsed::<u64>(&lookup, "FH_SEALING_INTERVAL_MS") {
            config.sealing_interval = Duration::from_millis(ms);
        }
        if let Some(level) = lookup("FH_LOG") {
            config.log_level = level;
        }
        if let Some(entries) = lookup("FH_GENESIS") {
            config.genesis = parse_genesis(&entries);
        }

        config
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kind == BackendKind::Remote {
            let endpoint = self
                .remote
                .endpoint
                .as_deref()
                .ok_or(ConfigError::MissingEndpoint)?;
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ConfigError::InvalidEndpoint(endpoint.to_string()));
            }
            if self.remote.retry.call_timeout.is_zero() {
                return Err(ConfigError::ZeroTimeout);
            }
        }
        if self.sealing_interval.is_zero() {
            return Err(ConfigError::ZeroSealingInterval);
        }
        Ok(())
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("[fh-backend] Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

/// Minor-unit amount from the environment.
fn amount(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Amount> {
    let raw = lookup(key)?;
    match Amount::from_minor_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("[fh-backend] Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

/// `addr=major[,addr=major...]`, skipping malformed entries.
fn parse_genesis(entries: &str) -> Vec<(Address, Amount)> {
    entries
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let parsed = entry.split_once('=').and_then(|(addr, major)| {
                let addr = Address::parse(addr).ok()?;
                let amount = Amount::from_major_str(major).ok()?;
                Some((addr, amount))
            });
            if parsed.is_none() {
                warn!("[fh-backend] Ignoring genesis entry {:?}", entry);
            }
            parsed
        })
        .collect()
}
