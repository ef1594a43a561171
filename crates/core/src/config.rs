// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracker configuration: backend endpoints and per-kind timing.
//!
//! ```toml
//! [backend]
//! base_url = "https://app.example.com/api"
//! request_timeout = "30s"
//!
//! [kinds.validation]
//! interval = "2s"
//! timeout = "4m"
//! missing_record_timeout = "5s"
//! ```

use crate::kind::JobKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid duration for {field}: {message}")]
    InvalidDuration { field: String, message: String },
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
    #[error(transparent)]
    UnknownKind(#[from] crate::kind::UnknownKind),
}

/// Parse a duration string like "500ms", "30s", "5m", "1h"
/// Longest duration accepted from configuration.
pub const MAX_DURATION: Duration = Duration::from_secs(365 * 24 * 3600);

pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let (num_str, suffix) = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| (&s[..i], &s[i..]))
        .unwrap_or((s, ""));

    let num: u64 = num_str.parse().map_err(|_| format!("invalid number in duration: {}", s))?;

    let multiplier = match suffix.trim() {
        "ms" | "millis" | "millisecond" | "milliseconds" => {
            return bounded(s, Duration::from_millis(num));
        }
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3600,
        other => return Err(format!("unknown duration suffix: {}", other)),
    };

    let secs = num.checked_mul(multiplier).ok_or_else(|| format!("duration out of range: {}", s))?;
    bounded(s, Duration::from_secs(secs))
}

fn bounded(s: &str, duration: Duration) -> Result<Duration, String> {
    if duration > MAX_DURATION {
        return Err(format!("duration out of range: {} (max 365 days)", s));
    }
    Ok(duration)
}

/// How a job's status reaches the tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchTransport {
    /// Periodic `GET` against the status endpoint
    #[default]
    Poll,
    /// Real-time subscription; falls back to polling if it closes
    Subscribe,
}

/// Timing and retry policy for one job kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindConfig {
    /// Delay before the first status fetch, so the backend can persist the job record
    pub grace: Duration,
    pub interval: Duration,
    /// Give up (`TimedOut`) if no terminal status arrives within this window
    pub timeout: Duration,
    /// Fail if the job record is never seen within this window
    pub missing_record_timeout: Option<Duration>,
    /// Consecutive transport errors tolerated before failing the watch
    pub max_transport_errors: u32,
    pub transport: WatchTransport,
}

impl KindConfig {
    crate::setters! {
        set {
            grace: Duration,
            interval: Duration,
            timeout: Duration,
            max_transport_errors: u32,
            transport: WatchTransport,
        }
        option {
            missing_record_timeout: Duration,
        }
    }

    /// Built-in policy for a job kind.
    pub fn defaults_for(kind: JobKind) -> Self {
        let (interval, timeout, transport) = match kind {
            JobKind::Validation => (2, 4 * 60, WatchTransport::Poll),
            JobKind::Creation => (2, 5 * 60, WatchTransport::Poll),
            JobKind::CommitRefresh => (3, 2 * 60, WatchTransport::Poll),
            JobKind::Reindex => (15, 15 * 60, WatchTransport::Poll),
            JobKind::MeetingProcessing => (5, 15 * 60, WatchTransport::Subscribe),
            JobKind::IndexingStatus => (5, 15 * 60, WatchTransport::Poll),
        };
        Self {
            grace: Duration::from_secs(1),
            interval: Duration::from_secs(interval),
            timeout: Duration::from_secs(timeout),
            missing_record_timeout: None,
            max_transport_errors: 5,
            transport,
        }
    }
}

/// Where the job endpoints live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL the `/jobs/...` paths are appended to
    pub base_url: String,
    /// Base URL for push subscriptions (`ws://` or `wss://`)
    pub subscribe_url: Option<String>,
    pub request_timeout: Duration,
    /// Default bearer token, used when a handle carries none
    pub auth_token: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            subscribe_url: None,
            request_timeout: Duration::from_secs(30),
            auth_token: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerConfig {
    pub backend: BackendConfig,
    kinds: HashMap<JobKind, KindConfig>,
}

impl TrackerConfig {
    /// Policy for `kind`, falling back to the built-in defaults.
    pub fn kind(&self, kind: JobKind) -> KindConfig {
        self.kinds.get(&kind).cloned().unwrap_or_else(|| KindConfig::defaults_for(kind))
    }

    pub fn with_kind(mut self, kind: JobKind, config: KindConfig) -> Self {
        self.kinds.insert(kind, config);
        self
    }

    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backend = backend;
        self
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawTrackerConfig = toml::from_str(content)?;
        let mut config = TrackerConfig { backend: raw.backend.resolve()?, kinds: HashMap::new() };
        for (name, raw_kind) in raw.kinds {
            let kind: JobKind = name.parse()?;
            config.kinds.insert(kind, raw_kind.resolve(kind)?);
        }
        Ok(config)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTrackerConfig {
    #[serde(default)]
    backend: RawBackendConfig,
    #[serde(default)]
    kinds: BTreeMap<String, RawKindConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBackendConfig {
    base_url: Option<String>,
    subscribe_url: Option<String>,
    request_timeout: Option<String>,
    auth_token: Option<String>,
}

impl RawBackendConfig {
    fn resolve(self) -> Result<BackendConfig, ConfigError> {
        let defaults = BackendConfig::default();
        Ok(BackendConfig {
            base_url: self.base_url.map(|u| u.trim_end_matches('/').to_string()).unwrap_or(defaults.base_url),
            subscribe_url: self.subscribe_url.map(|u| u.trim_end_matches('/').to_string()),
            request_timeout: duration_field("backend.request_timeout", self.request_timeout)?
                .unwrap_or(defaults.request_timeout),
            auth_token: self.auth_token,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawKindConfig {
    grace: Option<String>,
    interval: Option<String>,
    timeout: Option<String>,
    missing_record_timeout: Option<String>,
    max_transport_errors: Option<u32>,
    transport: Option<WatchTransport>,
}

impl RawKindConfig {
    fn resolve(self, kind: JobKind) -> Result<KindConfig, ConfigError> {
        let field = |name: &str| format!("kinds.{}.{}", kind, name);
        let mut config = KindConfig::defaults_for(kind);
        if let Some(grace) = duration_field(&field("grace"), self.grace)? {
            config.grace = grace;
        }
        if let Some(interval) = duration_field(&field("interval"), self.interval)? {
            config.interval = interval;
        }
        if let Some(timeout) = duration_field(&field("timeout"), self.timeout)? {
            config.timeout = timeout;
        }
        if let Some(window) = duration_field(&field("missing_record_timeout"), self.missing_record_timeout)? {
            config.missing_record_timeout = Some(window);
        }
        if let Some(max) = self.max_transport_errors {
            config.max_transport_errors = max;
        }
        if let Some(transport) = self.transport {
            config.transport = transport;
        }

        if config.interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: field("interval"),
                message: "must be greater than zero".to_string(),
            });
        }
        if config.timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: field("timeout"),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(config)
    }
}

fn duration_field(field: &str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    value
        .map(|v| {
            parse_duration(&v)
                .map_err(|message| ConfigError::InvalidDuration { field: field.to_string(), message })
        })
        .transpose()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
