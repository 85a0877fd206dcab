//! Relay settings
//!
//! Stores non-sensitive configuration in a plain JSON file. Every field has a
//! default, so a missing file or a partial file is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{RelayError, Result};
use crate::upstream::UpstreamTarget;

/// Upstream API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpstreamSettings {
    /// Base URL used for every request (e.g., "https://api.example.com")
    pub base_url: Option<String>,
    /// Take the upstream host from the request path instead of `base_url`
    pub host_from_path: bool,
    /// Hosts reachable when `host_from_path` is set
    pub allowed_hosts: Vec<String>,
    /// Scheme used with a path-supplied host
    pub host_scheme: String,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            host_from_path: false,
            allowed_hosts: Vec::new(),
            host_scheme: "https".to_string(),
        }
    }
}

/// Outbound HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpSettings {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Redirects followed before giving up (0 = none)
    pub max_redirects: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 5,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Relay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory holding one token entry per identifier
    pub tokens_dir: PathBuf,
    /// Upstream API configuration
    pub upstream: UpstreamSettings,
    /// Outbound HTTP client configuration
    pub http: HttpSettings,
    /// In-flight request cap
    pub max_concurrent_requests: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            tokens_dir: PathBuf::from("tokens"),
            upstream: UpstreamSettings::default(),
            http: HttpSettings::default(),
            max_concurrent_requests: 256,
        }
    }
}

impl Settings {
    /// Socket address string to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate the upstream configuration and pick the deployment variant
    pub fn upstream_target(&self) -> Result<UpstreamTarget> {
        if self.upstream.host_from_path {
            return UpstreamTarget::path_supplied(
                &self.upstream.host_scheme,
                self.upstream.allowed_hosts.clone(),
            );
        }

        let base_url = self.upstream.base_url.as_deref().ok_or_else(|| {
            RelayError::Config(
                "no upstream base URL configured (set upstream.baseUrl or --upstream)".to_string(),
            )
        })?;

        UpstreamTarget::fixed(base_url).map_err(|e| RelayError::Config(e.to_string()))
    }

    /// Check values that would otherwise fail at runtime
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_requests == 0 {
            return Err(RelayError::Config(
                "maxConcurrentRequests must be at least 1".to_string(),
            ));
        }

        if self.http.timeout_secs == 0 {
            return Err(RelayError::Config(
                "http.timeoutSecs must be at least 1".to_string(),
            ));
        }

        if self.http.connect_timeout_secs == 0 {
            return Err(RelayError::Config(
                "http.connectTimeoutSecs must be at least 1".to_string(),
            ));
        }

        self.upstream_target().map(|_| ())
    }
}

/// Settings manager
pub struct SettingsManager {
    settings: Settings,
}

impl SettingsManager {
    /// Load settings from an optional JSON file
    pub fn load(settings_file: Option<&Path>) -> Result<Self> {
        let settings = match settings_file {
            Some(path) => Self::load_from_file(path)?,
            None => Settings::default(),
        };

        Ok(Self { settings })
    }

    /// Load settings from file
    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file found at {:?}, using defaults", path);
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Get current settings
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Consume the manager and return the settings
    pub fn into_settings(self) -> Settings {
        self.settings
    }
}
