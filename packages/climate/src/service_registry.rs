//! Compile-time registry of climate provider configurations.
//!
//! Each provider is defined in a TOML file under `services/`. The registry
//! embeds these at compile time and exposes them via [`all_services`] and
//! [`service`].

use std::time::Duration;

use serde::Deserialize;

/// A climate provider configuration loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderService {
    /// Unique identifier (e.g., `"nasa_power"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Endpoint queried for daily point data.
    pub base_url: String,
    /// Community code sent with every request (selects the unit set).
    pub community: String,
    /// Minimum delay between successive requests in milliseconds.
    pub rate_limit_ms: u64,
    /// Retry attempts for transient HTTP failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_timeout_secs() -> u64 {
    30
}

impl ProviderService {
    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns a copy pointed at a different endpoint (mirrors, proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Identifier of the default provider.
pub const NASA_POWER: &str = "nasa_power";

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[(NASA_POWER, include_str!("../services/nasa_power.toml"))];

/// Returns all climate provider configurations.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<ProviderService> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse climate service '{name}': {e}"))
        })
        .collect()
}

/// Returns the configuration with the given `id`, if registered.
#[must_use]
pub fn service(id: &str) -> Option<ProviderService> {
    all_services().into_iter().find(|s| s.id == id)
}
