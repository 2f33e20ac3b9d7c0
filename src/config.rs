// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the content guard.
//!
//! Defaults match the policy the entries backend enforces: content between
//! 10 and 50 characters, a 30 second fallback cooldown and a one second
//! countdown tick.

use crate::error::{GuardError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Entries backend configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Content length policy
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Countdown configuration
    #[serde(default)]
    pub cooldown: CooldownConfig,

    /// Attack reporting and alert classification
    #[serde(default)]
    pub reporting: ReportingConfig,
}

/// Entries backend endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL the `/entries` routes hang off (default: http://localhost:5000/api/v1)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds. `None` keeps the transport default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Length policy for submitted content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Minimum length after trimming (default: 10)
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,

    /// Maximum length (default: 50)
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

/// Countdown configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownConfig {
    /// Seconds applied when a directive omits `remainingSeconds` (default: 30)
    #[serde(default = "default_cooldown_secs")]
    pub default_seconds: u64,

    /// Countdown tick period in milliseconds (default: 1000)
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

/// Attack reporting and alert classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// Label sent to the attack-report endpoint (default: XSS)
    #[serde(default = "default_attack_type")]
    pub attack_type: String,

    /// Server error fragments that turn a rejection into a warning
    #[serde(default = "default_warning_terms")]
    pub warning_terms: Vec<String>,
}

fn default_base_url() -> String {
    "http://localhost:5000/api/v1".to_string()
}

fn default_min_chars() -> usize {
    crate::validator::MIN_CONTENT_CHARS
}

fn default_max_chars() -> usize {
    crate::validator::MAX_CONTENT_CHARS
}

fn default_cooldown_secs() -> u64 {
    crate::cooldown::DEFAULT_COOLDOWN_SECS
}

fn default_tick_millis() -> u64 {
    1000
}

fn default_attack_type() -> String {
    "XSS".to_string()
}

fn default_warning_terms() -> Vec<String> {
    ["bloquead", "ataque", "blocked", "attack"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_chars: default_min_chars(),
            max_chars: default_max_chars(),
        }
    }
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            default_seconds: default_cooldown_secs(),
            tick_millis: default_tick_millis(),
        }
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            attack_type: default_attack_type(),
            warning_terms: default_warning_terms(),
        }
    }
}

impl Config {
    /// Load defaults overlaid with `GUARD_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(url) = std::env::var("GUARD_API_URL") {
            config.api.base_url = url;
        }
        config.api.timeout_secs = env_parse("GUARD_TIMEOUT_SECS").or(config.api.timeout_secs);
        if let Some(min) = env_parse("GUARD_MIN_CHARS") {
            config.validation.min_chars = min;
        }
        if let Some(max) = env_parse("GUARD_MAX_CHARS") {
            config.validation.max_chars = max;
        }
        if let Some(secs) = env_parse("GUARD_COOLDOWN_DEFAULT_SECS") {
            config.cooldown.default_seconds = secs;
        }

        config
    }

    /// Check the configuration for values that cannot work.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(GuardError::InvalidConfig(format!(
                "api.base_url must be an http(s) URL with a host, got {}",
                self.api.base_url
            )));
        }
        if self.validation.min_chars > self.validation.max_chars {
            return Err(GuardError::InvalidConfig(format!(
                "validation.min_chars ({}) exceeds validation.max_chars ({})",
                self.validation.min_chars, self.validation.max_chars
            )));
        }
        if self.cooldown.tick_millis == 0 {
            return Err(GuardError::InvalidConfig(
                "cooldown.tick_millis must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl ApiConfig {
    /// Get the request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl CooldownConfig {
    /// Get the countdown tick period
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
