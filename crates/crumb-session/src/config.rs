//! # Session Configuration
//!
//! Configuration for the cart session: where the API lives, how money is
//! shown, how deliveries are charged and how opening hours are compared.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CRUMB_API_URL=https://api.example.com/graphql                      │
//! │     CRUMB_DELIVERY_RATE=1.50                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/crumb/cart.toml (Linux)                                  │
//! │     ~/Library/Application Support/app.crumb.crumb/cart.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     localhost API, USD, 1.00 per km, combined comparison               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [api]
//! url = "https://api.example.com/graphql"
//! timeout_secs = 10
//!
//! [pricing]
//! currency_code = "USD"
//! currency_symbol = "$"
//! delivery_rate_cents = 150  # per started kilometre
//!
//! [availability]
//! window_comparison = "combined"  # combined | per_field
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crumb_core::validation::validate_delivery_rate;
use crumb_core::{Money, WindowComparison};

use crate::error::{SessionError, SessionResult};

// =============================================================================
// API Settings
// =============================================================================

/// Where the GraphQL API lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// GraphQL endpoint.
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8000/graphql".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            url: default_api_url(),
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// Pricing Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSettings {
    /// ISO 4217 code, informational.
    #[serde(default = "default_currency_code")]
    pub currency_code: String,

    /// Symbol prefixed to every displayed amount.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Delivery charge per started kilometre, in cents.
    #[serde(default = "default_delivery_rate")]
    pub delivery_rate_cents: i64,
}

fn default_currency_code() -> String {
    "USD".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_delivery_rate() -> i64 {
    100
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            currency_code: default_currency_code(),
            currency_symbol: default_currency_symbol(),
            delivery_rate_cents: default_delivery_rate(),
        }
    }
}

// =============================================================================
// Availability Settings
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilitySettings {
    /// How the current time is matched against opening windows.
    #[serde(default)]
    pub window_comparison: WindowComparison,
}

// =============================================================================
// Main Session Configuration
// =============================================================================

/// Complete session configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub availability: AvailabilitySettings,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SessionResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading session config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load session config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SessionResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SessionError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SessionError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SessionError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Session config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SessionResult<()> {
        let url = self.api.url.trim();
        if url.is_empty() {
            return Err(SessionError::InvalidConfig("api.url must not be empty".into()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(SessionError::InvalidConfig(format!(
                "API URL must start with http:// or https://, got: {}",
                url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(SessionError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        validate_delivery_rate(self.delivery_rate())
            .map_err(|e| SessionError::InvalidConfig(e.to_string()))?;

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (the environment in production).
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CRUMB_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.url = url;
        }

        // Major units, e.g. "1.50"
        if let Some(rate) = lookup("CRUMB_DELIVERY_RATE") {
            match rate.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => {
                    let rate = Money::from_decimal(value);
                    debug!(rate = %rate, "Overriding delivery rate from environment");
                    self.pricing.delivery_rate_cents = rate.cents();
                }
                _ => warn!(rate = %rate, "Unparseable delivery rate in environment"),
            }
        }

        if let Some(symbol) = lookup("CRUMB_CURRENCY_SYMBOL") {
            self.pricing.currency_symbol = symbol;
        }

        if let Some(mode) = lookup("CRUMB_WINDOW_COMPARISON") {
            match mode.parse() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding window comparison from environment");
                    self.availability.window_comparison = parsed;
                }
                Err(e) => warn!(mode = %mode, "Ignoring window comparison override: {}", e),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("app", "crumb", "crumb")
            .map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn api_url(&self) -> &str {
        &self.api.url
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Delivery charge per started kilometre.
    pub fn delivery_rate(&self) -> Money {
        Money::from_cents(self.pricing.delivery_rate_cents)
    }

    pub fn window_comparison(&self) -> WindowComparison {
        self.availability.window_comparison
    }

    /// Renders an amount with the configured currency symbol.
    pub fn format_currency(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.pricing.currency_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.delivery_rate(), Money::from_cents(100));
        assert_eq!(config.window_comparison(), WindowComparison::Combined);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_config_validation() {
        let mut config = SessionConfig::default();

        config.api.url = "   ".to_string();
        assert!(config.validate().is_err());

        config.api.url = "ftp://api.example.com".to_string();
        assert!(config.validate().is_err());

        config.api.url = "https://api.example.com/graphql".to_string();
        assert!(config.validate().is_ok());

        config.pricing.delivery_rate_cents = -50;
        let err = config.validate().unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: SessionConfig = toml::from_str(
            r#"
            [pricing]
            currency_symbol = "€"
            delivery_rate_cents = 250

            [availability]
            window_comparison = "per_field"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.url, default_api_url());
        assert_eq!(config.pricing.currency_code, "USD");
        assert_eq!(config.delivery_rate(), Money::from_cents(250));
        assert_eq!(config.window_comparison(), WindowComparison::PerField);
        assert_eq!(config.format_currency(Money::from_cents(1290)), "€12.90");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CRUMB_API_URL", "https://staging.example.com/graphql"),
            ("CRUMB_DELIVERY_RATE", "1.75"),
            ("CRUMB_CURRENCY_SYMBOL", "Rs "),
            ("CRUMB_WINDOW_COMPARISON", "legacy"),
        ]
        .into_iter()
        .collect();

        let mut config = SessionConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_url(), "https://staging.example.com/graphql");
        assert_eq!(config.delivery_rate(), Money::from_cents(175));
        assert_eq!(config.window_comparison(), WindowComparison::PerField);
        assert_eq!(config.format_currency(Money::from_cents(500)), "Rs 5.00");
    }

    #[test]
    fn test_bad_overrides_are_ignored() {
        let mut config = SessionConfig::default();
        config.apply_overrides(|key| match key {
            "CRUMB_DELIVERY_RATE" => Some("cheap".to_string()),
            "CRUMB_WINDOW_COMPARISON" => Some("sometimes".to_string()),
            _ => None,
        });

        assert_eq!(config.delivery_rate(), Money::from_cents(100));
        assert_eq!(config.window_comparison(), WindowComparison::Combined);
    }

    #[test]
    fn test_save_and_load_roundtrip_through_file() {
        let path = std::env::temp_dir().join(format!("crumb-config-{}.toml", std::process::id()));
        let mut config = SessionConfig::default();
        config.pricing.delivery_rate_cents = 325;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let loaded: SessionConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.delivery_rate(), Money::from_cents(325));
        assert_eq!(loaded.api_url(), config.api_url());
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&SessionConfig::default()).unwrap();
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[pricing]"));
        assert!(toml_str.contains("[availability]"));
    }
}
