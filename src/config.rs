use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::locality::LOCALITIES;
use crate::core::normalizer::NormalizerLimits;
use crate::models::ScoringWeights;
use crate::services::ingestion::{QueryPlan, PRIMARY_CALLS, SECONDARY_CALLS};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub ingestion: IngestionSettings,
    #[serde(default)]
    pub normalizer: NormalizerSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub ranking: RankingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_provider_url")]
    pub base_url: String,
    /// Missing key disables ingestion; it is not an error at startup
    pub api_key: Option<String>,
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            api_key: None,
            timeout_secs: default_provider_timeout(),
        }
    }
}

fn default_provider_url() -> String { "https://api.rentaldata.example/v1".to_string() }
fn default_provider_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct IngestionSettings {
    #[serde(default = "default_primary_locality")]
    pub primary_locality: String,
    #[serde(default = "default_primary_calls")]
    pub primary_calls: u32,
    #[serde(default = "default_secondary_localities")]
    pub secondary_localities: Vec<String>,
    #[serde(default = "default_secondary_calls")]
    pub secondary_calls: u32,
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            primary_locality: default_primary_locality(),
            primary_calls: default_primary_calls(),
            secondary_localities: default_secondary_localities(),
            secondary_calls: default_secondary_calls(),
            call_timeout_secs: default_call_timeout(),
        }
    }
}

impl IngestionSettings {
    pub fn plan(&self) -> QueryPlan {
        QueryPlan::new(
            self.primary_locality.clone(),
            self.primary_calls,
            self.secondary_localities.iter().cloned(),
            self.secondary_calls,
        )
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

fn default_primary_locality() -> String { LOCALITIES[0].name.to_string() }
fn default_primary_calls() -> u32 { PRIMARY_CALLS }
fn default_secondary_localities() -> Vec<String> {
    LOCALITIES[1..].iter().map(|l| l.name.to_string()).collect()
}
fn default_secondary_calls() -> u32 { SECONDARY_CALLS }
fn default_call_timeout() -> u64 { 15 }

#[derive(Debug, Clone, Deserialize)]
pub struct NormalizerSettings {
    #[serde(default = "default_max_monthly_rent")]
    pub max_monthly_rent: f64,
    #[serde(default = "default_fallback_sale_threshold")]
    pub fallback_sale_threshold: f64,
    #[serde(default = "default_clearly_sale_price")]
    pub clearly_sale_price: f64,
    #[serde(default = "default_description_max_chars")]
    pub description_max_chars: usize,
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            max_monthly_rent: default_max_monthly_rent(),
            fallback_sale_threshold: default_fallback_sale_threshold(),
            clearly_sale_price: default_clearly_sale_price(),
            description_max_chars: default_description_max_chars(),
        }
    }
}

impl From<&NormalizerSettings> for NormalizerLimits {
    fn from(settings: &NormalizerSettings) -> Self {
        Self {
            max_monthly_rent: settings.max_monthly_rent,
            fallback_sale_threshold: settings.fallback_sale_threshold,
            clearly_sale_price: settings.clearly_sale_price,
            description_max_chars: settings.description_max_chars,
        }
    }
}

fn default_max_monthly_rent() -> f64 { 15_000.0 }
fn default_fallback_sale_threshold() -> f64 { 20_000.0 }
fn default_clearly_sale_price() -> f64 { 100_000.0 }
fn default_description_max_chars() -> usize { 500 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_housing_weight")]
    pub housing: f64,
    #[serde(default = "default_demographics_weight")]
    pub demographics: f64,
    #[serde(default = "default_lifestyle_weight")]
    pub lifestyle: f64,
    #[serde(default = "default_listing_distance_weight")]
    pub listing_distance: f64,
    #[serde(default = "default_listing_price_weight")]
    pub listing_price: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            housing: default_housing_weight(),
            demographics: default_demographics_weight(),
            lifestyle: default_lifestyle_weight(),
            listing_distance: default_listing_distance_weight(),
            listing_price: default_listing_price_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            housing: config.housing,
            demographics: config.demographics,
            lifestyle: config.lifestyle,
            listing_distance: config.listing_distance,
            listing_price: config.listing_price,
        }
    }
}

fn default_housing_weight() -> f64 { 0.50 }
fn default_demographics_weight() -> f64 { 0.20 }
fn default_lifestyle_weight() -> f64 { 0.30 }
fn default_listing_distance_weight() -> f64 { 0.60 }
fn default_listing_price_weight() -> f64 { 0.40 }

/// Default thresholds when a request does not carry its own
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RankingSettings {
    #[serde(default = "default_roommate_threshold")]
    pub roommate_threshold: f64,
    #[serde(default = "default_listing_threshold")]
    pub listing_threshold: f64,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            roommate_threshold: default_roommate_threshold(),
            listing_threshold: default_listing_threshold(),
        }
    }
}

fn default_roommate_threshold() -> f64 { 0.5 }
fn default_listing_threshold() -> f64 { 0.3 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with NEST__)
    /// 5. RENTAL_API_KEY for the provider credential
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., NEST__PROVIDER__API_KEY -> provider.api_key
            .add_source(
                Environment::with_prefix("NEST")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("NEST")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply well-known environment variables that do not follow the NEST__ scheme
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    let api_key = std::env::var("RENTAL_API_KEY").ok().filter(|k| !k.is_empty());

    let mut builder = Config::builder().add_source(settings);
    if let Some(key) = api_key {
        builder = builder.set_override("provider.api_key", key)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.housing, 0.50);
        assert_eq!(weights.demographics, 0.20);
        assert_eq!(weights.lifestyle, 0.30);
        assert_eq!(weights.listing_distance, 0.60);
        assert_eq!(weights.listing_price, 0.40);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_default_plan_matches_constants() {
        let plan = IngestionSettings::default().plan();
        assert_eq!(plan, QueryPlan::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(
                "[server]\nport = 9000\n\n[ranking]\nlisting_threshold = 0.4\n",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.ranking.listing_threshold, 0.4);
        assert_eq!(settings.ranking.roommate_threshold, 0.5);
        assert!(settings.provider.api_key.is_none());
        assert_eq!(settings.ingestion.primary_calls, 6);
    }

    #[test]
    fn test_shipped_config_parses() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(include_str!("../config/default.toml"), FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.ingestion.secondary_localities.len(), 4);
        assert_eq!(NormalizerLimits::from(&settings.normalizer).max_monthly_rent, 15_000.0);
    }

    #[test]
    fn test_load_from_path() {
        let settings = Settings::load_from("config/default.toml").unwrap();

        assert_eq!(settings.ingestion.plan().total_calls(), 14);
        assert_eq!(settings.ingestion.call_timeout(), Duration::from_secs(15));
        assert_eq!(settings.ranking.roommate_threshold, 0.5);
    }
}
