//! Configuration schema definitions

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use smokespot_geo::Coordinate;
use std::time::Duration;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub geocoder: GeocoderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Reject values the resolver or geocoder cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.location.fallback_coordinate().is_valid() {
            return Err(Error::config_invalid(format!(
                "location.fallback coordinate ({}) is out of range",
                self.location.fallback_coordinate()
            )));
        }
        if self.location.fallback_address.trim().is_empty() {
            return Err(Error::config_invalid("location.fallback_address cannot be empty"));
        }
        if self.location.acquire_timeout_secs == 0 {
            return Err(Error::config_invalid("location.acquire_timeout_secs cannot be zero"));
        }
        if self.geocoder.timeout_secs == 0 {
            return Err(Error::config_invalid("geocoder.timeout_secs cannot be zero"));
        }
        if !self.geocoder.base_url.starts_with("http://") && !self.geocoder.base_url.starts_with("https://") {
            return Err(Error::config_invalid("geocoder.base_url must start with http:// or https://"));
        }
        Ok(())
    }
}

/// Location resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Latitude used whenever the device position is unavailable
    #[serde(default = "default_fallback_latitude")]
    pub fallback_latitude: f64,

    /// Longitude used whenever the device position is unavailable
    #[serde(default = "default_fallback_longitude")]
    pub fallback_longitude: f64,

    /// Address text that goes with the fallback coordinate
    #[serde(default = "default_fallback_address")]
    pub fallback_address: String,

    /// Upper bound on a single position fix
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    /// Ask the device for a high-accuracy fix
    #[serde(default = "default_true")]
    pub high_accuracy: bool,
}

impl LocationConfig {
    pub fn fallback_coordinate(&self) -> Coordinate {
        Coordinate::new(self.fallback_latitude, self.fallback_longitude)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            fallback_latitude: default_fallback_latitude(),
            fallback_longitude: default_fallback_longitude(),
            fallback_address: default_fallback_address(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            high_accuracy: true,
        }
    }
}

// Yonghe District, New Taipei City
fn default_fallback_latitude() -> f64 {
    25.012
}

fn default_fallback_longitude() -> f64 {
    121.5064
}

fn default_fallback_address() -> String {
    "No. 2, Lane 96, Section 1, Xiulang Rd, Yonghe District, New Taipei City, Taiwan".to_string()
}

fn default_acquire_timeout_secs() -> u64 {
    15
}

fn default_true() -> bool {
    true
}

/// HTTP geocoder settings (Nominatim-compatible API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    #[serde(default = "default_geocoder_url")]
    pub base_url: String,

    /// Nominatim's usage policy requires an identifying agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_geocoder_timeout_secs")]
    pub timeout_secs: u64,
}

impl GeocoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoder_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_geocoder_timeout_secs(),
        }
    }
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("smokespot/{}", env!("CARGO_PKG_VERSION"))
}

fn default_geocoder_timeout_secs() -> u64 {
    10
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `SMOKESPOT_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of compact text
    #[serde(default)]
    pub json: bool,

    /// Also write logs to this file
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigSchema::default();
        assert_eq!(config.location.fallback_coordinate(), Coordinate::new(25.012, 121.5064));
        assert!(config.location.fallback_address.contains("Yonghe"));
        assert_eq!(config.location.acquire_timeout(), Duration::from_secs(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ConfigSchema = toml::from_str(
            r#"
            [location]
            fallback_latitude = 51.5074
            fallback_longitude = -0.1278

            [logging]
            json = true
            "#,
        )
        .unwrap();

        assert_eq!(config.location.fallback_latitude, 51.5074);
        assert_eq!(config.location.acquire_timeout_secs, 15);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "warn");
        assert!(config.geocoder.base_url.starts_with("https://"));
    }

    #[test]
    fn test_validate_rejects_bad_fallback() {
        let mut config = ConfigSchema::default();
        config.location.fallback_latitude = 123.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = ConfigSchema::default();
        config.location.acquire_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
