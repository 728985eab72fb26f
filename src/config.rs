//! Configuration module
//!
//! Settings are read from a TOML file (default
//! `~/.config/parkspot/config.toml`, overridable with `PARKSPOT_CONFIG`).
//! Every section and field is optional; a missing file means defaults.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [storage]
//! path = "/var/lib/parkspot/spots.json"
//! in_memory = false
//!
//! [proximity]
//! radius_km = 10.0
//!
//! [geocoder]
//! provider = "nominatim"   # or "mock"
//! base_url = "https://nominatim.openstreetmap.org"
//! timeout_secs = 10
//!
//! [location]
//! latitude = 48.8566
//! longitude = 2.3522
//!
//! [logging]
//! level = "info"
//! format = "text"          # or "json"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Location, DEFAULT_RADIUS_KM};
use crate::infrastructure::geocoding::DEFAULT_NOMINATIM_URL;

/// Environment variable holding an alternative config file path
pub const CONFIG_ENV_VAR: &str = "PARKSPOT_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Full application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub proximity: ProximityConfig,
    pub geocoder: GeocoderConfig,
    pub location: LocationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Snapshot file location
    pub path: Option<PathBuf>,
    /// Keep spots in memory only, ignoring `path`
    pub in_memory: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            in_memory: false,
        }
    }
}

impl StorageConfig {
    /// Snapshot file to use, if spots are persisted at all
    pub fn snapshot_path(&self) -> Option<&Path> {
        if self.in_memory {
            None
        } else {
            self.path.as_deref()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    pub radius_km: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocoderProvider {
    Nominatim,
    Mock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub provider: GeocoderProvider,
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            provider: GeocoderProvider::Nominatim,
            base_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: concat!("parkspot/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}

/// Fixed device position. Both fields must be set to enable it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Treat location access as refused
    pub denied: bool,
}

impl LocationConfig {
    pub fn fixed(&self) -> Option<Location> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Location {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reject values that would make the service misbehave at runtime
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.proximity.radius_km.is_finite() || self.proximity.radius_km < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "proximity.radius_km must be a non-negative number, got {}",
                self.proximity.radius_km
            )));
        }
        if let Some(location) = self.location.fixed() {
            Location::new(location.latitude, location.longitude)
                .map_err(|e| ConfigError::Invalid(format!("location: {}", e)))?;
        } else if self.location.latitude.is_some() != self.location.longitude.is_some() {
            return Err(ConfigError::Invalid(
                "location.latitude and location.longitude must be set together".into(),
            ));
        }
        if self.geocoder.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "geocoder.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// `~/.config/parkspot/config.toml`, or `./config.toml` without a home dir
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("parkspot").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Config path from `PARKSPOT_CONFIG`, falling back to [`default_config_path`]
pub fn config_path_from_env() -> PathBuf {
    std::env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}

fn default_storage_path() -> Option<PathBuf> {
    dirs_next::data_dir().map(|dir| dir.join("parkspot").join("spots.json"))
}
