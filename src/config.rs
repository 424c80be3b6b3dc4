//! TOML configuration for the binaries.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::backend::BackendClient;
use crate::geography::{IbgeClient, IBGE_LOCALIDADES_URL};
use crate::geolocation::{ConfiguredPosition, FixedPosition, HttpPositionSource, NoPosition};
use crate::models::Coordinate;

/// Environment variable holding the backend base URL
pub const API_URL_ENV: &str = "ECOLETA_API_URL";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_GEOLOCATION_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub geography: GeographyConfig,
    #[serde(default)]
    pub geolocation: GeolocationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeographyConfig {
    #[serde(default = "default_geography_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeographyConfig {
    fn default() -> Self {
        Self {
            base_url: default_geography_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Where the map's initial center comes from. A fixed position wins over
/// an endpoint; with neither, the map starts at (0,0).
#[derive(Debug, Deserialize, Clone)]
pub struct GeolocationConfig {
    pub position: Option<Coordinate>,
    pub endpoint: Option<String>,
    #[serde(default = "default_geolocation_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            position: None,
            endpoint: None,
            timeout_secs: DEFAULT_GEOLOCATION_TIMEOUT_SECS,
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_geolocation_timeout_secs() -> u64 {
    DEFAULT_GEOLOCATION_TIMEOUT_SECS
}

fn default_geography_url() -> String {
    IBGE_LOCALIDADES_URL.to_string()
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Defaults for everything but the backend URL
    pub fn with_api_url(base_url: &str) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            geography: GeographyConfig::default(),
            geolocation: GeolocationConfig::default(),
        }
    }

    /// Config file if given, else defaults; `api_url` overrides either
    pub fn resolve(path: Option<&Path>, api_url: Option<&str>) -> Result<Self> {
        let mut config = match (path, api_url) {
            (Some(path), _) => Self::load_from_file(path)
                .with_context(|| format!("Config: {}", path.display()))?,
            (None, Some(url)) => return Ok(Self::with_api_url(url)),
            (None, None) => anyhow::bail!(
                "No backend URL: pass --config, --api-url or set {}",
                API_URL_ENV
            ),
        };
        if let Some(url) = api_url {
            config.api.base_url = url.to_string();
        }
        Ok(config)
    }

    pub fn backend_client(&self) -> Result<BackendClient> {
        BackendClient::new(&self.api.base_url, Duration::from_secs(self.api.timeout_secs))
            .context("Failed to create backend client")
    }

    pub fn geography_client(&self) -> Result<IbgeClient> {
        self.geography.client()
    }
}

impl GeographyConfig {
    pub fn client(&self) -> Result<IbgeClient> {
        IbgeClient::new(&self.base_url, Duration::from_secs(self.timeout_secs))
            .context("Failed to create geography client")
    }
}

impl GeolocationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn source(&self) -> Result<ConfiguredPosition> {
        if let Some(position) = self.position {
            if !position.is_valid() {
                anyhow::bail!("Configured position out of range: {}", position);
            }
            return Ok(ConfiguredPosition::Fixed(FixedPosition(position)));
        }
        match &self.endpoint {
            Some(endpoint) => {
                let source = HttpPositionSource::new(endpoint, self.timeout())
                    .context("Failed to create position client")?;
                Ok(ConfiguredPosition::Http(source))
            }
            None => Ok(ConfiguredPosition::Unavailable(NoPosition)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_file_gets_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nbase_url = \"http://localhost:3333\"").unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3333");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.geography.base_url, IBGE_LOCALIDADES_URL);
        assert!(matches!(
            config.geolocation.source().unwrap(),
            ConfiguredPosition::Unavailable(_)
        ));
    }

    #[test]
    fn test_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [api]
            base_url = "http://localhost:3333"
            timeout_secs = 5

            [geography]
            base_url = "http://localhost:9000/localidades"

            [geolocation]
            position = {{ latitude = -23.55, longitude = -46.63 }}
            endpoint = "http://localhost:9001/position"
            timeout_secs = 2
            "#
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.geography.base_url, "http://localhost:9000/localidades");
        assert_eq!(config.geolocation.timeout(), Duration::from_secs(2));
        assert!(matches!(
            config.geolocation.source().unwrap(),
            ConfiguredPosition::Fixed(FixedPosition(c)) if c == Coordinate::new(-23.55, -46.63)
        ));
    }

    #[test]
    fn test_out_of_range_fixed_position_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [api]
            base_url = "http://localhost:3333"

            [geolocation]
            position = {{ latitude = 123.0, longitude = -46.63 }}
            "#
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert!(config.geolocation.source().is_err());
    }

    #[test]
    fn test_default_geography_client() {
        let geography = GeographyConfig::default();
        assert_eq!(geography.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(geography.client().is_ok());
    }

    #[test]
    fn test_missing_api_section_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[geography]\ntimeout_secs = 3").unwrap();
        assert!(Config::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_resolve_precedence() {
        assert!(Config::resolve(None, None).is_err());

        let config = Config::resolve(None, Some("http://api.local")).unwrap();
        assert_eq!(config.api.base_url, "http://api.local");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nbase_url = \"http://from-file\"").unwrap();
        let config = Config::resolve(Some(file.path()), Some("http://from-flag")).unwrap();
        assert_eq!(config.api.base_url, "http://from-flag");
    }
}
