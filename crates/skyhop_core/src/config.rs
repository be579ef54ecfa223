use std::{fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::{
        DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG, DEFAULT_COUNTRY, DEFAULT_FLY_DURATION_MS,
        DEFAULT_PITCH_DEG, DEFAULT_PROVIDER_TIMEOUT_MS, DEFAULT_STYLE_URL, DEFAULT_ZOOM,
    },
    location::LngLat,
    viewport::CameraOptions,
};

pub const MAPBOX_ACCESS_TOKEN_ENV_VAR: &str = "MAPBOX_ACCESS_TOKEN";
pub const MAPBOX_STYLE_URL_ENV_VAR: &str = "MAPBOX_STYLE_URL";
pub const GRAPHHOPPER_API_KEY_ENV_VAR: &str = "GRAPHHOPPER_API_KEY";
pub const DIRECTIONS_BACKEND_ENV_VAR: &str = "SKYHOP_DIRECTIONS_BACKEND";
pub const OSRM_URL_ENV_VAR: &str = "OSRM_URL";
pub const COUNTRY_ENV_VAR: &str = "SKYHOP_COUNTRY";
pub const PROVIDER_TIMEOUT_ENV_VAR: &str = "SKYHOP_PROVIDER_TIMEOUT_MS";
pub const CACHE_FOLDER_ENV_VAR: &str = "SKYHOP_CACHE_FOLDER";

const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{MAPBOX_ACCESS_TOKEN_ENV_VAR} is not set")]
    MissingTileToken,

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionsBackend {
    GraphHopper,
    Osrm,
}

impl Display for DirectionsBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DirectionsBackend::GraphHopper => "graphhopper",
                DirectionsBackend::Osrm => "osrm",
            }
        )
    }
}

impl FromStr for DirectionsBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "graphhopper" | "gh" => Ok(DirectionsBackend::GraphHopper),
            "osrm" => Ok(DirectionsBackend::Osrm),
            other => Err(format!("unknown directions backend {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub access_token: Option<String>,
    pub style_url: String,
    pub default_camera: CameraOptions,
}

impl MapConfig {
    /// The tile credential; rendering cannot start without it.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        match self.access_token.as_deref() {
            Some(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(ConfigError::MissingTileToken),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            style_url: String::from(DEFAULT_STYLE_URL),
            default_camera: CameraOptions {
                center: LngLat::new(DEFAULT_CENTER_LNG, DEFAULT_CENTER_LAT),
                zoom: DEFAULT_ZOOM,
                pitch: DEFAULT_PITCH_DEG,
                bearing: 0.0,
                duration_ms: DEFAULT_FLY_DURATION_MS,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsConfig {
    pub backend: DirectionsBackend,
    pub graphhopper_api_key: Option<String>,
    pub osrm_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkyhopConfig {
    pub map: MapConfig,
    pub directions: DirectionsConfig,
    pub country: String,
    pub provider_timeout: Duration,
    pub cache_folder: Option<PathBuf>,
}

impl SkyhopConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let backend = match non_empty(DIRECTIONS_BACKEND_ENV_VAR) {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: DIRECTIONS_BACKEND_ENV_VAR,
                value,
            })?,
            None => DirectionsBackend::GraphHopper,
        };

        let provider_timeout = match non_empty(PROVIDER_TIMEOUT_ENV_VAR) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::Invalid {
                    key: PROVIDER_TIMEOUT_ENV_VAR,
                    value,
                })?,
            None => Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS),
        };

        let map = MapConfig {
            access_token: non_empty(MAPBOX_ACCESS_TOKEN_ENV_VAR),
            style_url: non_empty(MAPBOX_STYLE_URL_ENV_VAR)
                .unwrap_or_else(|| String::from(DEFAULT_STYLE_URL)),
            ..MapConfig::default()
        };

        Ok(Self {
            map,
            directions: DirectionsConfig {
                backend,
                graphhopper_api_key: non_empty(GRAPHHOPPER_API_KEY_ENV_VAR),
                osrm_url: non_empty(OSRM_URL_ENV_VAR)
                    .unwrap_or_else(|| String::from(DEFAULT_OSRM_URL)),
            },
            country: non_empty(COUNTRY_ENV_VAR)
                .map(|country| country.trim().to_ascii_lowercase())
                .unwrap_or_else(|| String::from(DEFAULT_COUNTRY)),
            provider_timeout,
            cache_folder: non_empty(CACHE_FOLDER_ENV_VAR).map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<SkyhopConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        SkyhopConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.map.require_token(), Err(ConfigError::MissingTileToken));
        assert_eq!(config.directions.backend, DirectionsBackend::GraphHopper);
        assert_eq!(config.directions.graphhopper_api_key, None);
        assert_eq!(config.country, "in");
        assert_eq!(config.provider_timeout, Duration::from_millis(8_000));
        assert_eq!(config.cache_folder, None);
    }

    #[test]
    fn reads_credentials_and_overrides() {
        let config = config_from(&[
            (MAPBOX_ACCESS_TOKEN_ENV_VAR, "pk.test"),
            (GRAPHHOPPER_API_KEY_ENV_VAR, "gh-key"),
            (DIRECTIONS_BACKEND_ENV_VAR, "OSRM"),
            (OSRM_URL_ENV_VAR, "http://localhost:5000"),
            (COUNTRY_ENV_VAR, "DE"),
            (PROVIDER_TIMEOUT_ENV_VAR, "2500"),
        ])
        .unwrap();

        assert_eq!(config.map.require_token(), Ok("pk.test"));
        assert_eq!(config.directions.graphhopper_api_key.as_deref(), Some("gh-key"));
        assert_eq!(config.directions.backend, DirectionsBackend::Osrm);
        assert_eq!(config.directions.osrm_url, "http://localhost:5000");
        assert_eq!(config.country, "de");
        assert_eq!(config.provider_timeout, Duration::from_millis(2_500));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let config = config_from(&[(MAPBOX_ACCESS_TOKEN_ENV_VAR, "  ")]).unwrap();
        assert_eq!(config.map.require_token(), Err(ConfigError::MissingTileToken));
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(
            config_from(&[(PROVIDER_TIMEOUT_ENV_VAR, "soon")]),
            Err(ConfigError::Invalid {
                key: PROVIDER_TIMEOUT_ENV_VAR,
                value: String::from("soon"),
            })
        );
        assert!(config_from(&[(DIRECTIONS_BACKEND_ENV_VAR, "valhalla")]).is_err());
    }
}
