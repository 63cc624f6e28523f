use crate::{
    CityRecord, Config, WeatherSnapshot,
    error::SourceError,
    region::{Region, StateSelector},
    source::{geonames::GeoNamesClient, openweather::OpenWeatherClient},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod geonames;
pub mod openweather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    GeoNames,
    OpenWeather,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::GeoNames => "geonames",
            SourceId::OpenWeather => "openweather",
        }
    }

    pub const fn all() -> &'static [SourceId] {
        &[SourceId::GeoNames, SourceId::OpenWeather]
    }

    /// Environment variable that overrides the stored credential.
    pub fn env_var(&self) -> &'static str {
        match self {
            SourceId::GeoNames => "CITYWEATHER_GEONAMES_USERNAME",
            SourceId::OpenWeather => "CITYWEATHER_OPENWEATHER_API_KEY",
        }
    }

    /// What the credential is called by the upstream service.
    pub fn credential_label(&self) -> &'static str {
        match self {
            SourceId::GeoNames => "GeoNames username",
            SourceId::OpenWeather => "OpenWeather API key",
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SourceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "geonames" => Ok(SourceId::GeoNames),
            "openweather" => Ok(SourceId::OpenWeather),
            _ => Err(anyhow::anyhow!(
                "Unknown source '{value}'. Supported sources: geonames, openweather."
            )),
        }
    }
}

#[async_trait]
pub trait CitySource: Send + Sync + Debug {
    /// Most populous places of one region, at most [`geonames::MAX_ROWS`].
    async fn fetch_region(&self, region: Region) -> Result<Vec<CityRecord>, SourceError>;

    /// Cities for every selected region, concatenated in table order.
    /// A failing region is logged and contributes nothing.
    async fn fetch_top_cities(&self, selector: StateSelector) -> Vec<CityRecord> {
        let mut cities = Vec::new();

        for region in selector.regions() {
            match self.fetch_region(region).await {
                Ok(found) => {
                    tracing::debug!(region = region.code, count = found.len(), "fetched cities");
                    cities.extend(found);
                }
                Err(err) => {
                    tracing::error!("Error fetching cities for state {region}: {err}");
                }
            }
        }

        cities
    }
}

#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_weather(&self, latitude: f64, longitude: f64)
    -> Result<WeatherSnapshot, SourceError>;
}

fn require_credential(id: SourceId, config: &Config) -> anyhow::Result<String> {
    config.credential(id).map(str::to_owned).ok_or_else(|| {
        anyhow::anyhow!(
            "No {} configured for source '{id}'.\n\
                 Hint: run `cityweather configure {id}` or set {}.",
            id.credential_label(),
            id.env_var()
        )
    })
}

/// Construct the city source from config.
pub fn city_source_from_config(config: &Config) -> anyhow::Result<Box<dyn CitySource>> {
    let username = require_credential(SourceId::GeoNames, config)?;

    let client = match config.base_url(SourceId::GeoNames) {
        Some(url) => GeoNamesClient::with_base_url(username, url),
        None => GeoNamesClient::new(username),
    };

    Ok(Box::new(client))
}

/// Construct the weather source from config.
pub fn weather_source_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherSource>> {
    let api_key = require_credential(SourceId::OpenWeather, config)?;

    let client = match config.base_url(SourceId::OpenWeather) {
        Some(url) => OpenWeatherClient::with_base_url(api_key, url),
        None => OpenWeatherClient::new(api_key),
    };

    Ok(Box::new(client))
}
