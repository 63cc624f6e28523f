use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{SourceError, truncate_body},
    model::WeatherSnapshot,
};

use super::WeatherSource;

pub const DEFAULT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.to_string(),
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: i64,
    humidity: i64,
    sea_level: Option<i64>,
    grnd_level: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: i64,
    gust: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: i64,
}

#[derive(Debug, Deserialize)]
struct OwRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    clouds: OwClouds,
    visibility: Option<i64>,
    rain: Option<OwRain>,
}

impl OwCurrentResponse {
    fn into_snapshot(self) -> Result<WeatherSnapshot, SourceError> {
        let timestamp = unix_to_utc(self.dt).ok_or(SourceError::Timestamp(self.dt))?;

        let weather_description = self
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .unwrap_or_else(|| "Unknown".to_string());

        Ok(WeatherSnapshot {
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            temp_min: self.main.temp_min,
            temp_max: self.main.temp_max,
            pressure: self.main.pressure,
            humidity: self.main.humidity,
            sea_level: self.main.sea_level,
            grnd_level: self.main.grnd_level,
            visibility: self.visibility,
            wind_speed: self.wind.speed,
            wind_deg: self.wind.deg,
            wind_gust: self.wind.gust,
            rain_1h: self.rain.and_then(|r| r.one_hour),
            clouds_all: self.clouds.all,
            weather_description,
            timestamp,
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherSnapshot, SourceError> {
        let context = format!("OpenWeather current weather for coordinates ({latitude}, {longitude})");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("lat", latitude.to_string().as_str()),
                ("lon", longitude.to_string().as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|source| SourceError::Request { context: context.clone(), source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| SourceError::Request { context: context.clone(), source })?;

        if !status.is_success() {
            return Err(SourceError::Status { context, status, body: truncate_body(&body) });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|source| SourceError::Decode { context, source })?;

        parsed.into_snapshot()
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}
