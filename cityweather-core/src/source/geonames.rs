use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};

use crate::{
    error::{SourceError, truncate_body},
    model::CityRecord,
    region::{self, Region},
};

use super::CitySource;

pub const DEFAULT_URL: &str = "http://api.geonames.org/searchJSON";

/// Upper bound on places per region, sent as `maxRows`.
pub const MAX_ROWS: usize = 50;

/// Populated place, seats of first to third order admin divisions, capital.
const FEATURE_CODES: [&str; 5] = ["PPL", "PPLA", "PPLA2", "PPLA3", "PPLC"];

#[derive(Debug, Clone)]
pub struct GeoNamesClient {
    username: String,
    base_url: String,
    http: Client,
}

impl GeoNamesClient {
    pub fn new(username: String) -> Self {
        Self::with_base_url(username, DEFAULT_URL)
    }

    pub fn with_base_url(username: String, base_url: &str) -> Self {
        Self {
            username,
            base_url: base_url.to_string(),
            http: Client::new(),
        }
    }

    fn query<'a>(&'a self, region: &'a Region, max_rows: &'a str) -> Vec<(&'a str, &'a str)> {
        let mut query = vec![("country", "DE"), ("featureClass", "P")];
        query.extend(FEATURE_CODES.iter().map(|code| ("fcode", *code)));
        query.extend([
            ("maxRows", max_rows),
            ("orderby", "population"),
            ("username", self.username.as_str()),
            ("adminCode1", region.code),
        ]);
        query
    }
}

#[derive(Debug, Deserialize)]
struct GnStatus {
    message: String,
    value: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct GnPlace {
    name: String,
    #[serde(rename = "adminCode1", default)]
    admin_code1: Option<String>,
    #[serde(default)]
    population: Option<i64>,
    #[serde(deserialize_with = "coordinate")]
    lat: f64,
    #[serde(deserialize_with = "coordinate")]
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct GnSearchResponse {
    #[serde(default)]
    geonames: Vec<GnPlace>,
    status: Option<GnStatus>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCoordinate {
    Number(f64),
    Text(String),
}

// GeoNames sends coordinates as strings.
fn coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match RawCoordinate::deserialize(deserializer)? {
        RawCoordinate::Number(value) => Ok(value),
        RawCoordinate::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl From<GnPlace> for CityRecord {
    fn from(place: GnPlace) -> Self {
        let region_code = place.admin_code1.unwrap_or_default();
        let region_name = region::lookup(&region_code).map(str::to_owned);

        CityRecord {
            city: place.name,
            region_code,
            region_name,
            population: place.population,
            latitude: place.lat,
            longitude: place.lng,
        }
    }
}

#[async_trait]
impl CitySource for GeoNamesClient {
    async fn fetch_region(&self, region: Region) -> Result<Vec<CityRecord>, SourceError> {
        let context = format!("GeoNames search for state {}", region.code);
        let max_rows = MAX_ROWS.to_string();

        let res = self
            .http
            .get(&self.base_url)
            .query(&self.query(&region, &max_rows))
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

        let parsed: GnSearchResponse = serde_json::from_str(&body)
            .map_err(|source| SourceError::Decode { context: context.clone(), source })?;

        if let Some(err) = parsed.status {
            let message = match err.value {
                Some(code) => format!("{} (code {code})", err.message),
                None => err.message,
            };
            return Err(SourceError::Api { context, message });
        }

        Ok(parsed.geonames.into_iter().take(MAX_ROWS).map(CityRecord::from).collect())
    }
}
