use chrono::{DateTime, Utc};

/// A populated place as returned by the city source, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct CityRecord {
    pub city: String,
    pub region_code: String,
    /// `None` when the upstream region code is not in the region table.
    pub region_name: Option<String>,
    pub population: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
}

impl CityRecord {
    pub const COLUMNS: [&'static str; 6] =
        ["city", "adminCode1", "region", "population", "latitude", "longitude"];
}

/// Current conditions at one coordinate pair, metric units.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: i64,
    pub humidity: i64,
    pub sea_level: Option<i64>,
    pub grnd_level: Option<i64>,
    pub visibility: Option<i64>,
    pub wind_speed: f64,
    pub wind_deg: i64,
    pub wind_gust: Option<f64>,
    pub rain_1h: Option<f64>,
    pub clouds_all: i64,
    pub weather_description: String,
    pub timestamp: DateTime<Utc>,
}

impl WeatherSnapshot {
    pub const COLUMNS: [&'static str; 16] = [
        "temperature",
        "feels_like",
        "temp_min",
        "temp_max",
        "pressure",
        "humidity",
        "sea_level",
        "grnd_level",
        "visibility",
        "wind_speed",
        "wind_deg",
        "wind_gust",
        "rain_1h",
        "clouds_all",
        "weather_description",
        "timestamp",
    ];

    /// Observation time as a naive ISO-8601 string, always UTC.
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}
