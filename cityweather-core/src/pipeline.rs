use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};

use crate::{
    model::{CityRecord, WeatherSnapshot},
    region::StateSelector,
    source::{CitySource, WeatherSource},
    table,
};

/// Inputs of a single run, as given on the command line.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub selector: StateSelector,
    pub output_dir: PathBuf,
    /// Weather column names to drop before joining.
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Written { path: PathBuf, rows: usize },
    /// A file for this selector and hour already existed.
    Skipped { path: PathBuf },
    /// The city source returned nothing; no file was written.
    NoCities,
}

/// `<dir>/weather_data_<tag>_<YYYY-MM-DD_HH>.csv`
pub fn output_path<Tz: TimeZone>(dir: &Path, selector: StateSelector, now: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    let hour = now.format("%Y-%m-%d_%H");
    dir.join(format!("weather_data_{}_{hour}.csv", selector.file_tag()))
}

#[derive(Debug)]
pub struct Pipeline {
    cities: Box<dyn CitySource>,
    weather: Box<dyn WeatherSource>,
}

impl Pipeline {
    pub fn new(cities: Box<dyn CitySource>, weather: Box<dyn WeatherSource>) -> Self {
        Self { cities, weather }
    }

    /// Fetch, merge and persist; the output hour is read from the local clock
    /// once the merged table is ready.
    pub async fn run(&self, request: &PipelineRequest) -> Result<PipelineOutcome> {
        match self.collect(request).await? {
            Some(merged) => persist(request, merged, &Local::now()),
            None => Ok(PipelineOutcome::NoCities),
        }
    }

    /// Same as [`Pipeline::run`] with an explicit clock; only the date and hour of `now` matter.
    pub async fn run_at<Tz: TimeZone>(
        &self,
        request: &PipelineRequest,
        now: DateTime<Tz>,
    ) -> Result<PipelineOutcome>
    where
        Tz::Offset: std::fmt::Display,
    {
        match self.collect(request).await? {
            Some(merged) => persist(request, merged, &now),
            None => Ok(PipelineOutcome::NoCities),
        }
    }

    /// Steps 1 to 4. `None` when the city source returned nothing.
    async fn collect(&self, request: &PipelineRequest) -> Result<Option<DataFrame>> {
        tracing::info!(selector = %request.selector, "Fetching city data...");
        let cities = self.cities.fetch_top_cities(request.selector).await;
        if cities.is_empty() {
            tracing::error!("No data fetched. Check your input or API connection.");
            return Ok(None);
        }

        tracing::info!(cities = cities.len(), "Fetching weather data...");
        let weather = self.fetch_weather_for(&cities).await;

        merge(&cities, &weather, &request.exclude).map(Some)
    }

    /// Sequential per-city weather lookups; failures are logged and skipped.
    async fn fetch_weather_for(&self, cities: &[CityRecord]) -> Vec<(String, WeatherSnapshot)> {
        let mut found = Vec::with_capacity(cities.len());

        for city in cities {
            match self.weather.fetch_weather(city.latitude, city.longitude).await {
                Ok(snapshot) => found.push((city.city.clone(), snapshot)),
                Err(err) => {
                    tracing::error!("Failed to fetch weather data for city {}: {err}", city.city);
                }
            }
        }

        found
    }
}

/// Write `merged` unless a file for this selector and hour already exists.
fn persist<Tz: TimeZone>(
    request: &PipelineRequest,
    mut merged: DataFrame,
    now: &DateTime<Tz>,
) -> Result<PipelineOutcome>
where
    Tz::Offset: std::fmt::Display,
{
    std::fs::create_dir_all(&request.output_dir).with_context(|| {
        format!("Failed to create output directory: {}", request.output_dir.display())
    })?;

    let path = output_path(&request.output_dir, request.selector, now);
    if path.exists() {
        tracing::warn!("Data for {} already exists. Skipping write.", now.format("%Y-%m-%d_%H"));
        return Ok(PipelineOutcome::Skipped { path });
    }

    table::write_csv(&mut merged, &path)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;

    let rows = merged.height();
    tracing::info!(rows, "Data successfully saved to {}", path.display());

    Ok(PipelineOutcome::Written { path, rows })
}

/// Exclude weather columns, then inner-join with the cities on `city`.
pub fn merge<S: AsRef<str>>(
    cities: &[CityRecord],
    weather: &[(String, WeatherSnapshot)],
    exclude: &[S],
) -> Result<DataFrame> {
    let cities = table::cities_frame(cities).context("Failed to build city table")?;
    let weather = table::weather_frame(weather).context("Failed to build weather table")?;
    let weather = table::exclude_columns(weather, exclude).context("Failed to drop columns")?;

    table::join_on_city(cities, weather).context("Failed to join city and weather tables")
}
