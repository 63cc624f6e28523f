//! DataFrame plumbing for the merge step: build frames from records,
//! drop excluded weather columns, inner-join on `city`, write CSV.

use polars::prelude::*;
use std::{fs::File, path::Path};

use crate::model::{CityRecord, WeatherSnapshot};

/// Join key shared by both frames.
pub const JOIN_KEY: &str = "city";

pub fn cities_frame(cities: &[CityRecord]) -> PolarsResult<DataFrame> {
    df!(
        "city" => cities.iter().map(|c| c.city.clone()).collect::<Vec<_>>(),
        "adminCode1" => cities.iter().map(|c| c.region_code.clone()).collect::<Vec<_>>(),
        "region" => cities.iter().map(|c| c.region_name.clone()).collect::<Vec<_>>(),
        "population" => cities.iter().map(|c| c.population).collect::<Vec<_>>(),
        "latitude" => cities.iter().map(|c| c.latitude).collect::<Vec<_>>(),
        "longitude" => cities.iter().map(|c| c.longitude).collect::<Vec<_>>()
    )
}

/// One row per `(city, snapshot)` pair; `city` is the last column.
pub fn weather_frame(rows: &[(String, WeatherSnapshot)]) -> PolarsResult<DataFrame> {
    df!(
        "temperature" => field(rows, |w| w.temperature),
        "feels_like" => field(rows, |w| w.feels_like),
        "temp_min" => field(rows, |w| w.temp_min),
        "temp_max" => field(rows, |w| w.temp_max),
        "pressure" => field(rows, |w| w.pressure),
        "humidity" => field(rows, |w| w.humidity),
        "sea_level" => field(rows, |w| w.sea_level),
        "grnd_level" => field(rows, |w| w.grnd_level),
        "visibility" => field(rows, |w| w.visibility),
        "wind_speed" => field(rows, |w| w.wind_speed),
        "wind_deg" => field(rows, |w| w.wind_deg),
        "wind_gust" => field(rows, |w| w.wind_gust),
        "rain_1h" => field(rows, |w| w.rain_1h),
        "clouds_all" => field(rows, |w| w.clouds_all),
        "weather_description" => field(rows, |w| w.weather_description.clone()),
        "timestamp" => field(rows, WeatherSnapshot::timestamp_iso),
        "city" => rows.iter().map(|(city, _)| city.clone()).collect::<Vec<_>>()
    )
}

fn field<T>(rows: &[(String, WeatherSnapshot)], get: impl Fn(&WeatherSnapshot) -> T) -> Vec<T> {
    rows.iter().map(|(_, w)| get(w)).collect()
}

/// Drop the named columns. Names that are not present are ignored and the
/// join key is always kept.
pub fn exclude_columns<S: AsRef<str>>(mut frame: DataFrame, names: &[S]) -> PolarsResult<DataFrame> {
    for name in names.iter().map(AsRef::as_ref) {
        if name == JOIN_KEY {
            tracing::warn!("'{JOIN_KEY}' is the join key and cannot be excluded");
            continue;
        }
        if frame.column(name).is_err() {
            tracing::debug!(column = name, "excluded column not present, ignoring");
            continue;
        }
        frame = frame.drop(name)?;
    }

    Ok(frame)
}

/// Inner join on `city`; unmatched rows on either side are dropped.
pub fn join_on_city(cities: DataFrame, weather: DataFrame) -> PolarsResult<DataFrame> {
    cities
        .lazy()
        .inner_join(weather.lazy(), col(JOIN_KEY), col(JOIN_KEY))
        .collect()
}

pub fn write_csv(frame: &mut DataFrame, path: &Path) -> PolarsResult<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(frame)
}
