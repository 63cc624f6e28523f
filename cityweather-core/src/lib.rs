//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - The table of German federal states
//! - Clients for the GeoNames city search and OpenWeather current weather
//! - The fetch, join and persist pipeline
//! - Configuration & credentials handling
//!
//! It is used by `cityweather-cli`, but the pipeline can be driven by any
//! [`CitySource`]/[`WeatherSource`] pair.

pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod region;
pub mod source;
pub mod table;

pub use config::{Config, SourceConfig};
pub use error::SourceError;
pub use model::{CityRecord, WeatherSnapshot};
pub use pipeline::{Pipeline, PipelineOutcome, PipelineRequest};
pub use region::{Region, StateSelector};
pub use source::{CitySource, SourceId, WeatherSource};
