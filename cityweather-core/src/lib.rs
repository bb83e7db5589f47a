//! Core library for the `cityweather` client.
//!
//! This crate defines:
//! - Configuration & API-key resolution
//! - The raw provider seam (`WeatherSource`) and its OpenWeather implementation
//! - Normalization of partial upstream payloads into fixed domain models
//! - `WeatherGateway`, the never-failing entry point used by front ends
//!
//! It is used by `cityweather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod gateway;
pub mod location;
pub mod model;
pub mod normalize;
pub mod provider;

pub use config::{ApiKeySource, Config};
pub use error::FetchError;
pub use gateway::WeatherGateway;
pub use model::{DetailedWeather, ForecastPoint, WeatherIcon, WeatherSnapshot};
pub use normalize::{ForecastBuckets, bucket_forecast, map_snapshot};
pub use provider::{Endpoint, OpenWeatherSource, WeatherSource};
