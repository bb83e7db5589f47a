use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde_json::Value;
use tracing::instrument;

use crate::{
    config::Config,
    error::FetchError,
    location,
    model::{DetailedWeather, WeatherSnapshot},
    normalize::{ForecastBuckets, bucket_forecast, map_snapshot},
    provider::{Endpoint, OpenWeatherSource, WeatherSource},
};

/// Entry point for callers: every operation resolves to a complete value,
/// substituting placeholders wherever the provider gave no data.
#[derive(Debug)]
pub struct WeatherGateway {
    source: Box<dyn WeatherSource>,
    default_cities: Vec<String>,
}

impl WeatherGateway {
    pub fn new(source: Box<dyn WeatherSource>) -> Self {
        Self {
            source,
            default_cities: Config::default().default_cities(),
        }
    }

    /// OpenWeather-backed gateway using the key, base URL and city list from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Box::new(OpenWeatherSource::from_config(config)))
            .with_default_cities(config.default_cities())
    }

    /// Replace the list used when [`fetch_cities_weather`](Self::fetch_cities_weather)
    /// gets no cities. An empty list keeps the current one.
    pub fn with_default_cities(mut self, cities: Vec<String>) -> Self {
        if !cities.is_empty() {
            self.default_cities = cities;
        }
        self
    }

    pub fn default_cities(&self) -> &[String] {
        &self.default_cities
    }

    pub async fn resolve_current_location(&self) -> String {
        location::resolve_current_location().await
    }

    /// Current conditions for each city, in input order. Requests run
    /// concurrently; a failed city gets [`WeatherSnapshot::placeholder`].
    #[instrument(skip(self, cities), fields(count = cities.len()))]
    pub async fn fetch_cities_weather(&self, cities: &[String]) -> Vec<WeatherSnapshot> {
        let target = if cities.is_empty() {
            self.default_cities.as_slice()
        } else {
            cities
        };
        tracing::info!(cities = ?target, "fetching current weather");

        join_all(target.iter().map(|city| self.snapshot(city))).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_detailed_weather(&self, city: &str) -> DetailedWeather {
        self.fetch_detailed_weather_at(city, Utc::now()).await
    }

    /// Like [`fetch_detailed_weather`](Self::fetch_detailed_weather) with an
    /// explicit reference instant for the today/tomorrow split.
    pub async fn fetch_detailed_weather_at(&self, city: &str, now: DateTime<Utc>) -> DetailedWeather {
        tracing::info!(city, "fetching detailed weather");

        let (current, forecast) = tokio::join!(self.snapshot(city), self.source.forecast(city));

        let ForecastBuckets { today, tomorrow } = match forecast {
            Ok(raw) => bucket_forecast(&raw, now),
            Err(err) => {
                log_no_data(city, Endpoint::Forecast, &err);
                ForecastBuckets::default()
            }
        };

        DetailedWeather {
            current,
            today_forecast: today,
            tomorrow_forecast: tomorrow,
        }
    }

    async fn snapshot(&self, city: &str) -> WeatherSnapshot {
        match self.source.current(city).await {
            Ok(Value::Null) => {
                tracing::warn!(city, endpoint = %Endpoint::Current, "provider returned null body, using placeholder");
                WeatherSnapshot::placeholder(city)
            }
            Ok(raw) => map_snapshot(&raw, city),
            Err(err) => {
                log_no_data(city, Endpoint::Current, &err);
                WeatherSnapshot::placeholder(city)
            }
        }
    }
}

fn log_no_data(city: &str, endpoint: Endpoint, err: &FetchError) {
    tracing::warn!(city, %endpoint, error = %err, "no data from provider, using placeholder");
}
