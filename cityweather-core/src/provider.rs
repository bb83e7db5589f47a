use async_trait::async_trait;
use serde_json::Value;
use std::fmt::{self, Debug};

use crate::error::FetchError;

pub mod openweather;

pub use openweather::OpenWeatherSource;

/// Upstream endpoints the gateway reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Current => "weather",
            Endpoint::Forecast => "forecast",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Raw access to a weather provider.
///
/// Implementations return the decoded JSON body untouched; shaping it into
/// domain types is the job of [`crate::normalize`].
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch(&self, endpoint: Endpoint, city: &str) -> Result<Value, FetchError>;

    async fn current(&self, city: &str) -> Result<Value, FetchError> {
        self.fetch(Endpoint::Current, city).await
    }

    async fn forecast(&self, city: &str) -> Result<Value, FetchError> {
        self.fetch(Endpoint::Forecast, city).await
    }
}
