use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Current conditions for a single city, always fully populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub city: String,
    pub temperature: i32,
    pub condition: String,
    pub wind_speed_mps: f64,
    pub humidity_pct: u8,
    pub icon_code: String,
}

impl WeatherSnapshot {
    /// Slot filler used when no data could be obtained for `city`.
    pub fn placeholder(city: &str) -> Self {
        Self {
            city: city.to_string(),
            temperature: 0,
            condition: crate::normalize::UNKNOWN_CONDITION.to_string(),
            wind_speed_mps: 0.0,
            humidity_pct: 0,
            icon_code: crate::normalize::PLACEHOLDER_ICON.to_string(),
        }
    }

    pub fn icon(&self) -> WeatherIcon {
        WeatherIcon::resolve(&self.condition, &self.icon_code)
    }
}

/// One 3-hour forecast sample on the city's local clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    /// `HH:MM`
    pub local_time: String,
    pub temperature: i32,
    pub condition: String,
    pub icon_code: String,
}

impl ForecastPoint {
    pub fn icon(&self) -> WeatherIcon {
        WeatherIcon::resolve(&self.condition, &self.icon_code)
    }
}

/// Snapshot plus the forecast split into local "today" and "tomorrow".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedWeather {
    #[serde(flatten)]
    pub current: WeatherSnapshot,
    pub today_forecast: Vec<ForecastPoint>,
    pub tomorrow_forecast: Vec<ForecastPoint>,
}

/// What the presentation layer should draw for a reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeatherIcon {
    /// Provider-hosted image.
    Remote(String),
    /// Named glyph from the app's icon font.
    Glyph(&'static str),
}

const OPENWEATHER_ICON_BASE: &str = "https://openweathermap.org/img/wn";

impl WeatherIcon {
    /// Prefer the provider image for real OpenWeather codes (`01d`, `10n`, ...);
    /// fall back to a glyph derived from the condition label.
    pub fn resolve(condition: &str, icon_code: &str) -> Self {
        if is_openweather_code(icon_code) {
            return Self::Remote(format!("{OPENWEATHER_ICON_BASE}/{icon_code}@2x.png"));
        }

        Self::Glyph(glyph_for_condition(condition))
    }
}

fn is_openweather_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == 3
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && matches!(bytes[2], b'd' | b'n')
}

pub fn glyph_for_condition(condition: &str) -> &'static str {
    match condition.to_lowercase().as_str() {
        "sunny" => "sunny",
        "partly-sunny" | "partly cloudy" => "partly-sunny",
        "cloudy" => "cloudy",
        "rainy" | "rain" => "rainy",
        "stormy" | "thunderstorm" => "thunderstorm",
        "snowy" | "snow" => "snow",
        "moon" | "clear" => "moon",
        "cloudy-night" => "cloudy-night",
        _ => "help-circle",
    }
}

/// Characters left as-is in a route parameter; everything else is escaped.
const ROUTE_PARAM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Detail-screen route for a city, e.g. `/Malm%C3%B6`.
pub fn city_route(city: &str) -> String {
    format!("/{}", utf8_percent_encode(city, ROUTE_PARAM))
}
