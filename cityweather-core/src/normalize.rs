//! Mapping of raw OpenWeather payloads into the strict domain types.
//!
//! Every upstream field is parsed as optional and leniently typed: a value of
//! the wrong JSON type is treated the same as a missing one. Defaults are
//! applied afterwards, per field, from the constants below.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

use crate::model::{ForecastPoint, WeatherSnapshot};

pub const FALLBACK_TEMPERATURE: i32 = 20;
pub const FALLBACK_HUMIDITY: u8 = 50;
pub const FALLBACK_WIND: f64 = 0.0;
pub const FALLBACK_ICON: &str = "circle";
pub const UNKNOWN_CONDITION: &str = "Unknown";
pub const PLACEHOLDER_ICON: &str = "help-circle";
pub const FORECAST_TEMPERATURE_FALLBACK: i32 = 0;

/// Maximum number of samples kept per day bucket.
pub const FORECAST_BUCKET_CAP: usize = 6;

fn lenient<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(de)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like [`lenient`], but only JSON objects count; serde would otherwise
/// fill a struct positionally from an array.
fn lenient_object<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(de)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Default, Deserialize)]
struct RawMain {
    #[serde(default, deserialize_with = "lenient")]
    temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    humidity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCondition {
    #[serde(default, deserialize_with = "lenient")]
    main: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawWind {
    #[serde(default, deserialize_with = "lenient")]
    speed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCurrent {
    #[serde(default, deserialize_with = "lenient_object")]
    main: Option<RawMain>,
    #[serde(default, deserialize_with = "lenient")]
    weather: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient_object")]
    wind: Option<RawWind>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCity {
    #[serde(default, deserialize_with = "lenient")]
    timezone: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawForecast {
    #[serde(default, deserialize_with = "lenient_object")]
    city: Option<RawCity>,
    #[serde(default, deserialize_with = "lenient")]
    list: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawForecastEntry {
    #[serde(default, deserialize_with = "lenient")]
    dt: Option<f64>,
    #[serde(default, deserialize_with = "lenient_object")]
    main: Option<RawMain>,
    #[serde(default, deserialize_with = "lenient")]
    weather: Option<Vec<Value>>,
}

/// First element of a `weather` array, if it looks like a condition object.
fn first_condition(weather: Option<&[Value]>) -> RawCondition {
    weather
        .and_then(|w| w.first())
        .filter(|v| v.is_object())
        .and_then(|v| RawCondition::deserialize(v).ok())
        .unwrap_or_default()
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

/// Half-up rounding (`-2.5 -> -2`, `2.5 -> 3`), saturating at the `i32` range.
fn round_half_up(x: f64) -> i32 {
    let floor = x.floor();
    let rounded = if x - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i32
}

fn fallback_snapshot(city: &str) -> WeatherSnapshot {
    WeatherSnapshot {
        city: city.to_string(),
        temperature: FALLBACK_TEMPERATURE,
        condition: UNKNOWN_CONDITION.to_string(),
        wind_speed_mps: FALLBACK_WIND,
        humidity_pct: FALLBACK_HUMIDITY,
        icon_code: FALLBACK_ICON.to_string(),
    }
}

/// Map a current-conditions payload into a snapshot for `city`.
///
/// Never fails: missing or mistyped fields get their fallback, and a payload
/// that is not a JSON object yields the full fallback snapshot.
pub fn map_snapshot(raw: &Value, city: &str) -> WeatherSnapshot {
    if !raw.is_object() {
        tracing::warn!(city, "current conditions payload is not an object, using fallback");
        return fallback_snapshot(city);
    }

    let parsed = match RawCurrent::deserialize(raw) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(city, error = %err, "failed to map current conditions, using fallback");
            return fallback_snapshot(city);
        }
    };

    let main = parsed.main.unwrap_or_default();
    let condition = first_condition(parsed.weather.as_deref());

    WeatherSnapshot {
        city: city.to_string(),
        temperature: main.temp.map(round_half_up).unwrap_or(FALLBACK_TEMPERATURE),
        condition: non_empty(condition.main).unwrap_or_else(|| UNKNOWN_CONDITION.to_string()),
        wind_speed_mps: parsed.wind.and_then(|w| w.speed).unwrap_or(FALLBACK_WIND),
        humidity_pct: main
            .humidity
            .map(|h| round_half_up(h).clamp(0, 100) as u8)
            .unwrap_or(FALLBACK_HUMIDITY),
        icon_code: non_empty(condition.icon).unwrap_or_else(|| FALLBACK_ICON.to_string()),
    }
}

/// Forecast samples split by the city's local calendar day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastBuckets {
    pub today: Vec<ForecastPoint>,
    pub tomorrow: Vec<ForecastPoint>,
}

/// Calendar date and `HH:MM` of `utc_secs + offset`, read in UTC fields.
fn local_clock(utc_secs: i64, offset: i64) -> Option<(NaiveDate, String)> {
    let shifted = utc_secs.checked_add(offset)?;
    let local = DateTime::<Utc>::from_timestamp(shifted, 0)?;
    Some((local.date_naive(), local.format("%H:%M").to_string()))
}

fn to_point(entry: RawForecastEntry, local_time: String) -> ForecastPoint {
    let condition = first_condition(entry.weather.as_deref());

    ForecastPoint {
        local_time,
        temperature: entry
            .main
            .and_then(|m| m.temp)
            .map(round_half_up)
            .unwrap_or(FORECAST_TEMPERATURE_FALLBACK),
        condition: non_empty(condition.main).unwrap_or_else(|| UNKNOWN_CONDITION.to_string()),
        icon_code: non_empty(condition.icon).unwrap_or_else(|| PLACEHOLDER_ICON.to_string()),
    }
}

/// Bucket a 3-hourly forecast payload into local "today" and "tomorrow".
///
/// The city's UTC offset (`city.timezone`, seconds) is added to each
/// timestamp and the result is read with UTC calendar fields. DST is not
/// modeled. Each bucket keeps at most [`FORECAST_BUCKET_CAP`] samples in
/// source order; samples on any other day are dropped.
pub fn bucket_forecast(raw: &Value, now: DateTime<Utc>) -> ForecastBuckets {
    let mut buckets = ForecastBuckets::default();

    if !raw.is_object() {
        return buckets;
    }
    let Ok(parsed) = RawForecast::deserialize(raw) else {
        return buckets;
    };
    let Some(list) = parsed.list else {
        return buckets;
    };

    let offset = parsed
        .city
        .and_then(|c| c.timezone)
        .map(|tz| tz as i64)
        .unwrap_or(0);

    let Some((today, _)) = local_clock(now.timestamp(), offset) else {
        return buckets;
    };
    let Some(tomorrow) = today.succ_opt() else {
        return buckets;
    };

    for item in &list {
        if !item.is_object() {
            continue;
        }
        let Ok(entry) = RawForecastEntry::deserialize(item) else {
            continue;
        };
        let Some(dt) = entry.dt else {
            continue;
        };
        let Some((date, local_time)) = local_clock(dt.floor() as i64, offset) else {
            continue;
        };

        let bucket = if date == today {
            &mut buckets.today
        } else if date == tomorrow {
            &mut buckets.tomorrow
        } else {
            continue;
        };

        if bucket.len() < FORECAST_BUCKET_CAP {
            bucket.push(to_point(entry, local_time));
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).single().expect("valid date")
    }

    fn sample(dt: DateTime<Utc>, temp: f64) -> Value {
        json!({
            "dt": dt.timestamp(),
            "main": { "temp": temp },
            "weather": [{ "main": "Clouds", "icon": "04d" }]
        })
    }

    #[test]
    fn maps_full_current_payload() {
        let raw = json!({
            "main": { "temp": 21.6, "humidity": 55 },
            "weather": [{ "main": "Rain", "icon": "10d" }],
            "wind": { "speed": 3.4 }
        });

        let snapshot = map_snapshot(&raw, "Paris");
        assert_eq!(
            snapshot,
            WeatherSnapshot {
                city: "Paris".to_string(),
                temperature: 22,
                condition: "Rain".to_string(),
                wind_speed_mps: 3.4,
                humidity_pct: 55,
                icon_code: "10d".to_string(),
            }
        );
    }

    #[test]
    fn empty_object_yields_fallback_snapshot() {
        let snapshot = map_snapshot(&json!({}), "Paris");
        assert_eq!(snapshot, fallback_snapshot("Paris"));
        assert_eq!(snapshot.temperature, 20);
        assert_eq!(snapshot.humidity_pct, 50);
        assert_eq!(snapshot.icon_code, "circle");
    }

    #[test]
    fn non_object_payloads_yield_fallback_snapshot() {
        for raw in [json!(null), json!([]), json!("oops"), json!(42), json!([1, 2, 3])] {
            assert_eq!(map_snapshot(&raw, "Rome"), fallback_snapshot("Rome"), "payload {raw}");
        }
    }

    #[test]
    fn mistyped_fields_fall_back_individually() {
        let raw = json!({
            "main": { "temp": "warm", "humidity": 71 },
            "weather": [{ "main": "", "icon": 7 }],
            "wind": "breezy"
        });

        let snapshot = map_snapshot(&raw, "Berlin");
        assert_eq!(snapshot.temperature, FALLBACK_TEMPERATURE);
        assert_eq!(snapshot.humidity_pct, 71);
        assert_eq!(snapshot.condition, "Unknown");
        assert_eq!(snapshot.icon_code, "circle");
        assert_eq!(snapshot.wind_speed_mps, 0.0);
    }

    #[test]
    fn array_shaped_objects_fall_back_individually() {
        let raw = json!({
            "main": [31.0, 80.0],
            "weather": [["Rain", "10d"]],
            "wind": [7.0]
        });

        assert_eq!(map_snapshot(&raw, "Paris"), fallback_snapshot("Paris"));
    }

    #[test]
    fn array_shaped_forecast_is_ignored() {
        let now = at(2026, 10, 18, 10, 0);
        let top_level = json!([null, [sample(at(2026, 10, 18, 12, 0), 5.0)]]);
        assert_eq!(bucket_forecast(&top_level, now), ForecastBuckets::default());

        let array_city = json!({ "city": [3600], "list": [sample(at(2026, 10, 18, 23, 0), 8.0)] });
        let buckets = bucket_forecast(&array_city, now);
        assert_eq!(buckets.today.len(), 1);
        assert_eq!(buckets.today[0].local_time, "23:00");

        let array_main = json!({
            "list": [{ "dt": at(2026, 10, 18, 12, 0).timestamp(), "main": [9.0], "weather": [["Rain", "10d"]] }]
        });
        let buckets = bucket_forecast(&array_main, now);
        assert_eq!(buckets.today[0].temperature, FORECAST_TEMPERATURE_FALLBACK);
        assert_eq!(buckets.today[0].condition, "Unknown");
        assert_eq!(buckets.today[0].icon_code, "help-circle");
    }

    #[test]
    fn weather_array_with_non_object_head_is_unknown() {
        let raw = json!({ "main": { "temp": 3.0 }, "weather": ["snow"] });
        let snapshot = map_snapshot(&raw, "Umeå");
        assert_eq!(snapshot.temperature, 3);
        assert_eq!(snapshot.condition, "Unknown");
    }

    #[test]
    fn temperature_rounds_half_up() {
        let t = |temp: f64| map_snapshot(&json!({ "main": { "temp": temp } }), "X").temperature;
        assert_eq!(t(21.5), 22);
        assert_eq!(t(-2.5), -2);
        assert_eq!(t(-2.6), -3);
        assert_eq!(t(0.4), 0);
        assert_eq!(t(0.49999999999999994), 0);
        assert_eq!(t(-0.5), 0);
    }

    #[test]
    fn humidity_is_clamped_to_percent_range() {
        let h = |hum: f64| map_snapshot(&json!({ "main": { "humidity": hum } }), "X").humidity_pct;
        assert_eq!(h(140.0), 100);
        assert_eq!(h(-3.0), 0);
        assert_eq!(h(64.6), 65);
    }

    #[test]
    fn successful_payload_fields_are_in_range() {
        let raws = [
            json!({ "main": { "temp": -41.2, "humidity": 100 }, "weather": [{ "main": "Snow" }] }),
            json!({ "main": { "humidity": 0 }, "wind": { "speed": 12.0 } }),
            json!({ "weather": [] }),
        ];

        for raw in &raws {
            let s = map_snapshot(raw, "Gothenburg");
            assert!(s.humidity_pct <= 100);
            assert!(!s.condition.is_empty());
            assert!(!s.icon_code.is_empty());
            assert_eq!(s.city, "Gothenburg");
        }
    }

    #[test]
    fn missing_or_non_array_list_yields_empty_buckets() {
        let now = at(2026, 10, 18, 10, 0);
        for raw in [json!({}), json!({ "list": {} }), json!({ "list": "x" }), json!(null), json!([])] {
            assert_eq!(bucket_forecast(&raw, now), ForecastBuckets::default(), "payload {raw}");
        }
    }

    #[test]
    fn positive_offset_moves_late_sample_into_tomorrow() {
        let now = at(2026, 10, 18, 10, 0);
        let raw = json!({
            "city": { "timezone": 3600 },
            "list": [sample(at(2026, 10, 18, 23, 0), 8.0)]
        });

        let buckets = bucket_forecast(&raw, now);
        assert!(buckets.today.is_empty());
        assert_eq!(buckets.tomorrow.len(), 1);
        assert_eq!(buckets.tomorrow[0].local_time, "00:00");
    }

    #[test]
    fn negative_offset_shifts_reference_day() {
        // 02:00 UTC on the 19th is still the 18th at UTC-5.
        let now = at(2026, 10, 19, 2, 0);
        let raw = json!({
            "city": { "timezone": -18000 },
            "list": [
                sample(at(2026, 10, 19, 3, 0), 1.0),
                sample(at(2026, 10, 19, 6, 0), 2.0),
            ]
        });

        let buckets = bucket_forecast(&raw, now);
        assert_eq!(buckets.today.len(), 1);
        assert_eq!(buckets.today[0].local_time, "22:00");
        assert_eq!(buckets.tomorrow.len(), 1);
        assert_eq!(buckets.tomorrow[0].local_time, "01:00");
    }

    #[test]
    fn caps_each_bucket_keeping_earliest_samples() {
        let now = at(2026, 10, 18, 0, 30);
        let list: Vec<Value> = (0..8)
            .map(|i| sample(at(2026, 10, 18, i * 3, 0), i as f64))
            .collect();
        let raw = json!({ "city": { "timezone": 0 }, "list": list });

        let buckets = bucket_forecast(&raw, now);
        let times: Vec<&str> = buckets.today.iter().map(|p| p.local_time.as_str()).collect();
        assert_eq!(times, ["00:00", "03:00", "06:00", "09:00", "12:00", "15:00"]);
        assert_eq!(buckets.today[5].temperature, 5);
        assert!(buckets.tomorrow.is_empty());
    }

    #[test]
    fn day_boundary_neither_duplicates_nor_skips() {
        let now = at(2026, 10, 18, 12, 0);
        let list: Vec<Value> = (0..16)
            .map(|i| sample(at(2026, 10, 18, 12, 0) + chrono::Duration::hours(3 * i), 0.0))
            .collect();
        let raw = json!({ "city": { "timezone": 7200 }, "list": list });

        let buckets = bucket_forecast(&raw, now);
        let today: Vec<&str> = buckets.today.iter().map(|p| p.local_time.as_str()).collect();
        let tomorrow: Vec<&str> = buckets.tomorrow.iter().map(|p| p.local_time.as_str()).collect();

        assert_eq!(today, ["14:00", "17:00", "20:00", "23:00"]);
        assert_eq!(tomorrow, ["02:00", "05:00", "08:00", "11:00", "14:00", "17:00"]);
    }

    #[test]
    fn forecast_outside_window_is_empty_not_error() {
        let now = at(2026, 10, 18, 23, 50);
        let raw = json!({
            "list": [
                sample(at(2026, 10, 20, 0, 0), 1.0),
                sample(at(2026, 10, 21, 3, 0), 1.0),
            ]
        });

        assert_eq!(bucket_forecast(&raw, now), ForecastBuckets::default());
    }

    #[test]
    fn forecast_entries_use_their_own_fallbacks() {
        let now = at(2026, 10, 18, 6, 0);
        let raw = json!({
            "list": [
                { "dt": at(2026, 10, 18, 9, 0).timestamp() },
                { "dt": "soon", "main": { "temp": 4 } },
                { "main": { "temp": 4 } },
                17,
                { "dt": at(2026, 10, 18, 12, 0).timestamp(), "main": { "temp": 9.5 }, "weather": [{ "main": "Clear" }] }
            ]
        });

        let buckets = bucket_forecast(&raw, now);
        assert_eq!(buckets.today.len(), 2);
        assert_eq!(
            buckets.today[0],
            ForecastPoint {
                local_time: "09:00".to_string(),
                temperature: 0,
                condition: "Unknown".to_string(),
                icon_code: "help-circle".to_string(),
            }
        );
        assert_eq!(buckets.today[1].temperature, 10);
        assert_eq!(buckets.today[1].condition, "Clear");
        assert_eq!(buckets.today[1].icon_code, "help-circle");
    }

    #[test]
    fn mistyped_timezone_defaults_to_utc() {
        let now = at(2026, 10, 18, 10, 0);
        let raw = json!({
            "city": { "timezone": "CET" },
            "list": [sample(at(2026, 10, 18, 23, 0), 8.0)]
        });

        let buckets = bucket_forecast(&raw, now);
        assert_eq!(buckets.today.len(), 1);
        assert_eq!(buckets.today[0].local_time, "23:00");
    }

    #[test]
    fn buckets_never_share_a_sample() {
        let now = at(2026, 10, 18, 21, 0);
        let list: Vec<Value> = (0..40)
            .map(|i| sample(at(2026, 10, 18, 0, 0) + chrono::Duration::hours(3 * i), i as f64))
            .collect();
        let raw = json!({ "city": { "timezone": 19800 }, "list": list });

        let buckets = bucket_forecast(&raw, now);
        assert!(buckets.today.len() <= FORECAST_BUCKET_CAP);
        assert!(buckets.tomorrow.len() <= FORECAST_BUCKET_CAP);
        for point in &buckets.today {
            assert!(!buckets.tomorrow.iter().any(|p| p.temperature == point.temperature));
        }
    }
}
