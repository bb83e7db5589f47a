//! Plain-text rendering of gateway results.

use cityweather_core::{DetailedWeather, ForecastPoint, WeatherIcon, WeatherSnapshot, model::city_route};
use std::fmt::Write;

fn icon_label(icon: WeatherIcon) -> String {
    match icon {
        WeatherIcon::Remote(url) => url,
        WeatherIcon::Glyph(name) => format!("[{name}]"),
    }
}

pub fn city_table(snapshots: &[WeatherSnapshot]) -> String {
    let width = snapshots
        .iter()
        .map(|s| s.city.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for s in snapshots {
        let pad = width - s.city.chars().count();
        let _ = writeln!(
            out,
            "{}{}  {:>4}°C  {:<12} wind {:>4.1} m/s  humidity {:>3}%  -> {}",
            s.city,
            " ".repeat(pad),
            s.temperature,
            s.condition,
            s.wind_speed_mps,
            s.humidity_pct,
            city_route(&s.city),
        );
    }
    out
}

fn forecast_row(out: &mut String, label: &str, points: &[ForecastPoint]) {
    let _ = write!(out, "{label:<9}");
    if points.is_empty() {
        let _ = write!(out, " no forecast");
    }
    for p in points {
        let _ = write!(out, " {} {:>3}°C {:<8}", p.local_time, p.temperature, p.condition);
    }
    out.push('\n');
}

pub fn detail(d: &DetailedWeather) -> String {
    let c = &d.current;
    let mut out = String::new();
    let _ = writeln!(out, "{}", c.city);
    let _ = writeln!(out, "  {}°C, {}  {}", c.temperature, c.condition, icon_label(c.icon()));
    let _ = writeln!(out, "  wind {:.1} m/s, humidity {}%", c.wind_speed_mps, c.humidity_pct);
    forecast_row(&mut out, "Today", &d.today_forecast);
    forecast_row(&mut out, "Tomorrow", &d.tomorrow_forecast);
    out
}
