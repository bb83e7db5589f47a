//! Placeholder for device geolocation: a fixed city after a short delay.

use std::time::Duration;

pub const CURRENT_LOCATION: &str = "Stockholm";
pub const LOCATION_DELAY: Duration = Duration::from_millis(500);

pub async fn resolve_current_location() -> String {
    tracing::info!("resolving current location");
    tokio::time::sleep(LOCATION_DELAY).await;
    CURRENT_LOCATION.to_string()
}
