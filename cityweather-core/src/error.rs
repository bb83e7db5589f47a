use reqwest::StatusCode;

/// Why a single upstream call produced no data.
///
/// None of these reach callers of the gateway; they are logged and replaced
/// by placeholder values.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no API key configured (checked ${env_var} and the config file)")]
    MissingApiKey { env_var: String },

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("upstream responded with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
