use serde::Deserialize;

pub mod config;
pub mod generation;
pub mod identity;

#[derive(Debug, Deserialize)]
struct ProviderErrorResponse {
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: Option<String>,
}

/// Extracts the human-readable message from a Google-style error body, if
/// the body is the usual `{"error": {"message": ...}}` shape.
pub(crate) fn parse_provider_error(body: &str) -> Option<String> {
    let parsed: ProviderErrorResponse = serde_json::from_str(body).ok()?;
    parsed.error.and_then(|err| err.message)
}
