use url::Url;

use crate::errors::SnapError;

pub mod capture;
pub mod check;
pub mod version;

/// Reject endpoints that are not absolute http(s) URLs before probing
pub fn validate_endpoint(endpoint: &str) -> Result<(), SnapError> {
    let parsed = Url::parse(endpoint).map_err(|e| {
        SnapError::Other(anyhow::anyhow!("invalid endpoint URL '{}': {}", endpoint, e))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SnapError::Other(anyhow::anyhow!(
            "endpoint must be an http(s) URL, got '{}'",
            endpoint
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../commands_test.rs"]
mod commands_test;
