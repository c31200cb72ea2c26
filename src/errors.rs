use thiserror::Error;

/// Custom error type surfaced at the process boundary
#[derive(Debug, Error)]
pub enum SnapError {
    /// The debugging endpoint never became reachable within the probe budget
    #[error("debugging endpoint is not reachable: {endpoint}")]
    ConnectionUnavailable { endpoint: String },

    /// Page navigation failed or exceeded its timeout
    #[error("navigation to {url} failed: {reason}")]
    NavigationFailure { url: String, reason: String },

    /// CDP connect or command failure outside of navigation
    #[error("browser session error: {0}")]
    Session(String),

    /// Artifact write failure (screenshot or log file)
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Anything else
    #[error(transparent)]
    Other(anyhow::Error),
}

impl SnapError {
    /// Exit code for this error. Any unrecoverable error exits 1;
    /// success and interrupt exit 0 (handled by the caller).
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Human-readable hint printed alongside the error message
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            SnapError::ConnectionUnavailable { .. } => Some(
                "Make sure Chrome is running with remote debugging enabled, \
                 e.g. chrome --remote-debugging-port=9222",
            ),
            SnapError::NavigationFailure { .. } => Some(
                "The page took too long to load. Try increasing --timeout-ms \
                 or check your internet connection.",
            ),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for SnapError {
    /// Recover a typed error that was propagated through anyhow, so callers
    /// never have to sniff error message strings.
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<SnapError>() {
            Ok(snap) => snap,
            Err(err) => SnapError::Other(err),
        }
    }
}
