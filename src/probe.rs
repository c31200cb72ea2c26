use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::SnapError;

/// Configuration for the readiness prober
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Base URL of the remote debugging endpoint (e.g. `http://127.0.0.1:9222`)
    pub endpoint_url: String,
    /// Maximum number of reachability checks before giving up
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub retry_delay: Duration,
}

impl ProbeConfig {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            max_attempts: 3,
            retry_delay: Duration::from_millis(2000),
        }
    }
}

/// Result of a single reachability check. Every failure cause (DNS, refused
/// connection, timeout) collapses to `NotReady`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Ready,
    NotReady,
}

/// Outcome of a full probe run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The endpoint answered; `attempts` is the 1-based attempt that succeeded
    Ready { attempts: u32 },
    /// The cancellation token fired before the endpoint became ready
    Interrupted,
}

/// A lightweight reachability check against the debugging endpoint.
///
/// The production implementation is [`HttpEndpoint`]; tests substitute a
/// scripted endpoint.
pub trait EndpointProbe {
    fn check(&self) -> impl Future<Output = ProbeStatus> + Send;
}

/// Checks Chrome's `/json/version` endpoint over HTTP
pub struct HttpEndpoint {
    client: reqwest::Client,
    version_url: String,
}

impl HttpEndpoint {
    pub fn new(endpoint_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            version_url: format!("{}/json/version", endpoint_url.trim_end_matches('/')),
        }
    }
}

impl EndpointProbe for HttpEndpoint {
    async fn check(&self) -> ProbeStatus {
        match self
            .client
            .get(&self.version_url)
            .timeout(Duration::from_secs(1))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => ProbeStatus::Ready,
            _ => ProbeStatus::NotReady,
        }
    }
}

/// Wait for the debugging endpoint to become reachable.
///
/// Attempts are counted from 1. A successful check returns immediately; a
/// failed check with attempts remaining sleeps for `retry_delay` and retries.
/// Exhausting the budget fails with [`SnapError::ConnectionUnavailable`].
/// The cancellation token is observed at each suspension point; a cancelled
/// wait does not count as an additional attempt.
pub async fn wait_until_ready(
    endpoint: &impl EndpointProbe,
    config: &ProbeConfig,
    cancel: &CancellationToken,
) -> Result<ProbeOutcome, SnapError> {
    info!("Checking debugging endpoint at {}", config.endpoint_url);

    let max_attempts = config.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        if cancel.is_cancelled() {
            return Ok(ProbeOutcome::Interrupted);
        }

        if endpoint.check().await == ProbeStatus::Ready {
            info!("Endpoint ready after {} attempt(s)", attempt);
            return Ok(ProbeOutcome::Ready { attempts: attempt });
        }

        if attempt < max_attempts {
            debug!(
                "Endpoint not ready, retrying in {:?} ({}/{})",
                config.retry_delay, attempt, max_attempts
            );
            tokio::select! {
                _ = cancel.cancelled() => return Ok(ProbeOutcome::Interrupted),
                _ = tokio::time::sleep(config.retry_delay) => {}
            }
        }
    }

    Err(SnapError::ConnectionUnavailable {
        endpoint: config.endpoint_url.clone(),
    })
}

#[cfg(test)]
#[path = "probe_test.rs"]
mod probe_test;
