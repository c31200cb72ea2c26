use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::errors::SnapError;
use crate::probe::{self, HttpEndpoint, ProbeConfig, ProbeOutcome};

pub async fn handle_check(
    endpoint: String,
    attempts: u32,
    retry_delay_ms: u64,
    cancel: &CancellationToken,
) -> Result<(), SnapError> {
    crate::commands::validate_endpoint(&endpoint)?;

    let config = ProbeConfig {
        endpoint_url: endpoint,
        max_attempts: attempts,
        retry_delay: Duration::from_millis(retry_delay_ms),
    };

    let probe = HttpEndpoint::new(&config.endpoint_url);
    match probe::wait_until_ready(&probe, &config, cancel).await? {
        ProbeOutcome::Ready { attempts } => {
            println!(
                "Endpoint {} is ready (attempt {})",
                config.endpoint_url, attempts
            );
        }
        ProbeOutcome::Interrupted => {
            println!("Interrupted before the endpoint check completed");
        }
    }
    Ok(())
}
