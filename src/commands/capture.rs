use std::path::PathBuf;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::capture::{self, CaptureConfig, CaptureOutcome, ViewportSize};
use crate::errors::SnapError;
use crate::probe::ProbeConfig;
use crate::session::normalize_target_url;

#[allow(clippy::too_many_arguments)]
pub async fn handle_capture(
    url: String,
    endpoint: String,
    attempts: u32,
    retry_delay_ms: u64,
    timeout_ms: u64,
    output: String,
    log: String,
    viewport: String,
    full_page: bool,
    cancel: &CancellationToken,
) -> Result<(), SnapError> {
    crate::commands::validate_endpoint(&endpoint)?;
    let viewport = ViewportSize::parse(&viewport)?;

    let config = CaptureConfig {
        probe: ProbeConfig {
            endpoint_url: endpoint,
            max_attempts: attempts,
            retry_delay: Duration::from_millis(retry_delay_ms),
        },
        target_url: normalize_target_url(&url),
        screenshot_path: PathBuf::from(output),
        log_path: PathBuf::from(log),
        navigation_timeout: Duration::from_millis(timeout_ms),
        viewport: Some(viewport),
        full_page,
    };

    match capture::run_capture(&config, cancel).await? {
        CaptureOutcome::Complete(summary) => {
            println!("Title: {}", summary.report.title);
            println!(
                "Screenshot saved to: {} ({} bytes)",
                config.screenshot_path.display(),
                summary.screenshot_bytes
            );
            println!("Page info logged to: {}", config.log_path.display());
            Ok(())
        }
        CaptureOutcome::Interrupted => {
            info!("Capture interrupted before completion");
            println!("Interrupted; no artifacts written");
            Ok(())
        }
    }
}
