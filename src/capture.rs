use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::SnapError;
use crate::probe::{self, HttpEndpoint, ProbeConfig, ProbeOutcome};
use crate::report::PageReport;
use crate::session::{BrowserSession, PageOps, Session};

/// Viewport size for consistent screenshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
}

impl ViewportSize {
    /// Parse viewport size from "WIDTHxHEIGHT" format (e.g., "1920x1024")
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid viewport format. Use WIDTHxHEIGHT (e.g., 1920x1024)");
        }

        let width = parts[0]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid width in viewport size"))?;
        let height = parts[1]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid height in viewport size"))?;

        Ok(ViewportSize { width, height })
    }
}

/// Everything one capture run needs, passed explicitly (no ambient state)
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub probe: ProbeConfig,
    pub target_url: String,
    pub screenshot_path: PathBuf,
    pub log_path: PathBuf,
    pub navigation_timeout: Duration,
    pub viewport: Option<ViewportSize>,
    /// Capture the full scrollable page instead of just the viewport
    pub full_page: bool,
}

/// What a finished capture produced
#[derive(Debug, Clone)]
pub struct CaptureSummary {
    pub report: PageReport,
    pub screenshot_bytes: u64,
}

/// Outcome of a capture run
#[derive(Debug, Clone)]
pub enum CaptureOutcome {
    Complete(Box<CaptureSummary>),
    /// The run was interrupted before completion; nothing was written
    Interrupted,
}

/// Run the full capture flow: probe readiness, connect, navigate, save
/// artifacts, and disconnect.
///
/// If the endpoint never becomes reachable this fails with
/// [`SnapError::ConnectionUnavailable`] before any artifact is written.
pub async fn run_capture(
    config: &CaptureConfig,
    cancel: &CancellationToken,
) -> Result<CaptureOutcome, SnapError> {
    let endpoint = HttpEndpoint::new(&config.probe.endpoint_url);
    match probe::wait_until_ready(&endpoint, &config.probe, cancel).await? {
        ProbeOutcome::Interrupted => return Ok(CaptureOutcome::Interrupted),
        ProbeOutcome::Ready { attempts } => {
            debug!("Endpoint became ready on attempt {}", attempts);
        }
    }

    let session = BrowserSession::connect(&config.probe.endpoint_url).await?;
    capture_with(session, config, cancel).await
}

/// Drive the capture against an established session, then release it.
///
/// The session is consumed and disconnected exactly once whether the flow
/// succeeded or failed; disconnect errors never mask the primary result.
pub(crate) async fn capture_with<S: Session>(
    session: S,
    config: &CaptureConfig,
    cancel: &CancellationToken,
) -> Result<CaptureOutcome, SnapError> {
    if let Some(version) = session.browser_version() {
        info!("Browser: {}", version);
    }

    let result = drive(&session, config, cancel).await;
    session.disconnect().await;
    result
}

async fn drive<S: Session>(
    session: &S,
    config: &CaptureConfig,
    cancel: &CancellationToken,
) -> Result<CaptureOutcome, SnapError> {
    if cancel.is_cancelled() {
        return Ok(CaptureOutcome::Interrupted);
    }

    let page = session.new_page().await?;
    let result = drive_page(&page, config, cancel).await;
    page.close().await;
    result
}

async fn drive_page<P: PageOps>(
    page: &P,
    config: &CaptureConfig,
    cancel: &CancellationToken,
) -> Result<CaptureOutcome, SnapError> {
    if let Some(viewport) = config.viewport {
        page.set_viewport(viewport.width, viewport.height).await?;
    }

    info!("Navigating to {}", config.target_url);
    tokio::select! {
        _ = cancel.cancelled() => return Ok(CaptureOutcome::Interrupted),
        result = page.goto(&config.target_url, config.navigation_timeout) => result?,
    }

    let title = page.title().await?.unwrap_or_default();
    let url = page
        .current_url()
        .await?
        .unwrap_or_else(|| config.target_url.clone());
    let user_agent = page.user_agent().await?;
    info!("Page loaded: {} ({})", title, url);

    let screenshot_bytes = page
        .save_screenshot(&config.screenshot_path, config.full_page)
        .await?;
    info!("Screenshot saved to {}", config.screenshot_path.display());

    let report = PageReport {
        timestamp: Utc::now(),
        url,
        title,
        screenshot_path: config.screenshot_path.clone(),
        user_agent,
    };
    report.write_to(&config.log_path)?;
    info!("Page info logged to {}", config.log_path.display());

    if let Some(metrics) = page.metrics().await {
        info!(
            "Page metrics: {} DOM nodes, {} JS event listeners, layout {:.1}ms",
            metrics.dom_nodes,
            metrics.js_event_listeners,
            metrics.layout_duration * 1000.0
        );
    }

    Ok(CaptureOutcome::Complete(Box::new(CaptureSummary {
        report,
        screenshot_bytes,
    })))
}

#[cfg(test)]
#[path = "capture_test.rs"]
mod capture_test;
