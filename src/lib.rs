//! # cdpsnap
#![allow(clippy::uninlined_format_args)]
//!
//! CLI tool that connects to an **already-running** Chrome instance via the
//! Chrome DevTools Protocol, navigates to a URL, captures a PNG screenshot,
//! and writes a short page-info log.
//!
//! The browser is never launched or closed by this tool: it attaches over the
//! remote debugging endpoint and disconnects when done. The one piece of
//! reusable logic is the connection-readiness prober, which waits for the
//! endpoint with a bounded number of attempts and a fixed inter-attempt delay.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Start Chrome with remote debugging first:
//! #   chrome --remote-debugging-port=9222
//!
//! # Capture a page
//! cdpsnap capture "https://www.example.com"
//!
//! # Capture with custom endpoint and artifact paths
//! cdpsnap capture "https://www.example.com" \
//!     --endpoint http://127.0.0.1:9223 \
//!     --output shot.png --log shot.log
//!
//! # Tune the readiness probe
//! cdpsnap capture "https://www.example.com" --attempts 5 --retry-delay-ms 1000
//!
//! # Just check whether the endpoint is reachable
//! cdpsnap check --endpoint http://127.0.0.1:9222
//! ```
//!
//! ## Library Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use cdpsnap::{CaptureConfig, ProbeConfig, ViewportSize, run_capture};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), cdpsnap::SnapError> {
//! let config = CaptureConfig {
//!     probe: ProbeConfig::new("http://127.0.0.1:9222"),
//!     target_url: "https://www.example.com".to_string(),
//!     screenshot_path: "screenshot.png".into(),
//!     log_path: "page_info.log".into(),
//!     navigation_timeout: Duration::from_secs(30),
//!     viewport: Some(ViewportSize { width: 1920, height: 1024 }),
//!     full_page: false,
//! };
//! let outcome = run_capture(&config, &CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

/// Orchestration of the probe-connect-navigate-capture flow
pub mod capture;

/// CLI command handlers
pub mod commands;

/// Error types surfaced at the process boundary
pub mod errors;

/// Connection-readiness prober for the debugging endpoint
pub mod probe;

/// Page-info log artifact
pub mod report;

/// CDP browser session and page operations
pub mod session;

pub use capture::{CaptureConfig, CaptureOutcome, CaptureSummary, ViewportSize, run_capture};
pub use errors::SnapError;
pub use probe::{
    EndpointProbe, HttpEndpoint, ProbeConfig, ProbeOutcome, ProbeStatus, wait_until_ready,
};
pub use report::PageReport;
pub use session::{BrowserSession, PageMetrics, PageOps, Session, SnapPage, VersionInfo};
