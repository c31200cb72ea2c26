use std::future::Future;
use std::path::Path;
use std::time::Duration;

use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::browser_protocol::performance::{EnableParams, GetMetricsParams};
use chromiumoxide::cdp::browser_protocol::target::CloseTargetParams;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::SnapError;

/// Fields of interest from Chrome's `/json/version` endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    /// Product string, e.g. "HeadlessChrome/120.0.6099.109"
    #[serde(rename = "Browser")]
    pub browser: Option<String>,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: Option<String>,
}

/// Render-related page metrics from `Performance.getMetrics`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    pub dom_nodes: u64,
    pub js_event_listeners: u64,
    pub layout_duration: f64,
}

/// Seam between the capture flow and the CDP collaborator, so the flow can be
/// exercised against a scripted session in tests.
pub trait Session {
    type Page: PageOps;

    fn browser_version(&self) -> Option<&str>;
    fn new_page(&self) -> impl Future<Output = Result<Self::Page, SnapError>> + Send;
    /// Release the connection. Consumes the session, so cleanup can only
    /// happen once per run.
    fn disconnect(self) -> impl Future<Output = ()> + Send;
}

/// Operations the capture flow needs from an open page
pub trait PageOps {
    fn set_viewport(
        &self,
        width: u32,
        height: u32,
    ) -> impl Future<Output = Result<(), SnapError>> + Send;
    fn goto(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), SnapError>> + Send;
    fn title(&self) -> impl Future<Output = Result<Option<String>, SnapError>> + Send;
    fn current_url(&self) -> impl Future<Output = Result<Option<String>, SnapError>> + Send;
    fn user_agent(&self) -> impl Future<Output = Result<String, SnapError>> + Send;
    fn save_screenshot(
        &self,
        path: &Path,
        full_page: bool,
    ) -> impl Future<Output = Result<u64, SnapError>> + Send;
    fn metrics(&self) -> impl Future<Output = Option<PageMetrics>> + Send;
    /// Best-effort close; failures are logged and swallowed
    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// A connected handle to a browser that was launched by another process.
///
/// The connection is made over the WebSocket debugger URL advertised by the
/// endpoint's `/json/version`. Disconnecting drops the connection without
/// closing the browser.
pub struct BrowserSession {
    browser: Browser,
    event_task: JoinHandle<()>,
    version: VersionInfo,
}

impl BrowserSession {
    /// Connect to the remote debugging endpoint (e.g. `http://127.0.0.1:9222`)
    pub async fn connect(endpoint_url: &str) -> Result<Self, SnapError> {
        let version = fetch_version(endpoint_url).await?;
        let ws_url = version.web_socket_debugger_url.clone().ok_or_else(|| {
            SnapError::Session(format!(
                "no webSocketDebuggerUrl advertised by {}",
                endpoint_url
            ))
        })?;

        debug!("Connecting to browser websocket {}", ws_url);
        let (browser, mut handler) = Browser::connect(&ws_url)
            .await
            .map_err(|e| SnapError::Session(format!("CDP connect to {} failed: {}", ws_url, e)))?;

        // Drive CDP events for the lifetime of the session
        let event_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        info!("Connected to browser");
        Ok(Self {
            browser,
            event_task,
            version,
        })
    }
}

impl Session for BrowserSession {
    type Page = SnapPage;

    fn browser_version(&self) -> Option<&str> {
        self.version.browser.as_deref()
    }

    async fn new_page(&self) -> Result<SnapPage, SnapError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| SnapError::Session(format!("failed to open page: {}", e)))?;
        Ok(SnapPage { page })
    }

    async fn disconnect(self) {
        // The browser was launched externally: drop the websocket connection,
        // never send Browser.close.
        self.event_task.abort();
        drop(self.browser);
        debug!("Disconnected from browser");
    }
}

/// A page opened in the connected browser
pub struct SnapPage {
    page: Page,
}

impl PageOps for SnapPage {
    async fn set_viewport(&self, width: u32, height: u32) -> Result<(), SnapError> {
        let params = SetDeviceMetricsOverrideParams::builder()
            .width(width as i64)
            .height(height as i64)
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(SnapError::Session)?;
        self.page
            .execute(params)
            .await
            .map_err(|e| SnapError::Session(format!("failed to set viewport: {}", e)))?;
        Ok(())
    }

    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), SnapError> {
        let navigation = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<(), chromiumoxide::error::CdpError>(())
        };

        match tokio::time::timeout(timeout, navigation).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(SnapError::NavigationFailure {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(SnapError::NavigationFailure {
                url: url.to_string(),
                reason: format!("timed out after {:?}", timeout),
            }),
        }
    }

    async fn title(&self) -> Result<Option<String>, SnapError> {
        self.page
            .get_title()
            .await
            .map_err(|e| SnapError::Session(format!("failed to read title: {}", e)))
    }

    async fn current_url(&self) -> Result<Option<String>, SnapError> {
        self.page
            .url()
            .await
            .map_err(|e| SnapError::Session(format!("failed to read URL: {}", e)))
    }

    async fn user_agent(&self) -> Result<String, SnapError> {
        self.page
            .evaluate("navigator.userAgent")
            .await
            .map_err(|e| SnapError::Session(format!("failed to evaluate userAgent: {}", e)))?
            .into_value::<String>()
            .map_err(|e| SnapError::Session(format!("unexpected userAgent value: {}", e)))
    }

    async fn save_screenshot(&self, path: &Path, full_page: bool) -> Result<u64, SnapError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(full_page)
            .build();
        let bytes = self
            .page
            .save_screenshot(params, path)
            .await
            .map_err(|e| SnapError::Session(format!("failed to capture screenshot: {}", e)))?;
        Ok(bytes.len() as u64)
    }

    async fn metrics(&self) -> Option<PageMetrics> {
        // Best-effort: the Performance domain may be unavailable depending on
        // the target, so any failure just drops the metrics display.
        if let Err(e) = self.page.execute(EnableParams::default()).await {
            debug!("Could not enable Performance domain: {}", e);
            return None;
        }
        let result = match self.page.execute(GetMetricsParams::default()).await {
            Ok(result) => result,
            Err(e) => {
                debug!("Could not get page metrics: {}", e);
                return None;
            }
        };

        let value_of = |name: &str| {
            result
                .metrics
                .iter()
                .find(|m| m.name == name)
                .map(|m| m.value)
                .unwrap_or(0.0)
        };

        Some(PageMetrics {
            dom_nodes: value_of("Nodes") as u64,
            js_event_listeners: value_of("JSEventListeners") as u64,
            layout_duration: value_of("LayoutDuration"),
        })
    }

    async fn close(&self) {
        let params = CloseTargetParams::new(self.page.target_id().clone());
        if let Err(e) = self.page.execute(params).await {
            warn!("Error closing page: {}", e);
        } else {
            debug!("Page closed");
        }
    }
}

/// Fetch `/json/version` from the debugging endpoint
async fn fetch_version(endpoint_url: &str) -> Result<VersionInfo, SnapError> {
    let url = format!("{}/json/version", endpoint_url.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .get(&url)
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .map_err(|e| SnapError::Session(format!("cannot reach {}: {}", url, e)))?;
    response
        .json::<VersionInfo>()
        .await
        .map_err(|e| SnapError::Session(format!("invalid JSON from {}: {}", url, e)))
}

/// Normalize a target URL, defaulting to https:// when no scheme is given
pub fn normalize_target_url(url: &str) -> String {
    if url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with("file://")
        || url.starts_with("about:")
        || url.starts_with("data:")
    {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;
