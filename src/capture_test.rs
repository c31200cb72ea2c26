#[cfg(test)]
mod tests {
    use super::super::*;

    use std::path::Path;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use crate::errors::SnapError;
    use crate::probe::ProbeConfig;
    use crate::session::{PageMetrics, PageOps, Session};

    /// Scripted session whose disconnects are counted across the run
    struct MockSession {
        disconnects: Arc<AtomicUsize>,
        pages_opened: Arc<AtomicUsize>,
        fail_navigation: bool,
    }

    struct MockPage {
        fail_navigation: bool,
        closes: Arc<AtomicUsize>,
    }

    impl Session for MockSession {
        type Page = MockPage;

        fn browser_version(&self) -> Option<&str> {
            Some("HeadlessChrome/120.0 (mock)")
        }

        async fn new_page(&self) -> Result<MockPage, SnapError> {
            self.pages_opened.fetch_add(1, Ordering::SeqCst);
            Ok(MockPage {
                fail_navigation: self.fail_navigation,
                closes: Arc::new(AtomicUsize::new(0)),
            })
        }

        async fn disconnect(self) {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl PageOps for MockPage {
        async fn set_viewport(&self, _width: u32, _height: u32) -> Result<(), SnapError> {
            Ok(())
        }

        async fn goto(&self, url: &str, _timeout: Duration) -> Result<(), SnapError> {
            if self.fail_navigation {
                Err(SnapError::NavigationFailure {
                    url: url.to_string(),
                    reason: "net::ERR_CONNECTION_REFUSED".to_string(),
                })
            } else {
                Ok(())
            }
        }

        async fn title(&self) -> Result<Option<String>, SnapError> {
            Ok(Some("Mock Page".to_string()))
        }

        async fn current_url(&self) -> Result<Option<String>, SnapError> {
            Ok(Some("https://mock.example/".to_string()))
        }

        async fn user_agent(&self) -> Result<String, SnapError> {
            Ok("MockAgent/1.0".to_string())
        }

        async fn save_screenshot(&self, path: &Path, _full_page: bool) -> Result<u64, SnapError> {
            let bytes = b"\x89PNG mock";
            std::fs::write(path, bytes)?;
            Ok(bytes.len() as u64)
        }

        async fn metrics(&self) -> Option<PageMetrics> {
            None
        }

        async fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn test_config(dir: &Path) -> CaptureConfig {
        CaptureConfig {
            probe: ProbeConfig::new("http://127.0.0.1:9222"),
            target_url: "https://mock.example/".to_string(),
            screenshot_path: dir.join("screenshot.png"),
            log_path: dir.join("page_info.log"),
            navigation_timeout: Duration::from_secs(30),
            viewport: Some(ViewportSize {
                width: 1920,
                height: 1024,
            }),
            full_page: false,
        }
    }

    fn mock_session(fail_navigation: bool) -> (MockSession, Arc<AtomicUsize>) {
        let disconnects = Arc::new(AtomicUsize::new(0));
        let session = MockSession {
            disconnects: disconnects.clone(),
            pages_opened: Arc::new(AtomicUsize::new(0)),
            fail_navigation,
        };
        (session, disconnects)
    }

    #[tokio::test]
    async fn test_successful_capture_writes_artifacts_and_disconnects_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (session, disconnects) = mock_session(false);
        let cancel = CancellationToken::new();

        let outcome = capture_with(session, &config, &cancel).await.unwrap();

        let summary = match outcome {
            CaptureOutcome::Complete(summary) => summary,
            CaptureOutcome::Interrupted => panic!("expected a completed capture"),
        };
        assert_eq!(summary.report.title, "Mock Page");
        assert_eq!(summary.report.url, "https://mock.example/");
        assert_eq!(summary.report.user_agent, "MockAgent/1.0");
        assert_eq!(disconnects.load(Ordering::SeqCst), 1);

        assert!(config.screenshot_path.exists());
        let log = std::fs::read_to_string(&config.log_path).unwrap();
        assert!(log.contains("URL: https://mock.example/"));
        assert!(log.contains("Title: Mock Page"));
        assert!(log.contains("User Agent: MockAgent/1.0"));
    }

    #[tokio::test]
    async fn test_navigation_failure_still_disconnects_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (session, disconnects) = mock_session(true);
        let cancel = CancellationToken::new();

        let result = capture_with(session, &config, &cancel).await;

        assert!(matches!(
            result,
            Err(SnapError::NavigationFailure { .. })
        ));
        assert_eq!(
            disconnects.load(Ordering::SeqCst),
            1,
            "cleanup must run exactly once on the failure path"
        );
        assert!(!config.screenshot_path.exists());
        assert!(!config.log_path.exists());
    }

    #[tokio::test]
    async fn test_cancelled_before_page_open_skips_work_but_disconnects() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let pages_opened = Arc::new(AtomicUsize::new(0));
        let disconnects = Arc::new(AtomicUsize::new(0));
        let session = MockSession {
            disconnects: disconnects.clone(),
            pages_opened: pages_opened.clone(),
            fail_navigation: false,
        };
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = capture_with(session, &config, &cancel).await.unwrap();

        assert!(matches!(outcome, CaptureOutcome::Interrupted));
        assert_eq!(pages_opened.load(Ordering::SeqCst), 0);
        assert_eq!(disconnects.load(Ordering::SeqCst), 1);
        assert!(!config.screenshot_path.exists());
        assert!(!config.log_path.exists());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_creates_no_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        // Nothing listens here; keep the probe quick
        config.probe = ProbeConfig {
            endpoint_url: "http://127.0.0.1:1".to_string(),
            max_attempts: 2,
            retry_delay: Duration::from_millis(10),
        };
        let cancel = CancellationToken::new();

        let result = run_capture(&config, &cancel).await;

        assert!(matches!(
            result,
            Err(SnapError::ConnectionUnavailable { .. })
        ));
        assert!(!config.screenshot_path.exists());
        assert!(!config.log_path.exists());
    }

    #[test]
    fn test_viewport_parse() {
        let viewport = ViewportSize::parse("1920x1024").unwrap();
        assert_eq!(viewport.width, 1920);
        assert_eq!(viewport.height, 1024);

        assert!(ViewportSize::parse("1920").is_err());
        assert!(ViewportSize::parse("widexhigh").is_err());
        assert!(ViewportSize::parse("1920x1024x2").is_err());
    }
}
