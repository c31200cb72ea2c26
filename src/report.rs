use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};

/// Page facts written to the plain-text log artifact, one field per line
#[derive(Debug, Clone, PartialEq)]
pub struct PageReport {
    pub timestamp: DateTime<Utc>,
    /// Final URL after navigation (may differ from the requested URL)
    pub url: String,
    pub title: String,
    pub screenshot_path: PathBuf,
    pub user_agent: String,
}

impl PageReport {
    pub fn render(&self) -> String {
        format!(
            "Timestamp: {}\nURL: {}\nTitle: {}\nScreenshot: {}\nUser Agent: {}\n",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.url,
            self.title,
            self.screenshot_path.display(),
            self.user_agent,
        )
    }

    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.render())
    }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod report_test;
