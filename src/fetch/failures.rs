//! The failed-download log.
//!
//! Failures are appended to a plain-text log next to the download directory
//! as they happen, so a crash mid-playlist loses nothing. The same file is
//! parsed back by `fetch --retry`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::Result;

/// Log filename, created next to the download directory.
pub const FAILURE_LOG_NAME: &str = "failed_downloads.txt";

/// One failed download.
#[derive(Debug, Clone)]
pub struct FailedDownload {
    pub url: String,
    pub title: String,
    pub artist: String,
    pub error: String,
    /// Formatted local timestamp, captured at log time.
    pub timestamp: String,
}

/// Append-only failure log with an in-memory view of this run's failures.
#[derive(Debug)]
pub struct FailureLog {
    path: PathBuf,
    entries: Vec<FailedDownload>,
}

impl FailureLog {
    /// Create a log that writes to the given file.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            entries: Vec::new(),
        }
    }

    /// The log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Failures recorded during this run.
    pub fn entries(&self) -> &[FailedDownload] {
        &self.entries
    }

    /// Whether this run recorded any failures.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a failure in memory and append it to the log file.
    pub fn record(&mut self, url: &str, title: &str, artist: &str, error: &str) -> Result<()> {
        let entry = FailedDownload {
            url: url.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            error: error.to_string(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "Time: {}", entry.timestamp)?;
        writeln!(file, "Title: {}", entry.title)?;
        writeln!(file, "Artist: {}", entry.artist)?;
        writeln!(file, "URL: {}", entry.url)?;
        writeln!(file, "Error: {}", entry.error)?;
        writeln!(file, "{}", "-".repeat(50))?;
        writeln!(file)?;

        self.entries.push(entry);
        Ok(())
    }

    /// Read the URLs recorded in an existing log file, deduplicated, in
    /// first-seen order. A missing file yields an empty list.
    pub fn recorded_urls(path: &Path) -> Result<Vec<String>> {
        if !path.is_file() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(path)?;
        let mut urls = Vec::new();
        for line in content.lines() {
            if let Some(url) = line.strip_prefix("URL: ") {
                let url = url.trim();
                if !url.is_empty() && !urls.iter().any(|u| u == url) {
                    urls.push(url.to_string());
                }
            }
        }
        Ok(urls)
    }
}
