//! Error types for warble operations.
//!
//! This module defines [`WarbleError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `WarbleError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `WarbleError::Other`) for unexpected errors
//! - All errors should provide actionable messages for users
//!
//! Two kinds are fatal by contract: [`WarbleError::RuntimeMissing`] aborts
//! before any filesystem mutation, and [`WarbleError::InstallFailure`]
//! carries pip's exit code so the process can surface it unchanged.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for warble operations.
#[derive(Debug, Error)]
pub enum WarbleError {
    /// No usable Python interpreter was found on PATH.
    #[error("Python runtime not found: {message}")]
    RuntimeMissing { message: String },

    /// Creating the virtual environment failed.
    #[error("Failed to create virtual environment at {path}: {message}")]
    EnvCreateFailed { path: PathBuf, message: String },

    /// Dependency installation failed; carries pip's exit code.
    #[error("Package installation failed with exit code {code:?}")]
    InstallFailure { code: Option<i32> },

    /// An external command failed to run or exited non-zero.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// A required external tool is not on PATH.
    #[error("'{tool}' not found: {hint}")]
    ToolMissing { tool: String, hint: String },

    /// A download could not be completed by any strategy.
    #[error("Download failed for {url}: {message}")]
    DownloadFailed { url: String, message: String },

    /// yt-dlp produced output we could not parse.
    #[error("Failed to parse yt-dlp metadata: {message}")]
    MetadataParse { message: String },

    /// Embedding cover art into a track failed.
    #[error("Failed to embed cover into {track}: {message}")]
    EmbedFailed { track: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WarbleError {
    /// The exit code this error should terminate the process with.
    ///
    /// `InstallFailure` propagates the underlying tool's code; everything
    /// else maps to `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            WarbleError::InstallFailure { code } => code.unwrap_or(1),
            _ => 1,
        }
    }
}

/// Result type alias for warble operations.
pub type Result<T> = std::result::Result<T, WarbleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_missing_displays_message() {
        let err = WarbleError::RuntimeMissing {
            message: "checked python3, python, py".into(),
        };
        assert!(err.to_string().contains("checked python3"));
    }

    #[test]
    fn env_create_failed_displays_path_and_message() {
        let err = WarbleError::EnvCreateFailed {
            path: PathBuf::from("/proj/venv"),
            message: "permission denied".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/proj/venv"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn install_failure_displays_code() {
        let err = WarbleError::InstallFailure { code: Some(2) };
        assert!(err.to_string().contains("2"));
    }

    #[test]
    fn install_failure_propagates_exit_code() {
        let err = WarbleError::InstallFailure { code: Some(23) };
        assert_eq!(err.exit_code(), 23);
    }

    #[test]
    fn install_failure_without_code_exits_one() {
        let err = WarbleError::InstallFailure { code: None };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn runtime_missing_exits_one() {
        let err = WarbleError::RuntimeMissing {
            message: "not found".into(),
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn command_failed_displays_command_and_code() {
        let err = WarbleError::CommandFailed {
            command: "ffmpeg -i in.opus".into(),
            code: Some(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("ffmpeg -i in.opus"));
        assert!(msg.contains("1"));
    }

    #[test]
    fn tool_missing_displays_tool_and_hint() {
        let err = WarbleError::ToolMissing {
            tool: "yt-dlp".into(),
            hint: "run 'warble setup' first".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("yt-dlp"));
        assert!(msg.contains("warble setup"));
    }

    #[test]
    fn download_failed_displays_url() {
        let err = WarbleError::DownloadFailed {
            url: "https://music.youtube.com/watch?v=abc".into(),
            message: "all strategies failed".into(),
        };
        assert!(err.to_string().contains("watch?v=abc"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: WarbleError = io_err.into();
        assert!(matches!(err, WarbleError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(WarbleError::MetadataParse {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
