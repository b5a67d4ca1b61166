//! warble - YouTube Music to Opus workflow.
//!
//! warble bootstraps an isolated Python environment with the packages a
//! personal YouTube-Music-to-Opus download workflow needs, then drives
//! that workflow: fetching tracks as Opus through `yt-dlp`, embedding
//! cover art through `ffmpeg`, and cleaning up leftover images.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`embed`] - Cover-art embedding via ffmpeg
//! - [`error`] - Error types and result aliases
//! - [`fetch`] - Track downloading via yt-dlp
//! - [`library`] - Music-folder scanning and track/image matching
//! - [`python`] - Runtime discovery, virtual environments, pip
//! - [`shell`] - External process execution
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use warble::fetch::safe_filename;
//!
//! // Track titles become filesystem-safe filenames
//! let name = safe_filename("Song: Title?");
//! assert_eq!(name, "Song_ Title_.opus");
//! ```

pub mod cli;
pub mod embed;
pub mod error;
pub mod fetch;
pub mod library;
pub mod python;
pub mod shell;
pub mod ui;

pub use error::{Result, WarbleError};
