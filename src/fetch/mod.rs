//! Track downloading.
//!
//! All network work is delegated to `yt-dlp` subprocesses; this module owns
//! URL classification, the metadata model, safe filenames, the download
//! strategy chain, and the failed-download log.

pub mod failures;
pub mod filename;
pub mod metadata;
pub mod ytdlp;

pub use failures::{FailedDownload, FailureLog, FAILURE_LOG_NAME};
pub use filename::{safe_filename, safe_folder_name};
pub use metadata::TrackMetadata;
pub use ytdlp::{Playlist, YtDlp};

/// Default download directory name, relative to the project root.
pub const DOWNLOAD_DIR_NAME: &str = "YouTube Music Downloads";

/// What kind of thing a URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    /// A single track.
    Track,
    /// A playlist of tracks.
    Playlist,
    /// An album release (processed as a playlist).
    Album,
}

/// Whether the URL belongs to YouTube / YouTube Music at all.
pub fn is_youtube_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("youtube.com") || lower.contains("youtu.be/")
}

/// Classify a YouTube URL. Returns `None` for non-YouTube URLs.
pub fn classify_url(url: &str) -> Option<UrlKind> {
    if !is_youtube_url(url) {
        return None;
    }

    let lower = url.to_lowercase();
    if lower.contains("playlist") {
        Some(UrlKind::Playlist)
    } else if lower.contains("album") || lower.contains("release") {
        Some(UrlKind::Album)
    } else {
        Some(UrlKind::Track)
    }
}
