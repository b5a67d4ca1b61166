//! Cover-art embedding.
//!
//! Embedding is delegated to `ffmpeg`: the audio stream is copied untouched
//! and the image is attached as an `attached_pic` stream, written to a
//! sibling temp file that replaces the original on success.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::error::{Result, WarbleError};
use crate::library::COVER_EXTENSIONS;
use crate::python::interpreter::{parse_system_path, resolve_tool_path};
use crate::shell;

/// Binary name, platform-qualified.
#[cfg(not(windows))]
const FFMPEG_BIN: &str = "ffmpeg";
#[cfg(windows)]
const FFMPEG_BIN: &str = "ffmpeg.exe";

/// Conventional cover filenames checked when no same-stem image exists.
const COMMON_COVER_NAMES: &[&str] = &[
    "cover.jpg",
    "cover.jpeg",
    "cover.png",
    "album.jpg",
    "folder.jpg",
];

/// Outcome counts for a batch embedding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbedSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl EmbedSummary {
    /// Whether the run as a whole succeeded (skips are not failures).
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Find the cover image for a track.
///
/// Resolution order:
/// 1. an image with the same stem as the track (`Song.opus` → `Song.jpg`)
/// 2. conventional names (`cover.jpg`, `album.jpg`, ...)
/// 3. any supported image in the folder
pub fn find_cover_for_track(track: &Path) -> Option<PathBuf> {
    let folder = track.parent()?;
    let stem = track.file_stem()?;

    for ext in COVER_EXTENSIONS {
        let mut name = stem.to_os_string();
        name.push(".");
        name.push(ext);
        let candidate = folder.join(&name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    for name in COMMON_COVER_NAMES {
        let candidate = folder.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(folder)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(OsStr::to_str)
                    .map(|e| COVER_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                    .unwrap_or(false)
        })
        .collect();
    entries.sort();
    entries.into_iter().next()
}

/// Embedder bound to one resolved ffmpeg binary.
#[derive(Debug, Clone)]
pub struct Embedder {
    ffmpeg: PathBuf,
}

impl Embedder {
    /// Use an explicit ffmpeg path.
    pub fn at(ffmpeg: PathBuf) -> Self {
        Self { ffmpeg }
    }

    /// Resolve ffmpeg from the current PATH.
    pub fn locate() -> Result<Self> {
        resolve_tool_path(FFMPEG_BIN, &parse_system_path())
            .map(Self::at)
            .ok_or_else(|| WarbleError::ToolMissing {
                tool: "ffmpeg".to_string(),
                hint: ffmpeg_install_hint().to_string(),
            })
    }

    /// The resolved binary path.
    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    /// Embed a cover image into an Opus file in place.
    pub fn embed_cover(&self, track: &Path, cover: &Path) -> Result<()> {
        let temp_file = track.with_extension("temp.opus");

        let args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-i".into(),
            track.as_os_str().to_os_string(),
            "-i".into(),
            cover.as_os_str().to_os_string(),
            "-map".into(),
            "0:a".into(),
            "-map".into(),
            "1".into(),
            "-c:a".into(),
            "copy".into(),
            "-c:v".into(),
            cover_codec(cover).into(),
            "-disposition:v".into(),
            "attached_pic".into(),
            "-y".into(),
            temp_file.as_os_str().to_os_string(),
        ];

        let arg_refs: Vec<&OsStr> = args.iter().map(|a| a.as_os_str()).collect();
        let result = shell::execute_quiet(&self.ffmpeg, &arg_refs)?;

        if result.success && temp_file.is_file() {
            std::fs::rename(&temp_file, track)?;
            Ok(())
        } else {
            if temp_file.exists() {
                let _ = std::fs::remove_file(&temp_file);
            }
            Err(WarbleError::EmbedFailed {
                track: track.to_path_buf(),
                message: result
                    .stderr
                    .lines()
                    .map(str::trim)
                    .find(|l| !l.is_empty())
                    .unwrap_or("ffmpeg failed")
                    .to_string(),
            })
        }
    }
}

/// Codec for the attached picture stream, chosen by image extension.
fn cover_codec(cover: &Path) -> &'static str {
    match cover
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => "png",
        _ => "mjpeg",
    }
}

/// Per-platform ffmpeg install instruction.
fn ffmpeg_install_hint() -> &'static str {
    if cfg!(target_os = "macos") {
        "install with: brew install ffmpeg"
    } else if cfg!(target_os = "windows") {
        "install from https://ffmpeg.org/download.html"
    } else {
        "install with your package manager, e.g.: sudo apt install ffmpeg"
    }
}
