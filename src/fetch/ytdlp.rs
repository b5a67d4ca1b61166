//! yt-dlp driver.
//!
//! Wraps the three invocations the fetcher needs: track metadata, flat
//! playlist listings, and the actual audio download. Downloads prefer the
//! original Opus stream (`bestaudio[ext=webm][acodec=opus]`) so nothing is
//! re-encoded; when that grab fails, a second pass lets yt-dlp extract and
//! convert instead.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, WarbleError};
use crate::fetch::metadata::TrackMetadata;
use crate::python::interpreter::{extract_version, parse_system_path, resolve_tool_path};
use crate::shell::{self, CommandOptions, OutputCallback};

/// Binary name, platform-qualified.
#[cfg(not(windows))]
const YTDLP_BIN: &str = "yt-dlp";
#[cfg(windows)]
const YTDLP_BIN: &str = "yt-dlp.exe";

/// A flat playlist listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Playlist {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub entries: Vec<PlaylistEntry>,
}

/// One entry of a flat playlist dump. Entries with no id are skipped by
/// the caller; yt-dlp emits them for deleted or private videos.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Playlist {
    /// Playlist title with a fixed fallback.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("Playlist")
    }
}

/// Driver bound to one resolved yt-dlp binary.
#[derive(Debug, Clone)]
pub struct YtDlp {
    path: PathBuf,
}

impl YtDlp {
    /// Use an explicit binary path.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Resolve yt-dlp from the current PATH.
    ///
    /// The fetch command activates the virtual environment first, so the
    /// environment's own yt-dlp wins when the bootstrap has run.
    pub fn locate() -> Result<Self> {
        resolve_tool_path(YTDLP_BIN, &parse_system_path())
            .map(Self::at)
            .ok_or_else(|| WarbleError::ToolMissing {
                tool: "yt-dlp".to_string(),
                hint: "run 'warble setup' to install it into the environment".to_string(),
            })
    }

    /// The resolved binary path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Query the binary's version.
    pub fn version(&self) -> Option<String> {
        let result = shell::execute_quiet(&self.path, crate::argv!["--version"]).ok()?;
        if result.success {
            extract_version(&result.stdout)
        } else {
            None
        }
    }

    /// Fetch metadata for a single track without downloading it.
    pub fn track_info(&self, url: &str) -> Result<TrackMetadata> {
        let result = shell::execute_quiet(
            &self.path,
            crate::argv!["--dump-json", "--no-playlist", url],
        )?;

        if !result.success {
            return Err(WarbleError::DownloadFailed {
                url: url.to_string(),
                message: format!(
                    "could not fetch track info: {}",
                    summarize_stderr(&result.stderr)
                ),
            });
        }

        TrackMetadata::from_json(result.stdout.trim())
    }

    /// Fetch a flat playlist listing (no per-entry metadata resolution).
    pub fn playlist_info(&self, url: &str) -> Result<Playlist> {
        let result = shell::execute_quiet(
            &self.path,
            crate::argv!["--flat-playlist", "--dump-single-json", url],
        )?;

        if !result.success {
            return Err(WarbleError::DownloadFailed {
                url: url.to_string(),
                message: format!(
                    "could not fetch playlist info: {}",
                    summarize_stderr(&result.stderr)
                ),
            });
        }

        serde_json::from_str(result.stdout.trim()).map_err(|e| WarbleError::MetadataParse {
            message: e.to_string(),
        })
    }

    /// Download a track to `output_file`, streaming progress lines to a
    /// fresh callback per attempt (`make_callback` is invoked once per
    /// strategy).
    ///
    /// Two strategies, in order:
    /// 1. direct grab of the original Opus stream, no re-encode
    /// 2. let yt-dlp extract and convert to Opus (needs ffmpeg)
    ///
    /// Each strategy downloads to a temp basename in the target folder and
    /// renames on success, so a partial download never shadows the real
    /// filename.
    pub fn download(
        &self,
        url: &str,
        output_file: &Path,
        make_callback: impl Fn() -> OutputCallback,
    ) -> Result<()> {
        let folder = output_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&folder)?;

        let temp_base = folder.join(format!("wtmp_{}", std::process::id()));

        let mut errors = Vec::new();
        for strategy in [Strategy::Direct, Strategy::Convert] {
            match self.try_strategy(strategy, url, &temp_base, output_file, make_callback()) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::debug!("{:?} strategy failed for {}: {}", strategy, url, e);
                    errors.push(format!("{:?}: {}", strategy, e));
                }
            }
        }

        Err(WarbleError::DownloadFailed {
            url: url.to_string(),
            message: errors.join("; "),
        })
    }

    fn try_strategy(
        &self,
        strategy: Strategy,
        url: &str,
        temp_base: &Path,
        output_file: &Path,
        callback: OutputCallback,
    ) -> Result<()> {
        let template: OsString = {
            let mut t = temp_base.as_os_str().to_os_string();
            t.push(".%(ext)s");
            t
        };

        // The direct grab demands the original Opus stream and fails fast
        // when there is none; the convert pass accepts any audio and lets
        // yt-dlp re-encode.
        let format = match strategy {
            Strategy::Direct => "bestaudio[ext=webm][acodec=opus]",
            Strategy::Convert => "bestaudio[ext=webm][acodec=opus]/bestaudio",
        };

        let mut args: Vec<OsString> = vec![
            "-f".into(),
            format.into(),
            "--no-playlist".into(),
            "--no-overwrites".into(),
            "--no-embed-thumbnail".into(),
            "--restrict-filenames".into(),
        ];
        if matches!(strategy, Strategy::Convert) {
            for arg in ["-x", "--audio-format", "opus", "--audio-quality", "0"] {
                args.push(arg.into());
            }
        }
        args.push("-o".into());
        args.push(template);
        args.push(url.into());

        let arg_refs: Vec<&OsStr> = args.iter().map(|a| a.as_os_str()).collect();

        let result = shell::execute_streaming(
            &self.path,
            &arg_refs,
            &CommandOptions::default(),
            callback,
        )?;

        if !result.success {
            return Err(WarbleError::CommandFailed {
                command: format!("{} ... {}", self.path.display(), url),
                code: result.exit_code,
            });
        }

        // Find what landed under the temp basename and give it its real name.
        for ext in ["opus", "webm"] {
            let candidate = temp_base.with_extension(ext);
            if candidate.is_file() {
                std::fs::rename(&candidate, output_file)?;
                return Ok(());
            }
        }

        Err(WarbleError::DownloadFailed {
            url: url.to_string(),
            message: "downloaded file not found under temp name".to_string(),
        })
    }
}

/// Compress yt-dlp stderr into its most useful line.
fn summarize_stderr(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("no error output")
        .to_string()
}

/// Download strategy order.
#[derive(Debug, Clone, Copy)]
enum Strategy {
    Direct,
    Convert,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_title_falls_back() {
        let playlist: Playlist = serde_json::from_str(r#"{"entries": []}"#).unwrap();
        assert_eq!(playlist.title(), "Playlist");
    }

    #[test]
    fn playlist_parses_entries() {
        let json = r#"{
            "title": "My Mix",
            "entries": [
                {"id": "abc", "title": "First"},
                {"id": null, "title": "Deleted video"},
                {"title": "No id at all"}
            ]
        }"#;

        let playlist: Playlist = serde_json::from_str(json).unwrap();
        assert_eq!(playlist.title(), "My Mix");
        assert_eq!(playlist.entries.len(), 3);
        assert_eq!(playlist.entries[0].id.as_deref(), Some("abc"));
        assert!(playlist.entries[1].id.is_none());
        assert!(playlist.entries[2].id.is_none());
    }

    #[test]
    fn locate_honors_path() {
        // With an empty PATH there is nothing to find.
        let found = resolve_tool_path(YTDLP_BIN, &[]);
        assert!(found.is_none());
    }

    #[test]
    fn summarize_stderr_picks_last_line() {
        let stderr = "WARNING: something\nERROR: Video unavailable\n\n";
        assert_eq!(summarize_stderr(stderr), "ERROR: Video unavailable");
    }

    #[test]
    fn summarize_stderr_empty() {
        assert_eq!(summarize_stderr(""), "no error output");
    }

    #[test]
    fn track_info_with_missing_binary_errors() {
        let ytdlp = YtDlp::at(PathBuf::from("/nonexistent/yt-dlp"));
        assert!(ytdlp.track_info("https://music.youtube.com/watch?v=x").is_err());
    }
}
