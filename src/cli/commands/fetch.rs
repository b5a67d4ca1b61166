//! The `fetch` command: download tracks, playlists, and albums.
//!
//! Accepts a single URL, a file of URLs, a retry pass over the failure
//! log, or (interactively) a paste-URLs-until-done loop. Downloads run
//! strictly sequentially with a short politeness delay between playlist
//! entries.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::args::FetchArgs;
use crate::embed::Embedder;
use crate::error::{Result, WarbleError};
use crate::fetch::{
    classify_url, metadata, safe_filename, safe_folder_name, FailureLog, UrlKind, YtDlp,
    DOWNLOAD_DIR_NAME, FAILURE_LOG_NAME,
};
use crate::python::VirtualEnv;
use crate::ui::spinner::step_output_callback;
use crate::ui::{Prompt, UserInterface};

use super::{Command, CommandResult};

/// Outcome of one track attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackOutcome {
    Downloaded,
    AlreadyExists,
    Failed,
}

impl TrackOutcome {
    fn is_success(self) -> bool {
        !matches!(self, TrackOutcome::Failed)
    }
}

/// Downloads Opus audio through yt-dlp.
pub struct FetchCommand {
    project_root: PathBuf,
    args: FetchArgs,
}

impl FetchCommand {
    /// Create a new fetch command.
    pub fn new(project_root: &Path, args: FetchArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }

    fn output_dir(&self) -> PathBuf {
        self.args
            .output
            .clone()
            .unwrap_or_else(|| self.project_root.join(DOWNLOAD_DIR_NAME))
    }

    /// Download one track into `dir`, recording failures in the log.
    fn download_track(
        &self,
        ytdlp: &YtDlp,
        ffmpeg: Option<&Embedder>,
        url: &str,
        dir: &Path,
        log: &mut FailureLog,
        ui: &mut dyn UserInterface,
    ) -> TrackOutcome {
        let mut spinner = ui.start_spinner("Fetching track info...");

        let meta = match ytdlp.track_info(url) {
            Ok(meta) => meta,
            Err(e) => {
                spinner.finish_error(&format!("Could not fetch info for {}", url));
                let _ = log.record(url, "Unknown Title", "Unknown Artist", &e.to_string());
                return TrackOutcome::Failed;
            }
        };

        let label = format!("{} - {}", meta.artist(), meta.title());
        let filename = safe_filename(meta.title());
        let output_file = dir.join(&filename);

        if output_file.is_file() {
            spinner.finish_skipped(&format!("{} (already exists)", label));
            return TrackOutcome::AlreadyExists;
        }

        let base = format!("Downloading {}...", label);
        spinner.set_message(&base);

        let mode = ui.output_mode();
        let download = ytdlp.download(url, &output_file, || {
            step_output_callback(mode, spinner.as_ref(), &base)
        });

        if let Err(e) = download {
            spinner.finish_error(&format!("Failed: {}", label));
            ui.show_error_block(
                &format!("yt-dlp {}", url),
                &e.to_string(),
                Some("Logged for retry; run 'warble fetch --retry'"),
            );
            let _ = log.record(url, meta.title(), meta.artist(), &e.to_string());
            return TrackOutcome::Failed;
        }

        // Tagging is best-effort; a track without tags is still a track.
        if let Some(embedder) = ffmpeg {
            if let Err(e) = metadata::apply_tags(embedder.ffmpeg(), &output_file, &meta) {
                tracing::debug!("tagging failed for {}: {}", output_file.display(), e);
                ui.warning(&format!("Could not tag {}", filename));
            }
        }

        let size_mb = std::fs::metadata(&output_file)
            .map(|m| m.len() as f64 / (1024.0 * 1024.0))
            .unwrap_or(0.0);
        spinner.finish_success(&format!("{} ({:.1} MB)", label, size_mb));

        TrackOutcome::Downloaded
    }

    /// Download every entry of a playlist or album into its own folder.
    fn download_playlist(
        &self,
        ytdlp: &YtDlp,
        ffmpeg: Option<&Embedder>,
        url: &str,
        log: &mut FailureLog,
        ui: &mut dyn UserInterface,
    ) -> (usize, usize) {
        let playlist = match ytdlp.playlist_info(url) {
            Ok(p) => p,
            Err(e) => {
                ui.error(&format!("Could not fetch playlist info: {}", e));
                let _ = log.record(url, "Playlist", "Unknown Artist", &e.to_string());
                return (0, 1);
            }
        };

        let folder = self.output_dir().join(safe_folder_name(playlist.title()));
        let entries: Vec<_> = playlist
            .entries
            .iter()
            .filter_map(|e| e.id.as_deref())
            .collect();

        ui.message(&format!(
            "Playlist: {} ({} tracks)",
            playlist.title(),
            entries.len()
        ));

        let total = entries.len();
        let mut successes = 0;
        let mut failures = 0;

        for (i, id) in entries.iter().enumerate() {
            ui.show_progress(i + 1, total);
            let track_url = format!("https://music.youtube.com/watch?v={}", id);
            let outcome = self.download_track(ytdlp, ffmpeg, &track_url, &folder, log, ui);
            if outcome.is_success() {
                successes += 1;
            } else {
                failures += 1;
            }

            // Politeness delay between requests
            if i + 1 < total {
                std::thread::sleep(Duration::from_secs(1));
            }
        }

        ui.message(&format!(
            "Playlist done: {}/{} tracks downloaded",
            successes, total
        ));

        (successes, failures)
    }

    /// Process a single URL of any kind. Returns (successes, failures).
    fn process_url(
        &self,
        ytdlp: &YtDlp,
        ffmpeg: Option<&Embedder>,
        url: &str,
        log: &mut FailureLog,
        ui: &mut dyn UserInterface,
    ) -> (usize, usize) {
        match classify_url(url) {
            None => {
                ui.warning(&format!("Not a YouTube URL, skipping: {}", url));
                (0, 1)
            }
            Some(UrlKind::Track) => {
                let outcome =
                    self.download_track(ytdlp, ffmpeg, url, &self.output_dir(), log, ui);
                if outcome.is_success() {
                    (1, 0)
                } else {
                    (0, 1)
                }
            }
            Some(UrlKind::Playlist) | Some(UrlKind::Album) => {
                self.download_playlist(ytdlp, ffmpeg, url, log, ui)
            }
        }
    }

    /// Gather the URL list for non-interactive invocations.
    fn gather_urls(&self) -> Result<Vec<String>> {
        if self.args.retry {
            let log_path = self.project_root.join(FAILURE_LOG_NAME);
            let urls = FailureLog::recorded_urls(&log_path)?;
            return Ok(urls);
        }

        if let Some(file) = &self.args.file {
            return read_url_file(file);
        }

        Ok(self.args.url.clone().into_iter().collect())
    }

    fn summarize(&self, log: &FailureLog, ui: &mut dyn UserInterface) {
        if log.is_empty() {
            return;
        }

        ui.warning(&format!("{} download(s) failed:", log.entries().len()));
        for (i, failed) in log.entries().iter().enumerate() {
            ui.message(&format!(
                "  [{}] {} - {} ({})",
                i + 1,
                failed.title,
                failed.artist,
                failed.error
            ));
            ui.message(&format!("      {}", failed.url));
        }
        ui.show_hint(&format!(
            "Failures logged to {}; retry with 'warble fetch --retry'",
            log.path().display()
        ));
    }
}

/// Read URLs from a text file, one per line; blank lines and `#` comments
/// are skipped.
fn read_url_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect())
}

impl Command for FetchCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let output_dir = self.output_dir();
        std::fs::create_dir_all(&output_dir)?;

        // Resolve tools with the environment activated, so the bootstrapped
        // yt-dlp wins over any system install.
        let venv = VirtualEnv::at(&self.project_root);
        if venv.exists() {
            venv.activate();
        }

        let ytdlp = YtDlp::locate()?;
        let ffmpeg = Embedder::locate().ok();
        if ffmpeg.is_none() {
            ui.warning("ffmpeg not found; tracks will not be tagged");
        }

        let mut log = FailureLog::new(self.project_root.join(FAILURE_LOG_NAME));
        let mut successes = 0;
        let mut failures = 0;

        let urls = self.gather_urls()?;

        if urls.is_empty() && self.args.retry {
            ui.message("No failed downloads recorded, nothing to retry.");
            return Ok(CommandResult::success());
        }

        if urls.is_empty() && self.args.file.is_some() {
            ui.message("URL file contains no URLs.");
            return Ok(CommandResult::success());
        }

        if !urls.is_empty() {
            for url in &urls {
                let (ok, bad) = self.process_url(&ytdlp, ffmpeg.as_ref(), url, &mut log, ui);
                successes += ok;
                failures += bad;
            }
        } else if ui.is_interactive() {
            // Paste-URLs-until-done loop.
            ui.show_header("warble fetch");
            ui.message(&format!("Downloading to: {}", output_dir.display()));
            ui.show_hint("Paste YouTube Music URLs. Type 'exit' to quit.");

            loop {
                let prompt = Prompt::input("url", "URL");
                let answer = match ui.prompt(&prompt) {
                    Ok(result) => result.as_string(),
                    Err(_) => break,
                };
                let trimmed = answer.trim();

                if trimmed.is_empty() {
                    continue;
                }
                if matches!(trimmed.to_lowercase().as_str(), "exit" | "quit" | "q") {
                    break;
                }

                let (ok, bad) = self.process_url(&ytdlp, ffmpeg.as_ref(), trimmed, &mut log, ui);
                successes += ok;
                failures += bad;
            }
        } else {
            return Err(WarbleError::Other(anyhow::anyhow!(
                "no URL given; pass a URL, --file, or --retry"
            )));
        }

        self.summarize(&log, ui);

        if failures > 0 || (successes == 0 && !urls.is_empty()) {
            Ok(CommandResult::failure(1))
        } else {
            Ok(CommandResult::success())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn url_file_skips_comments_and_blanks() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("urls.txt");
        fs::write(
            &file,
            "# my list\nhttps://a\n\n  https://b  \n# trailing comment\n",
        )
        .unwrap();

        let urls = read_url_file(&file).unwrap();
        assert_eq!(urls, vec!["https://a", "https://b"]);
    }

    #[test]
    fn url_file_missing_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(read_url_file(&temp.path().join("nope.txt")).is_err());
    }

    #[test]
    fn output_dir_defaults_under_project_root() {
        let temp = TempDir::new().unwrap();
        let cmd = FetchCommand::new(temp.path(), FetchArgs::default());
        assert_eq!(cmd.output_dir(), temp.path().join(DOWNLOAD_DIR_NAME));
    }

    #[test]
    fn output_dir_override_wins() {
        let temp = TempDir::new().unwrap();
        let cmd = FetchCommand::new(
            temp.path(),
            FetchArgs {
                output: Some(PathBuf::from("/music")),
                ..Default::default()
            },
        );
        assert_eq!(cmd.output_dir(), PathBuf::from("/music"));
    }

    #[test]
    fn gather_urls_prefers_retry_log() {
        let temp = TempDir::new().unwrap();
        let mut log = FailureLog::new(temp.path().join(FAILURE_LOG_NAME));
        log.record("https://failed", "T", "A", "err").unwrap();

        let cmd = FetchCommand::new(
            temp.path(),
            FetchArgs {
                retry: true,
                ..Default::default()
            },
        );
        assert_eq!(cmd.gather_urls().unwrap(), vec!["https://failed"]);
    }

    #[test]
    fn gather_urls_with_no_log_is_empty() {
        let temp = TempDir::new().unwrap();
        let cmd = FetchCommand::new(
            temp.path(),
            FetchArgs {
                retry: true,
                ..Default::default()
            },
        );
        assert!(cmd.gather_urls().unwrap().is_empty());
    }

    #[test]
    fn track_outcome_success_includes_existing() {
        assert!(TrackOutcome::Downloaded.is_success());
        assert!(TrackOutcome::AlreadyExists.is_success());
        assert!(!TrackOutcome::Failed.is_success());
    }
}
