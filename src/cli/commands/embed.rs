//! The `embed` command: put cover art into Opus files.
//!
//! Works on a whole folder (matching covers to tracks by stem) or a single
//! file, optionally with an explicit cover image.

use std::path::{Path, PathBuf};

use crate::cli::args::EmbedArgs;
use crate::embed::{find_cover_for_track, EmbedSummary, Embedder};
use crate::error::{Result, WarbleError};
use crate::library::FolderScan;
use crate::ui::UserInterface;

use super::{Command, CommandResult};

/// Embeds cover art via ffmpeg.
pub struct EmbedCommand {
    project_root: PathBuf,
    args: EmbedArgs,
}

impl EmbedCommand {
    /// Create a new embed command.
    pub fn new(project_root: &Path, args: EmbedArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }

    fn target_folder(&self) -> PathBuf {
        self.args
            .folder
            .clone()
            .unwrap_or_else(|| self.project_root.clone())
    }

    /// Embed one track's cover. Returns whether a cover was found at all.
    fn embed_one(
        &self,
        embedder: &Embedder,
        track: &Path,
        explicit_cover: Option<&Path>,
        summary: &mut EmbedSummary,
        ui: &mut dyn UserInterface,
    ) {
        let cover = match explicit_cover {
            Some(c) => Some(c.to_path_buf()),
            None => find_cover_for_track(track),
        };

        let Some(cover) = cover else {
            ui.warning(&format!(
                "No cover art found for {}",
                track.file_name().unwrap_or_default().to_string_lossy()
            ));
            summary.skipped += 1;
            return;
        };

        let mut spinner = ui.start_spinner(&format!(
            "Embedding {} → {}",
            cover.file_name().unwrap_or_default().to_string_lossy(),
            track.file_name().unwrap_or_default().to_string_lossy()
        ));

        match embedder.embed_cover(track, &cover) {
            Ok(()) => {
                spinner.finish_success(&format!(
                    "Embedded cover → {}",
                    track.file_name().unwrap_or_default().to_string_lossy()
                ));
                summary.processed += 1;
            }
            Err(e) => {
                spinner.finish_error(&format!(
                    "Failed: {}",
                    track.file_name().unwrap_or_default().to_string_lossy()
                ));
                tracing::debug!("embed failed: {}", e);
                summary.failed += 1;
            }
        }
    }
}

impl Command for EmbedCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let embedder = Embedder::locate()?;
        let mut summary = EmbedSummary::default();

        if let Some(track) = &self.args.track {
            let is_opus = track
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("opus"))
                .unwrap_or(false);
            if !track.is_file() || !is_opus {
                return Err(WarbleError::Other(anyhow::anyhow!(
                    "not an Opus file: {}",
                    track.display()
                )));
            }
            if let Some(cover) = &self.args.cover {
                if !cover.is_file() {
                    return Err(WarbleError::Other(anyhow::anyhow!(
                        "cover image not found: {}",
                        cover.display()
                    )));
                }
            }

            self.embed_one(
                &embedder,
                track,
                self.args.cover.as_deref(),
                &mut summary,
                ui,
            );
        } else {
            let folder = self.target_folder();
            let scan = FolderScan::read(&folder)?;

            if scan.opus_files().is_empty() {
                ui.message(&format!("No .opus files found in {}", folder.display()));
                return Ok(CommandResult::success());
            }

            ui.message(&format!(
                "Found {} .opus files, searching for matching cover art...",
                scan.opus_files().len()
            ));

            for track in scan.opus_files() {
                self.embed_one(&embedder, track, None, &mut summary, ui);
            }
        }

        ui.message(&format!(
            "Done: {} embedded, {} skipped (no cover), {} failed",
            summary.processed, summary.skipped, summary.failed
        ));
        if summary.skipped > 0 {
            ui.show_hint("Covers are matched by file stem: 'Song Title.opus' → 'Song Title.jpg'");
        }

        if summary.is_success() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}
