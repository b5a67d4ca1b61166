//! The `clean` command: delete leftover cover images.
//!
//! After embedding, the loose image files next to the tracks are noise.
//! The default mode only deletes an image when a matching `.opus` file
//! exists; `--all` removes every image; `--dry-run` previews either mode
//! without touching anything. Deletion always goes through a confirmation
//! unless `--yes`.

use std::path::{Path, PathBuf};

use crate::cli::args::CleanArgs;
use crate::error::Result;
use crate::library::FolderScan;
use crate::ui::{Prompt, UserInterface};

use super::{Command, CommandResult};

/// Deletes embedded-and-done cover images.
pub struct CleanCommand {
    project_root: PathBuf,
    args: CleanArgs,
}

impl CleanCommand {
    /// Create a new clean command.
    pub fn new(project_root: &Path, args: CleanArgs) -> Self {
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

    /// The images this invocation would delete.
    fn candidates<'a>(&self, scan: &'a FolderScan) -> Vec<&'a PathBuf> {
        if self.args.all {
            scan.image_files().iter().collect()
        } else {
            let (matching, _) = scan.partition_images();
            matching
        }
    }
}

impl Command for CleanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let folder = self.target_folder();
        let scan = FolderScan::read(&folder)?;

        ui.message(&format!(
            "Found {} .opus files and {} image files in {}",
            scan.opus_files().len(),
            scan.image_files().len(),
            folder.display()
        ));

        if scan.image_files().is_empty() {
            ui.message("No image files to delete.");
            return Ok(CommandResult::success());
        }

        let candidates = self.candidates(&scan);
        let (_, orphaned) = scan.partition_images();

        if self.args.dry_run {
            ui.message("Dry run, nothing will be deleted.");
            for img in &candidates {
                ui.message(&format!(
                    "  would delete: {}",
                    img.file_name().unwrap_or_default().to_string_lossy()
                ));
            }
            if !self.args.all {
                for img in &orphaned {
                    ui.message(&format!(
                        "  would keep (no matching .opus): {}",
                        img.file_name().unwrap_or_default().to_string_lossy()
                    ));
                }
            }
            ui.message(&format!("{} image(s) would be deleted.", candidates.len()));
            return Ok(CommandResult::success());
        }

        if candidates.is_empty() {
            ui.message("No images match a downloaded track; nothing to delete.");
            return Ok(CommandResult::success());
        }

        for img in &candidates {
            ui.message(&format!(
                "  {}",
                img.file_name().unwrap_or_default().to_string_lossy()
            ));
        }

        if !self.args.yes {
            let question = format!("Delete these {} image file(s)?", candidates.len());
            let prompt = Prompt::confirm("confirm_delete", &question, false);
            let confirmed = ui.prompt(&prompt)?.as_bool().unwrap_or(false);
            if !confirmed {
                ui.message("Deletion cancelled.");
                return Ok(CommandResult::success());
            }
        }

        let mut deleted = 0usize;
        let mut errors = 0usize;
        for img in &candidates {
            match std::fs::remove_file(img) {
                Ok(()) => {
                    ui.success(&format!(
                        "Deleted {}",
                        img.file_name().unwrap_or_default().to_string_lossy()
                    ));
                    deleted += 1;
                }
                Err(e) => {
                    ui.error(&format!("Could not delete {}: {}", img.display(), e));
                    errors += 1;
                }
            }
        }

        ui.message(&format!("Cleanup done: {} deleted, {} errors", deleted, errors));

        if errors == 0 {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"x").unwrap();
        path
    }

    fn clean_cmd(root: &Path, args: CleanArgs) -> CleanCommand {
        CleanCommand::new(
            root,
            CleanArgs {
                folder: Some(root.to_path_buf()),
                ..args
            },
        )
    }

    #[test]
    fn dry_run_deletes_nothing() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Song.opus");
        let img = touch(temp.path(), "Song.jpg");

        let cmd = clean_cmd(
            temp.path(),
            CleanArgs {
                dry_run: true,
                ..Default::default()
            },
        );
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(img.exists());
        assert!(ui.has_message("would delete: Song.jpg"));
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn matching_mode_keeps_orphan_images() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Song.opus");
        let matching = touch(temp.path(), "Song.jpg");
        let orphan = touch(temp.path(), "vacation photo.png");

        let cmd = clean_cmd(
            temp.path(),
            CleanArgs {
                yes: true,
                ..Default::default()
            },
        );
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(!matching.exists());
        assert!(orphan.exists());
    }

    #[test]
    fn all_mode_deletes_every_image() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Song.opus");
        let matching = touch(temp.path(), "Song.jpg");
        let orphan = touch(temp.path(), "vacation photo.png");

        let cmd = clean_cmd(
            temp.path(),
            CleanArgs {
                all: true,
                yes: true,
                ..Default::default()
            },
        );
        let mut ui = MockUI::new();
        cmd.execute(&mut ui).unwrap();

        assert!(!matching.exists());
        assert!(!orphan.exists());
    }

    #[test]
    fn declined_confirmation_cancels() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Song.opus");
        let img = touch(temp.path(), "Song.jpg");

        let cmd = clean_cmd(temp.path(), CleanArgs::default());
        let mut ui = MockUI::new();
        ui.set_prompt_response("confirm_delete", "false");

        let result = cmd.execute(&mut ui).unwrap();
        assert!(result.success);
        assert!(img.exists());
        assert!(ui.has_message("Deletion cancelled"));
    }

    #[test]
    fn accepted_confirmation_deletes() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Song.opus");
        let img = touch(temp.path(), "Song.jpg");

        let cmd = clean_cmd(temp.path(), CleanArgs::default());
        let mut ui = MockUI::new();
        ui.set_prompt_response("confirm_delete", "yes");

        cmd.execute(&mut ui).unwrap();
        assert!(!img.exists());
    }

    #[test]
    fn empty_folder_is_noop() {
        let temp = TempDir::new().unwrap();
        let cmd = clean_cmd(temp.path(), CleanArgs::default());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();
        assert!(result.success);
        assert!(ui.has_message("No image files"));
    }

    #[test]
    fn tracks_never_deleted() {
        let temp = TempDir::new().unwrap();
        let opus = touch(temp.path(), "Song.opus");
        touch(temp.path(), "Song.jpg");

        let cmd = clean_cmd(
            temp.path(),
            CleanArgs {
                all: true,
                yes: true,
                ..Default::default()
            },
        );
        let mut ui = MockUI::new();
        cmd.execute(&mut ui).unwrap();

        assert!(opus.exists());
    }
}
