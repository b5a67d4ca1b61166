//! Folder enumeration and track/image matching.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Image extensions eligible for cover embedding.
pub const COVER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// All image extensions the cleaner recognizes.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp", "tiff"];

/// The contents of a music folder, split by kind.
#[derive(Debug, Clone)]
pub struct FolderScan {
    folder: PathBuf,
    opus_files: Vec<PathBuf>,
    image_files: Vec<PathBuf>,
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_lowercase();
            extensions.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

fn stem_lower(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase()
}

impl FolderScan {
    /// Scan a folder, collecting `.opus` files and image files.
    ///
    /// Subdirectories are not descended into; downloads are flat per folder.
    pub fn read(folder: &Path) -> Result<Self> {
        let mut opus_files = Vec::new();
        let mut image_files = Vec::new();

        for entry in std::fs::read_dir(folder)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            if has_extension(&path, &["opus"]) {
                opus_files.push(path);
            } else if has_extension(&path, IMAGE_EXTENSIONS) {
                image_files.push(path);
            }
        }

        opus_files.sort();
        image_files.sort();

        Ok(Self {
            folder: folder.to_path_buf(),
            opus_files,
            image_files,
        })
    }

    /// The scanned folder.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// All `.opus` files, sorted by name.
    pub fn opus_files(&self) -> &[PathBuf] {
        &self.opus_files
    }

    /// All image files, sorted by name.
    pub fn image_files(&self) -> &[PathBuf] {
        &self.image_files
    }

    /// Whether an image matches some track by stem.
    ///
    /// Matching is case-insensitive and accepts substring containment in
    /// either direction, so "Song Title" matches "Song Title (Official)".
    pub fn image_matches_track(&self, image: &Path) -> Option<&PathBuf> {
        let image_stem = stem_lower(image);
        if image_stem.is_empty() {
            return None;
        }

        self.opus_files.iter().find(|opus| {
            let opus_stem = stem_lower(opus);
            !opus_stem.is_empty()
                && (opus_stem.contains(&image_stem) || image_stem.contains(&opus_stem))
        })
    }

    /// Split images into (matching, orphaned) by track stem.
    pub fn partition_images(&self) -> (Vec<&PathBuf>, Vec<&PathBuf>) {
        self.image_files
            .iter()
            .partition(|img| self.image_matches_track(img).is_some())
    }
}
