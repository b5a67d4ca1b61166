//! Track metadata from yt-dlp and tag application via ffmpeg.

use std::ffi::OsString;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, WarbleError};
use crate::shell;

/// Metadata for one track, deserialized from `yt-dlp --dump-json` output.
///
/// YouTube Music entries carry proper `artist`/`album` fields; plain
/// YouTube uploads usually don't, so [`TrackMetadata::artist`] and
/// [`TrackMetadata::album`] fall back to the uploader and the containing
/// playlist respectively.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackMetadata {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    album: Option<String>,
    #[serde(default)]
    playlist: Option<String>,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub release_year: Option<u32>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl TrackMetadata {
    /// Parse from a `--dump-json` line.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| WarbleError::MetadataParse {
            message: e.to_string(),
        })
    }

    /// Title with a fixed fallback.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("Unknown Title")
    }

    /// Artist, falling back to the uploader.
    pub fn artist(&self) -> &str {
        self.artist
            .as_deref()
            .or(self.uploader.as_deref())
            .unwrap_or("Unknown Artist")
    }

    /// Album, falling back to the containing playlist.
    pub fn album(&self) -> &str {
        self.album
            .as_deref()
            .or(self.playlist.as_deref())
            .unwrap_or("Unknown Album")
    }

    /// Release date for tagging: prefer the year, else the full date.
    fn date_tag(&self) -> Option<String> {
        if let Some(year) = self.release_year {
            return Some(year.to_string());
        }
        self.release_date.clone()
    }

    /// Build the ffmpeg `-metadata key=value` argument pairs for this track.
    pub fn tag_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        let mut push = |key: &str, value: &str| {
            args.push("-metadata".into());
            args.push(format!("{}={}", key, value).into());
        };

        push("title", self.title());
        push("artist", self.artist());
        push("album", self.album());

        if let Some(track) = self.track_number {
            push("track", &track.to_string());
        }
        if let Some(date) = self.date_tag() {
            push("date", &date);
        }
        if let Some(genre) = &self.genre {
            push("genre", genre);
        }

        args
    }
}

/// Write this track's tags into an Opus file in place.
///
/// ffmpeg cannot edit a container in place, so tags are written to a
/// sibling temp file that replaces the original on success. The audio
/// stream is copied, never re-encoded.
pub fn apply_tags(ffmpeg: &Path, opus_file: &Path, metadata: &TrackMetadata) -> Result<()> {
    let temp_file = opus_file.with_extension("temp.opus");

    let mut args: Vec<OsString> = vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        opus_file.as_os_str().to_os_string(),
        "-c".into(),
        "copy".into(),
        "-map_metadata".into(),
        "0".into(),
    ];
    args.extend(metadata.tag_args());
    args.push("-y".into());
    args.push(temp_file.as_os_str().to_os_string());

    let arg_refs: Vec<&std::ffi::OsStr> = args.iter().map(|a| a.as_os_str()).collect();
    let result = shell::execute_quiet(ffmpeg, &arg_refs)?;

    if result.success && temp_file.is_file() {
        std::fs::rename(&temp_file, opus_file)?;
        Ok(())
    } else {
        if temp_file.exists() {
            let _ = std::fs::remove_file(&temp_file);
        }
        Err(WarbleError::CommandFailed {
            command: format!("{} -i {} ...", ffmpeg.display(), opus_file.display()),
            code: result.exit_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_metadata() {
        let json = r#"{
            "id": "abc123",
            "title": "Song Title",
            "artist": "The Artist",
            "album": "The Album",
            "track_number": 3,
            "release_year": 2021,
            "genre": "Electronic"
        }"#;

        let meta = TrackMetadata::from_json(json).unwrap();
        assert_eq!(meta.id, "abc123");
        assert_eq!(meta.title(), "Song Title");
        assert_eq!(meta.artist(), "The Artist");
        assert_eq!(meta.album(), "The Album");
        assert_eq!(meta.track_number, Some(3));
    }

    #[test]
    fn ignores_unknown_fields() {
        let json = r#"{"id": "x", "title": "T", "formats": [{"url": "u"}]}"#;
        assert!(TrackMetadata::from_json(json).is_ok());
    }

    #[test]
    fn artist_falls_back_to_uploader() {
        let json = r#"{"id": "x", "title": "T", "uploader": "Some Channel"}"#;
        let meta = TrackMetadata::from_json(json).unwrap();
        assert_eq!(meta.artist(), "Some Channel");
    }

    #[test]
    fn album_falls_back_to_playlist() {
        let json = r#"{"id": "x", "title": "T", "playlist": "Liked Songs"}"#;
        let meta = TrackMetadata::from_json(json).unwrap();
        assert_eq!(meta.album(), "Liked Songs");
    }

    #[test]
    fn missing_everything_uses_unknowns() {
        let meta = TrackMetadata::from_json("{}").unwrap();
        assert_eq!(meta.title(), "Unknown Title");
        assert_eq!(meta.artist(), "Unknown Artist");
        assert_eq!(meta.album(), "Unknown Album");
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = TrackMetadata::from_json("not json").unwrap_err();
        assert!(matches!(err, WarbleError::MetadataParse { .. }));
    }

    #[test]
    fn tag_args_always_include_title_artist_album() {
        let meta = TrackMetadata::from_json("{}").unwrap();
        let args = meta.tag_args();
        let rendered: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();

        assert!(rendered.contains(&"title=Unknown Title".to_string()));
        assert!(rendered.contains(&"artist=Unknown Artist".to_string()));
        assert!(rendered.contains(&"album=Unknown Album".to_string()));
    }

    #[test]
    fn tag_args_prefer_release_year_over_date() {
        let json = r#"{"release_year": 2020, "release_date": "20200415"}"#;
        let meta = TrackMetadata::from_json(json).unwrap();
        let rendered: Vec<String> = meta
            .tag_args()
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();

        assert!(rendered.contains(&"date=2020".to_string()));
        assert!(!rendered.contains(&"date=20200415".to_string()));
    }

    #[test]
    fn tag_args_skip_absent_optionals() {
        let meta = TrackMetadata::from_json("{}").unwrap();
        let rendered: Vec<String> = meta
            .tag_args()
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();

        assert!(!rendered.iter().any(|a| a.starts_with("track=")));
        assert!(!rendered.iter().any(|a| a.starts_with("genre=")));
        assert!(!rendered.iter().any(|a| a.starts_with("date=")));
    }
}
