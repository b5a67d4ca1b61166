//! Integration tests for the library's public API.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use warble::embed::find_cover_for_track;
use warble::fetch::{
    classify_url, safe_filename, safe_folder_name, FailureLog, TrackMetadata, UrlKind,
    FAILURE_LOG_NAME,
};
use warble::library::FolderScan;
use warble::python::{VirtualEnv, PACKAGES};

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"x").unwrap();
    path
}

#[test]
fn package_set_is_fixed_and_ordered() {
    let names: Vec<&str> = PACKAGES.iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["yt-dlp", "ffmpeg-python", "mutagen", "Pillow"]);
}

#[test]
fn venv_layout_is_stable() {
    let env = VirtualEnv::at(Path::new("/music/project"));
    assert_eq!(env.root(), Path::new("/music/project/venv"));
    assert!(env.python().starts_with(env.root()));
}

#[test]
fn filenames_survive_hostile_titles() {
    assert_eq!(
        safe_filename("AC/DC: Back In Black?"),
        "AC_DC_ Back In Black_.opus"
    );
    assert_eq!(safe_folder_name("Mix | 2024"), "Mix _ 2024");
}

#[test]
fn url_classification_covers_the_workflow() {
    assert_eq!(
        classify_url("https://music.youtube.com/watch?v=abc"),
        Some(UrlKind::Track)
    );
    assert_eq!(
        classify_url("https://music.youtube.com/playlist?list=PL1"),
        Some(UrlKind::Playlist)
    );
    assert_eq!(
        classify_url("https://music.youtube.com/browse/album/MPRE1"),
        Some(UrlKind::Album)
    );
    assert_eq!(classify_url("https://soundcloud.com/x"), None);
}

#[test]
fn metadata_fallback_chain_matches_youtube_music_shape() {
    // A plain YouTube upload: no artist/album fields at all.
    let meta = TrackMetadata::from_json(
        r#"{"id": "v1", "title": "Demo", "uploader": "Channel", "playlist": "Mix"}"#,
    )
    .unwrap();
    assert_eq!(meta.artist(), "Channel");
    assert_eq!(meta.album(), "Mix");

    // A YouTube Music track: explicit fields win.
    let meta = TrackMetadata::from_json(
        r#"{"id": "v2", "title": "Demo", "artist": "Real Artist", "uploader": "Channel",
            "album": "Real Album", "playlist": "Mix"}"#,
    )
    .unwrap();
    assert_eq!(meta.artist(), "Real Artist");
    assert_eq!(meta.album(), "Real Album");
}

#[test]
fn failure_log_round_trips_urls_for_retry() {
    let temp = TempDir::new().unwrap();
    let log_path = temp.path().join(FAILURE_LOG_NAME);

    let mut log = FailureLog::new(log_path.clone());
    log.record("https://a", "Track A", "Artist", "timeout").unwrap();
    log.record("https://b", "Track B", "Artist", "unavailable")
        .unwrap();
    log.record("https://a", "Track A", "Artist", "timeout again")
        .unwrap();

    let urls = FailureLog::recorded_urls(&log_path).unwrap();
    assert_eq!(urls, vec!["https://a", "https://b"]);
}

#[test]
fn cover_resolution_prefers_same_stem_then_convention() {
    let temp = TempDir::new().unwrap();
    let track = touch(temp.path(), "Song.opus");

    // Nothing yet
    assert_eq!(find_cover_for_track(&track), None);

    // An arbitrary image is the last resort
    let stray = touch(temp.path(), "zz-art.png");
    assert_eq!(find_cover_for_track(&track), Some(stray.clone()));

    // A conventional name beats it
    let cover = touch(temp.path(), "cover.jpg");
    assert_eq!(find_cover_for_track(&track), Some(cover));

    // A same-stem image beats everything
    let same = touch(temp.path(), "Song.jpg");
    assert_eq!(find_cover_for_track(&track), Some(same));
}

#[test]
fn folder_scan_matching_is_bidirectional_substring() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "Song Title (Official Video).opus");
    touch(temp.path(), "song title.jpg");
    touch(temp.path(), "holiday.png");

    let scan = FolderScan::read(temp.path()).unwrap();
    let (matching, orphaned) = scan.partition_images();

    assert_eq!(matching.len(), 1);
    assert_eq!(orphaned.len(), 1);
    assert!(matching[0].ends_with("song title.jpg"));
    assert!(orphaned[0].ends_with("holiday.png"));
}
