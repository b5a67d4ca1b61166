//! Safe file and folder names for downloaded tracks.
//!
//! Track titles come straight from YouTube metadata and routinely contain
//! characters that are invalid on some filesystem. The rules here apply on
//! every platform so a library synced between machines keeps its names.

/// Characters rejected by at least one supported filesystem.
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Max length for a track filename stem, before the extension.
const MAX_FILE_STEM: usize = 100;

/// Max length for a playlist/album folder name.
const MAX_FOLDER_NAME: usize = 150;

fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if INVALID_CHARS.contains(&c) { '_' } else { c })
        .filter(|c| !c.is_control())
        .collect();

    // Collapse whitespace runs into single spaces
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let kept: String = name.chars().take(max).collect();
    format!("{}...", kept.trim_end())
}

/// Build a safe `.opus` filename from a track title.
///
/// Titles only, no track numbers; an empty or unknown title gets a fixed
/// fallback name.
pub fn safe_filename(title: &str) -> String {
    let cleaned = sanitize(title);
    if cleaned.is_empty() || cleaned == "Unknown" {
        return "unknown_track.opus".to_string();
    }

    format!("{}.opus", truncate(&cleaned, MAX_FILE_STEM))
}

/// Build a safe folder name from a playlist or album title.
pub fn safe_folder_name(name: &str) -> String {
    let cleaned = sanitize(name);
    if cleaned.is_empty() || cleaned == "Unknown" {
        return "Unknown Folder".to_string();
    }

    truncate(&cleaned, MAX_FOLDER_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_title_passes_through() {
        assert_eq!(safe_filename("Normal Title"), "Normal Title.opus");
    }

    #[test]
    fn invalid_characters_become_underscores() {
        assert_eq!(
            safe_filename("Title/With:Special*Chars?"),
            "Title_With_Special_Chars_.opus"
        );
    }

    #[test]
    fn control_characters_are_dropped() {
        assert_eq!(safe_filename("Ti\x00tle\x1f"), "Title.opus");
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(safe_filename("  A   B \t C  "), "A B C.opus");
    }

    #[test]
    fn empty_title_gets_fallback() {
        assert_eq!(safe_filename(""), "unknown_track.opus");
        assert_eq!(safe_filename("   "), "unknown_track.opus");
        assert_eq!(safe_filename("Unknown"), "unknown_track.opus");
    }

    #[test]
    fn long_titles_are_truncated() {
        let long = "x".repeat(300);
        let name = safe_filename(&long);
        // 100 chars + "..." + ".opus"
        assert_eq!(name.len(), 100 + 3 + 5);
        assert!(name.ends_with("....opus"));
    }

    #[test]
    fn unicode_titles_survive() {
        assert_eq!(safe_filename("café ノート"), "café ノート.opus");
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let long = "ü".repeat(120);
        let name = safe_filename(&long);
        assert!(name.starts_with(&"ü".repeat(100)));
        assert!(name.ends_with("....opus"));
    }

    #[test]
    fn folder_names_follow_same_rules() {
        assert_eq!(safe_folder_name("My: Playlist"), "My_ Playlist");
        assert_eq!(safe_folder_name(""), "Unknown Folder");
    }

    #[test]
    fn folder_truncation_is_longer_than_files() {
        let long = "y".repeat(300);
        let name = safe_folder_name(&long);
        assert_eq!(name.len(), 150 + 3);
    }
}
