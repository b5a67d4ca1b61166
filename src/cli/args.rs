//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// warble - YouTube Music to Opus workflow.
#[derive(Debug, Parser)]
#[command(name = "warble")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub dir: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Bootstrap the Python environment (default if no command specified)
    Setup(SetupArgs),

    /// Show the health of the bootstrapped environment
    Status(StatusArgs),

    /// Download tracks, playlists, or albums as Opus files
    Fetch(FetchArgs),

    /// Embed cover art into downloaded Opus files
    Embed(EmbedArgs),

    /// Delete leftover cover images after embedding
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `setup` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SetupArgs {
    /// Remove and recreate an existing environment
    #[arg(long)]
    pub force: bool,

    /// Wait for a keypress after completion (for double-clicked consoles)
    #[arg(long)]
    pub pause: bool,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `fetch` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FetchArgs {
    /// YouTube Music URL (track, playlist, or album)
    pub url: Option<String>,

    /// Text file with one URL per line ('#' lines are skipped)
    #[arg(short, long, conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// Retry every URL recorded in the failure log
    #[arg(short, long, conflicts_with_all = ["url", "file"])]
    pub retry: bool,

    /// Download directory (default: "YouTube Music Downloads")
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `embed` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct EmbedArgs {
    /// Folder of Opus files to process (default: current directory)
    pub folder: Option<PathBuf>,

    /// Process a single Opus file instead of a folder
    #[arg(short, long, conflicts_with = "folder")]
    pub track: Option<PathBuf>,

    /// Use a specific cover image instead of searching for one
    #[arg(short, long, requires = "track")]
    pub cover: Option<PathBuf>,
}

/// Arguments for the `clean` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CleanArgs {
    /// Folder to clean (default: current directory)
    pub folder: Option<PathBuf>,

    /// Delete every image, not just those matching an Opus file
    #[arg(long)]
    pub all: bool,

    /// Show what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_has_no_subcommand() {
        let cli = Cli::parse_from(["warble"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn fetch_url_is_positional() {
        let cli = Cli::parse_from(["warble", "fetch", "https://music.youtube.com/watch?v=x"]);
        match cli.command {
            Some(Commands::Fetch(args)) => {
                assert_eq!(args.url.as_deref(), Some("https://music.youtube.com/watch?v=x"));
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn fetch_url_and_file_conflict() {
        let result = Cli::try_parse_from(["warble", "fetch", "https://u", "--file", "urls.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn fetch_retry_conflicts_with_url() {
        let result = Cli::try_parse_from(["warble", "fetch", "https://u", "--retry"]);
        assert!(result.is_err());
    }

    #[test]
    fn embed_cover_requires_track() {
        let result = Cli::try_parse_from(["warble", "embed", "--cover", "art.jpg"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "warble", "embed", "--track", "song.opus", "--cover", "art.jpg",
        ]);
        assert!(result.is_ok());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["warble", "setup", "--quiet", "--debug"]);
        assert!(cli.quiet);
        assert!(cli.debug);
    }
}
