//! External process execution.
//!
//! warble only ever runs known tools (`python`, `yt-dlp`, `ffmpeg`), so
//! everything here is argv-based: no intermediate shell, no quoting rules.

pub mod command;

pub use command::{
    execute, execute_check, execute_quiet, execute_streaming, CommandOptions, CommandResult,
    OutputCallback, OutputLine,
};

/// Check if running in a CI environment.
///
/// Used to auto-detect CI and force non-interactive mode in `main()`,
/// and to suppress noisy progress bars in
/// [`NonInteractiveUI`](crate::ui::NonInteractiveUI). Checks common CI
/// environment variables: `CI`, `GITHUB_ACTIONS`, `GITLAB_CI`, `CIRCLECI`,
/// `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
}

/// Block until the user presses Enter.
///
/// Used after the setup completion banner so a console window opened by
/// double-clicking stays readable.
pub fn wait_for_enter() {
    use std::io::BufRead;
    let stdin = std::io::stdin();
    let mut line = String::new();
    let _ = stdin.lock().read_line(&mut line);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_ci_does_not_panic() {
        let _ = is_ci();
    }
}
