//! Python interpreter discovery.
//!
//! The bootstrapper must not touch the filesystem until it knows a usable
//! interpreter exists, so resolution happens in two stages: find a candidate
//! binary by walking PATH entries directly, then confirm it actually answers
//! `--version`. Resolution does NOT use the `which` command; `which`
//! behavior varies across systems and is sometimes a shell builtin with
//! inconsistent error handling.

use std::path::{Path, PathBuf};

use crate::error::{Result, WarbleError};
use crate::shell;

/// Candidate binary names, in preference order. `py` is the Windows
/// launcher and only probed there.
#[cfg(not(windows))]
const CANDIDATES: &[&str] = &["python3", "python"];
#[cfg(windows)]
const CANDIDATES: &[&str] = &["python3.exe", "python.exe", "py.exe"];

/// A resolved Python interpreter.
#[derive(Debug, Clone)]
pub struct Interpreter {
    /// Absolute path to the binary.
    pub path: PathBuf,
    /// Version string parsed from `--version` output (e.g., "3.12.1").
    pub version: Option<String>,
}

impl Interpreter {
    /// Display form: "3.12.1" or "unknown version".
    pub fn version_label(&self) -> &str {
        self.version.as_deref().unwrap_or("unknown version")
    }
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// Resolve a tool's binary path by iterating over PATH entries.
///
/// Returns the first match that exists and is executable.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    for dir in path_entries {
        let candidate = dir.join(tool);
        if candidate.is_file() && is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Extract a version number from interpreter or tool output.
pub fn extract_version(output: &str) -> Option<String> {
    let patterns = [r"(\d+\.\d+\.\d+)", r"version\s+(\d+\.\d+)", r"(\d+\.\d+)"];

    for pattern in &patterns {
        if let Ok(re) = regex::Regex::new(pattern) {
            if let Some(caps) = re.captures(output) {
                if let Some(m) = caps.get(1) {
                    return Some(m.as_str().to_string());
                }
            }
        }
    }

    None
}

/// Probe a binary with `--version` and build an [`Interpreter`] on success.
fn probe(path: &Path) -> Option<Interpreter> {
    let result = shell::command::execute_quiet(path, crate::argv!["--version"]).ok()?;
    if !result.success {
        return None;
    }

    // Python 2 prints the version to stderr; accept either stream.
    let combined = format!("{}{}", result.stdout, result.stderr);
    Some(Interpreter {
        path: path.to_path_buf(),
        version: extract_version(&combined),
    })
}

/// Find a Python interpreter on the given PATH entries.
///
/// Tries each candidate name in preference order and returns the first
/// binary that both resolves and answers `--version`.
pub fn find_interpreter_in(path_entries: &[PathBuf]) -> Option<Interpreter> {
    for name in CANDIDATES {
        if let Some(path) = resolve_tool_path(name, path_entries) {
            if let Some(interp) = probe(&path) {
                return Some(interp);
            }
        }
    }
    None
}

/// Find a Python interpreter on the system PATH.
///
/// Returns [`WarbleError::RuntimeMissing`] with a per-platform install hint
/// when nothing usable is found.
pub fn find_interpreter() -> Result<Interpreter> {
    find_interpreter_in(&parse_system_path()).ok_or_else(|| WarbleError::RuntimeMissing {
        message: format!(
            "checked {} on PATH. {}",
            CANDIDATES.join(", "),
            install_hint()
        ),
    })
}

/// Per-platform install instruction for the error message.
fn install_hint() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install python3"
    } else if cfg!(target_os = "windows") {
        "Install from https://www.python.org/downloads/"
    } else {
        "Install with your package manager, e.g.: sudo apt install python3"
    }
}
