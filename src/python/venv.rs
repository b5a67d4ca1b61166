//! The isolated environment handle.
//!
//! A [`VirtualEnv`] names a directory that holds a private interpreter and
//! package set, created by `python -m venv`. The handle itself never deletes
//! the directory except under an explicit `--force` recreate; the user owns
//! its lifetime otherwise.

use std::path::{Path, PathBuf};

use crate::error::{Result, WarbleError};
use crate::shell::{self, CommandOptions};

/// Directory name of the environment, relative to the project root.
pub const VENV_DIR_NAME: &str = "venv";

/// Handle to a (possibly not-yet-created) virtual environment.
#[derive(Debug, Clone)]
pub struct VirtualEnv {
    root: PathBuf,
}

impl VirtualEnv {
    /// Handle for the environment under the given project root.
    pub fn at(project_root: &Path) -> Self {
        Self {
            root: project_root.join(VENV_DIR_NAME),
        }
    }

    /// The environment directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory holding the environment's executables.
    ///
    /// `bin` on Unix, `Scripts` on Windows.
    pub fn scripts_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.root.join("Scripts")
        } else {
            self.root.join("bin")
        }
    }

    /// Path to the environment's private interpreter.
    pub fn python(&self) -> PathBuf {
        let name = if cfg!(windows) { "python.exe" } else { "python" };
        self.scripts_dir().join(name)
    }

    /// Whether a valid environment exists here.
    ///
    /// `pyvenv.cfg` is written by `python -m venv` and marks the directory
    /// as an environment rather than an unrelated `venv/` folder.
    pub fn exists(&self) -> bool {
        self.root.join("pyvenv.cfg").is_file()
    }

    /// Create the environment using the given interpreter.
    ///
    /// Re-running against an existing valid environment is a no-op, which
    /// keeps repeated bootstraps idempotent. With `force`, an existing
    /// directory is removed and recreated.
    pub fn create(&self, interpreter: &Path, force: bool) -> Result<()> {
        if self.exists() {
            if !force {
                tracing::debug!("reusing existing environment at {}", self.root.display());
                return Ok(());
            }
            tracing::debug!("removing environment at {} for recreate", self.root.display());
            std::fs::remove_dir_all(&self.root)?;
        }

        let venv_arg = self.root.as_os_str();
        let result = shell::execute(
            interpreter,
            &[
                std::ffi::OsStr::new("-m"),
                std::ffi::OsStr::new("venv"),
                venv_arg,
            ],
            &CommandOptions {
                capture_stdout: true,
                capture_stderr: true,
                ..Default::default()
            },
        )?;

        if !result.success {
            return Err(WarbleError::EnvCreateFailed {
                path: self.root.clone(),
                message: first_meaningful_line(&result.stderr)
                    .unwrap_or_else(|| format!("exit code {:?}", result.exit_code)),
            });
        }

        if !self.exists() {
            return Err(WarbleError::EnvCreateFailed {
                path: self.root.clone(),
                message: "venv module reported success but wrote no pyvenv.cfg".to_string(),
            });
        }

        Ok(())
    }

    /// Activate the environment for this process.
    ///
    /// Mirrors what `bin/activate` does for a shell: prepend the scripts
    /// directory to PATH and set `VIRTUAL_ENV`, so tools resolved from the
    /// environment win over system installs for the rest of this process.
    pub fn activate(&self) {
        let scripts = self.scripts_dir();
        let current = std::env::var_os("PATH").unwrap_or_default();
        let mut entries = vec![scripts.clone()];
        entries.extend(std::env::split_paths(&current));

        if let Ok(joined) = std::env::join_paths(entries) {
            std::env::set_var("PATH", joined);
        }
        std::env::set_var("VIRTUAL_ENV", &self.root);

        tracing::debug!("activated environment, PATH now leads with {}", scripts.display());
    }
}

/// First non-empty line of command output, for compact error messages.
fn first_meaningful_line(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(String::from)
}
