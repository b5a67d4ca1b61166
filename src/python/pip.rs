//! Package installation inside the virtual environment.
//!
//! All pip invocations go through the environment's own interpreter
//! (`venv-python -m pip ...`), never a bare `pip` binary, so they cannot
//! accidentally target a system install.

use std::ffi::OsStr;
use std::path::PathBuf;

use crate::error::{Result, WarbleError};
use crate::shell::{self, CommandOptions, CommandResult, OutputCallback};

/// A package the workflow depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageSpec {
    /// Name passed to `pip install`.
    pub name: &'static str,
    /// Module name used for the `import` health probe.
    pub import_name: &'static str,
    /// What the package is for, shown in status output.
    pub purpose: &'static str,
}

/// The fixed package set, identical across platforms, installed in one
/// batch call and in this order.
pub const PACKAGES: &[PackageSpec] = &[
    PackageSpec {
        name: "yt-dlp",
        import_name: "yt_dlp",
        purpose: "audio/video downloader",
    },
    PackageSpec {
        name: "ffmpeg-python",
        import_name: "ffmpeg",
        purpose: "audio processing binding",
    },
    PackageSpec {
        name: "mutagen",
        import_name: "mutagen",
        purpose: "metadata tagging",
    },
    PackageSpec {
        name: "Pillow",
        import_name: "PIL",
        purpose: "image handling",
    },
];

/// pip driver bound to one environment's interpreter.
#[derive(Debug, Clone)]
pub struct Pip {
    python: PathBuf,
}

impl Pip {
    /// Create a driver for the given environment interpreter.
    pub fn new(python: PathBuf) -> Self {
        Self { python }
    }

    fn run_streaming(&self, args: &[&str], callback: OutputCallback) -> Result<CommandResult> {
        let os_args: Vec<&OsStr> = args.iter().map(OsStr::new).collect();
        shell::execute_streaming(
            &self.python,
            &os_args,
            &CommandOptions::default(),
            callback,
        )
    }

    /// Upgrade pip itself inside the environment.
    pub fn self_upgrade(&self, callback: OutputCallback) -> Result<()> {
        let result = self.run_streaming(
            &["-m", "pip", "install", "--upgrade", "pip"],
            callback,
        )?;

        if !result.success {
            return Err(WarbleError::CommandFailed {
                command: format!("{} -m pip install --upgrade pip", self.python.display()),
                code: result.exit_code,
            });
        }
        Ok(())
    }

    /// Install the fixed package set in a single batch call.
    ///
    /// pip resolves the whole set together; any failure fails the batch and
    /// its exit code is carried out unchanged. No partial-install cleanup is
    /// attempted.
    pub fn install_packages(&self, callback: OutputCallback) -> Result<()> {
        let mut args = vec!["-m", "pip", "install"];
        args.extend(PACKAGES.iter().map(|p| p.name));

        let result = self.run_streaming(&args, callback)?;

        if !result.success {
            return Err(WarbleError::InstallFailure {
                code: result.exit_code,
            });
        }
        Ok(())
    }

    /// Probe whether a package is importable inside the environment.
    pub fn has_package(&self, spec: &PackageSpec) -> bool {
        shell::execute_check(
            &self.python,
            &[
                OsStr::new("-c"),
                OsStr::new(&format!("import {}", spec.import_name)),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_set_is_exactly_four() {
        assert_eq!(PACKAGES.len(), 4);
    }

    #[test]
    fn package_names_match_workflow_requirements() {
        let names: Vec<&str> = PACKAGES.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["yt-dlp", "ffmpeg-python", "mutagen", "Pillow"]);
    }

    #[test]
    fn import_names_differ_from_pip_names_where_needed() {
        let ytdlp = PACKAGES.iter().find(|p| p.name == "yt-dlp").unwrap();
        assert_eq!(ytdlp.import_name, "yt_dlp");

        let pillow = PACKAGES.iter().find(|p| p.name == "Pillow").unwrap();
        assert_eq!(pillow.import_name, "PIL");
    }

    #[test]
    fn install_failure_from_missing_interpreter() {
        let pip = Pip::new(PathBuf::from("/nonexistent/python3"));
        let result = pip.install_packages(Box::new(|_| {}));
        assert!(result.is_err());
    }

    #[test]
    fn has_package_false_for_missing_interpreter() {
        let pip = Pip::new(PathBuf::from("/nonexistent/python3"));
        assert!(!pip.has_package(&PACKAGES[0]));
    }
}
