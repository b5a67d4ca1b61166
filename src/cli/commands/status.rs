//! The `status` command: report environment health.
//!
//! Read-only. Re-probes everything `setup` provisions plus the external
//! tools the workflow shells out to, and exits non-zero when a required
//! piece is missing so scripts can gate on it.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::StatusArgs;
use crate::embed::Embedder;
use crate::error::Result;
use crate::fetch::YtDlp;
use crate::python::{find_interpreter, Pip, VirtualEnv, PACKAGES};
use crate::ui::UserInterface;

use super::{Command, CommandResult};

/// Health report for the bootstrapped environment.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub python: ToolStatus,
    pub venv: VenvStatus,
    pub packages: Vec<PackageStatus>,
    pub yt_dlp: ToolStatus,
    pub ffmpeg: ToolStatus,
}

/// Presence and version of one external tool.
#[derive(Debug, Serialize)]
pub struct ToolStatus {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// State of the virtual environment directory.
#[derive(Debug, Serialize)]
pub struct VenvStatus {
    pub path: PathBuf,
    pub exists: bool,
}

/// Import-probe result for one workflow package.
#[derive(Debug, Serialize)]
pub struct PackageStatus {
    pub name: &'static str,
    pub purpose: &'static str,
    pub installed: bool,
}

impl StatusReport {
    /// Whether everything `setup` is responsible for is healthy.
    ///
    /// External tools are reported but only yt-dlp is required here, since
    /// it is part of the installed package set; ffmpeg is advisory.
    pub fn is_healthy(&self) -> bool {
        self.python.found && self.venv.exists && self.packages.iter().all(|p| p.installed)
    }

    /// Gather the report. The only subprocesses run are version and import
    /// probes; nothing is mutated.
    pub fn gather(project_root: &Path) -> Self {
        let python = match find_interpreter() {
            Ok(interp) => ToolStatus {
                found: true,
                version: interp.version.clone(),
                path: Some(interp.path),
            },
            Err(_) => ToolStatus {
                found: false,
                path: None,
                version: None,
            },
        };

        let venv = VirtualEnv::at(project_root);
        let venv_status = VenvStatus {
            path: venv.root().to_path_buf(),
            exists: venv.exists(),
        };

        let packages = if venv.exists() {
            let pip = Pip::new(venv.python());
            PACKAGES
                .iter()
                .map(|spec| PackageStatus {
                    name: spec.name,
                    purpose: spec.purpose,
                    installed: pip.has_package(spec),
                })
                .collect()
        } else {
            PACKAGES
                .iter()
                .map(|spec| PackageStatus {
                    name: spec.name,
                    purpose: spec.purpose,
                    installed: false,
                })
                .collect()
        };

        // Probe the workflow tools with the environment activated, the way
        // fetch/embed will see them.
        if venv.exists() {
            venv.activate();
        }

        let yt_dlp = match YtDlp::locate() {
            Ok(tool) => ToolStatus {
                found: true,
                version: tool.version(),
                path: Some(tool.path().to_path_buf()),
            },
            Err(_) => ToolStatus {
                found: false,
                path: None,
                version: None,
            },
        };

        let ffmpeg = match Embedder::locate() {
            Ok(tool) => ToolStatus {
                found: true,
                version: None,
                path: Some(tool.ffmpeg().to_path_buf()),
            },
            Err(_) => ToolStatus {
                found: false,
                path: None,
                version: None,
            },
        };

        Self {
            python,
            venv: venv_status,
            packages,
            yt_dlp,
            ffmpeg,
        }
    }
}

/// Shows the environment health report.
pub struct StatusCommand {
    project_root: PathBuf,
    args: StatusArgs,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(project_root: &Path, args: StatusArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }

    fn render(&self, report: &StatusReport, ui: &mut dyn UserInterface) {
        ui.show_header("warble status");

        if report.python.found {
            match &report.python.version {
                Some(v) => ui.success(&format!("Python {}", v)),
                None => ui.success("Python found"),
            }
        } else {
            ui.error("Python not found on PATH");
        }

        if report.venv.exists {
            ui.success(&format!(
                "Virtual environment ({})",
                report.venv.path.display()
            ));
        } else {
            ui.error(&format!(
                "Virtual environment missing ({})",
                report.venv.path.display()
            ));
        }

        for pkg in &report.packages {
            if pkg.installed {
                ui.success(&format!("{} ({})", pkg.name, pkg.purpose));
            } else {
                ui.error(&format!("{} not installed ({})", pkg.name, pkg.purpose));
            }
        }

        if report.yt_dlp.found {
            match &report.yt_dlp.version {
                Some(v) => ui.success(&format!("yt-dlp {}", v)),
                None => ui.success("yt-dlp found"),
            }
        } else {
            ui.error("yt-dlp not found");
        }

        if report.ffmpeg.found {
            ui.success("ffmpeg found");
        } else {
            ui.warning("ffmpeg not found (needed for tagging and cover embedding)");
        }

        if !report.is_healthy() {
            ui.show_hint("Run 'warble setup' to bootstrap the environment");
        }
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let report = StatusReport::gather(&self.project_root);

        if self.args.json {
            ui.message(&serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?);
        } else {
            self.render(&report, ui);
        }

        if report.is_healthy() {
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
    use tempfile::TempDir;

    #[test]
    fn report_without_venv_is_unhealthy() {
        let temp = TempDir::new().unwrap();
        let report = StatusReport::gather(temp.path());
        assert!(!report.venv.exists);
        assert!(!report.is_healthy());
        assert!(report.packages.iter().all(|p| !p.installed));
    }

    #[test]
    fn report_serializes_to_json() {
        let temp = TempDir::new().unwrap();
        let report = StatusReport::gather(temp.path());
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"venv\""));
        assert!(json.contains("\"packages\""));
    }

    #[test]
    fn unhealthy_status_exits_nonzero() {
        let temp = TempDir::new().unwrap();
        let cmd = StatusCommand::new(temp.path(), StatusArgs::default());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn status_lists_all_packages() {
        let temp = TempDir::new().unwrap();
        let cmd = StatusCommand::new(temp.path(), StatusArgs::default());
        let mut ui = MockUI::new();

        let _ = cmd.execute(&mut ui).unwrap();
        assert!(ui.has_error("yt-dlp not installed"));
        assert!(ui.has_error("Pillow not installed"));
    }
}
