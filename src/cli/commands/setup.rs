//! The `setup` command: bootstrap the Python environment.
//!
//! Runs the fixed linear sequence the workflow needs before anything else
//! works: runtime check, environment creation, activation, pip
//! self-upgrade, batch package install, completion banner. The sequence
//! aborts on the first failure; nothing is rolled back, and re-running is
//! safe because environment creation is idempotent.

use std::path::{Path, PathBuf};

use crate::cli::args::SetupArgs;
use crate::error::{Result, WarbleError};
use crate::python::{find_interpreter, Pip, VirtualEnv, PACKAGES};
use crate::shell;
use crate::ui::spinner::step_output_callback;
use crate::ui::UserInterface;

use super::{Command, CommandResult};

/// Number of operational steps shown in progress counters.
const STEP_COUNT: usize = 5;

/// Bootstraps the isolated Python environment.
pub struct SetupCommand {
    project_root: PathBuf,
    args: SetupArgs,
}

impl SetupCommand {
    /// Create a new setup command.
    pub fn new(project_root: &Path, args: SetupArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }

    /// Whether to block for a keypress before exiting.
    ///
    /// Always with `--pause`; on Windows also whenever the session is
    /// interactive, because a double-clicked console closes with the
    /// process.
    fn should_pause(&self, ui: &dyn UserInterface) -> bool {
        self.args.pause || (cfg!(windows) && ui.is_interactive())
    }
}

impl Command for SetupCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.show_header("warble setup");

        // Step 1: runtime detection. Nothing is touched on disk until this
        // passes; a missing runtime aborts with exit code 1.
        ui.show_progress(1, STEP_COUNT);
        let mut spinner = ui.start_spinner("Checking for Python runtime...");
        let interpreter = match find_interpreter() {
            Ok(interp) => {
                spinner.finish_success(&format!(
                    "Python {} ({})",
                    interp.version_label(),
                    interp.path.display()
                ));
                interp
            }
            Err(e) => {
                spinner.finish_error("Python runtime not found");
                return Err(e);
            }
        };

        // Step 2: environment creation (idempotent reuse unless --force).
        ui.show_progress(2, STEP_COUNT);
        let venv = VirtualEnv::at(&self.project_root);
        let existed = venv.exists() && !self.args.force;
        let mut spinner = ui.start_spinner("Creating virtual environment...");
        match venv.create(&interpreter.path, self.args.force) {
            Ok(()) if existed => {
                spinner.finish_skipped(&format!(
                    "Virtual environment already exists ({})",
                    venv.root().display()
                ));
            }
            Ok(()) => {
                spinner.finish_success(&format!(
                    "Virtual environment created ({})",
                    venv.root().display()
                ));
            }
            Err(e) => {
                spinner.finish_error("Could not create virtual environment");
                return Err(e);
            }
        }

        // Step 3: activation. Process-local only; the user's shell is not
        // modified.
        ui.show_progress(3, STEP_COUNT);
        venv.activate();
        ui.success(&format!(
            "Environment activated ({})",
            venv.scripts_dir().display()
        ));

        let pip = Pip::new(venv.python());

        // Step 4: pip self-upgrade inside the environment.
        ui.show_progress(4, STEP_COUNT);
        let mut spinner = ui.start_spinner("Upgrading pip...");
        let callback = step_output_callback(ui.output_mode(), spinner.as_ref(), "Upgrading pip...");
        match pip.self_upgrade(callback) {
            Ok(()) => spinner.finish_success("pip upgraded"),
            Err(e) => {
                spinner.finish_error("pip upgrade failed");
                return Err(e);
            }
        }

        // Step 5: the batch package install. Any resolution failure fails
        // the whole batch and pip's exit code is what the process exits
        // with.
        ui.show_progress(5, STEP_COUNT);
        let names: Vec<&str> = PACKAGES.iter().map(|p| p.name).collect();
        let base = format!("Installing {}...", names.join(", "));
        let mut spinner = ui.start_spinner(&base);
        let callback = step_output_callback(ui.output_mode(), spinner.as_ref(), &base);
        match pip.install_packages(callback) {
            Ok(()) => spinner.finish_success("Packages installed"),
            Err(e) => {
                spinner.finish_error("Package installation failed");
                if let WarbleError::InstallFailure { code } = &e {
                    tracing::debug!("pip exited with {:?}", code);
                }
                return Err(e);
            }
        }

        // Step 6: done.
        ui.success("Setup complete! The environment is ready.");
        ui.show_hint("Next: warble fetch <youtube-music-url>");

        if self.should_pause(ui) {
            ui.message("Press Enter to close...");
            shell::wait_for_enter();
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;

    // The bootstrap sequence itself is exercised end-to-end in
    // tests/cli_test.rs against fake interpreter shims on a controlled
    // PATH; running it here would hit whatever Python this machine has.

    #[test]
    fn pause_flag_forces_pause_decision() {
        let temp = tempfile::TempDir::new().unwrap();
        let cmd = SetupCommand::new(
            temp.path(),
            SetupArgs {
                pause: true,
                force: false,
            },
        );
        let ui = MockUI::new();
        assert!(cmd.should_pause(&ui));
    }

    #[cfg(unix)]
    #[test]
    fn no_pause_by_default_on_unix() {
        let temp = tempfile::TempDir::new().unwrap();
        let cmd = SetupCommand::new(temp.path(), SetupArgs::default());
        let mut ui = MockUI::new();
        ui.set_interactive(true);
        assert!(!cmd.should_pause(&ui));
    }
}
