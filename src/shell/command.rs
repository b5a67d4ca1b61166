//! Argv-based command execution.

use crate::error::{Result, WarbleError};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of executing an external command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether the command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<std::path::PathBuf>,

    /// Environment variables (merged with the inherited env).
    pub env: HashMap<String, String>,

    /// Capture stdout (if false, inherits from parent).
    pub capture_stdout: bool,

    /// Capture stderr (if false, inherits from parent).
    pub capture_stderr: bool,
}

/// Output line from streaming execution.
#[derive(Debug, Clone)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Callback for streaming output.
pub type OutputCallback = Box<dyn Fn(OutputLine) + Send>;

fn display_command(program: &OsStr, args: &[&OsStr]) -> String {
    let mut parts = vec![program.to_string_lossy().to_string()];
    parts.extend(args.iter().map(|a| a.to_string_lossy().to_string()));
    parts.join(" ")
}

fn build(program: &OsStr, args: &[&OsStr], options: &CommandOptions) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd
}

/// Execute a command, waiting for completion.
pub fn execute<S: AsRef<OsStr>>(
    program: S,
    args: &[&OsStr],
    options: &CommandOptions,
) -> Result<CommandResult> {
    let start = Instant::now();
    let program = program.as_ref();

    let mut cmd = build(program, args, options);

    if options.capture_stdout {
        cmd.stdout(Stdio::piped());
    } else {
        cmd.stdout(Stdio::inherit());
    }

    if options.capture_stderr {
        cmd.stderr(Stdio::piped());
    } else {
        cmd.stderr(Stdio::inherit());
    }

    let output = cmd.output().map_err(|_| WarbleError::CommandFailed {
        command: display_command(program, args),
        code: None,
    })?;

    let duration = start.elapsed();

    let stdout = if options.capture_stdout {
        String::from_utf8_lossy(&output.stdout).to_string()
    } else {
        String::new()
    };

    let stderr = if options.capture_stderr {
        String::from_utf8_lossy(&output.stderr).to_string()
    } else {
        String::new()
    };

    if output.status.success() {
        Ok(CommandResult::success(stdout, stderr, duration))
    } else {
        Ok(CommandResult::failure(
            output.status.code(),
            stdout,
            stderr,
            duration,
        ))
    }
}

/// Execute a command with both streams captured, no inheritance.
pub fn execute_quiet<S: AsRef<OsStr>>(program: S, args: &[&OsStr]) -> Result<CommandResult> {
    let options = CommandOptions {
        capture_stdout: true,
        capture_stderr: true,
        ..Default::default()
    };
    execute(program, args, &options)
}

/// Execute a command and return whether it exited successfully.
pub fn execute_check<S: AsRef<OsStr>>(program: S, args: &[&OsStr]) -> bool {
    execute_quiet(program, args)
        .map(|r| r.success)
        .unwrap_or(false)
}

/// Execute a command, forwarding output lines to a callback as they arrive.
///
/// Both streams are read on dedicated threads that are joined before this
/// returns; the caller stays single-threaded as far as it can observe.
pub fn execute_streaming<S: AsRef<OsStr>>(
    program: S,
    args: &[&OsStr],
    options: &CommandOptions,
    callback: OutputCallback,
) -> Result<CommandResult> {
    let start = Instant::now();
    let program = program.as_ref();

    let mut cmd = build(program, args, options);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.stdin(Stdio::null());

    let mut child = cmd.spawn().map_err(|_| WarbleError::CommandFailed {
        command: display_command(program, args),
        code: None,
    })?;

    let stdout = child.stdout.take().ok_or_else(|| WarbleError::CommandFailed {
        command: display_command(program, args),
        code: None,
    })?;
    let stderr = child.stderr.take().ok_or_else(|| WarbleError::CommandFailed {
        command: display_command(program, args),
        code: None,
    })?;

    let (tx, rx) = mpsc::channel();
    let tx_stdout = tx.clone();
    let tx_stderr = tx;

    let stdout_handle = thread::spawn(move || {
        let reader = BufReader::new(stdout);
        let mut output = String::new();
        for line in reader.lines().map_while(std::result::Result::ok) {
            output.push_str(&line);
            output.push('\n');
            let _ = tx_stdout.send(OutputLine::Stdout(line));
        }
        output
    });

    let stderr_handle = thread::spawn(move || {
        let reader = BufReader::new(stderr);
        let mut output = String::new();
        for line in reader.lines().map_while(std::result::Result::ok) {
            output.push_str(&line);
            output.push('\n');
            let _ = tx_stderr.send(OutputLine::Stderr(line));
        }
        output
    });

    for line in rx {
        callback(line);
    }

    let stdout_output = stdout_handle.join().unwrap_or_default();
    let stderr_output = stderr_handle.join().unwrap_or_default();

    let status = child.wait().map_err(|_| WarbleError::CommandFailed {
        command: display_command(program, args),
        code: None,
    })?;

    let duration = start.elapsed();

    if status.success() {
        Ok(CommandResult::success(
            stdout_output,
            stderr_output,
            duration,
        ))
    } else {
        Ok(CommandResult::failure(
            status.code(),
            stdout_output,
            stderr_output,
            duration,
        ))
    }
}

/// Convenience: turn `&str` args into the `&[&OsStr]` the executors take.
#[macro_export]
macro_rules! argv {
    ($($arg:expr),* $(,)?) => {
        &[$(std::ffi::OsStr::new($arg)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn os<'a>(args: &'a [&'a str]) -> Vec<&'a OsStr> {
        args.iter().map(OsStr::new).collect()
    }

    #[cfg(unix)]
    #[test]
    fn execute_successful_command() {
        let options = CommandOptions {
            capture_stdout: true,
            capture_stderr: true,
            ..Default::default()
        };

        let result = execute("echo", &os(&["hello"]), &options).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn execute_failing_command() {
        let options = CommandOptions {
            capture_stdout: true,
            capture_stderr: true,
            ..Default::default()
        };

        let result = execute("false", &[], &options).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(1));
    }

    #[test]
    fn execute_missing_program_is_error() {
        let err = execute_quiet("this-command-does-not-exist-12345", &[]);
        assert!(err.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn execute_with_env() {
        let mut options = CommandOptions {
            capture_stdout: true,
            capture_stderr: true,
            ..Default::default()
        };
        options
            .env
            .insert("MY_VAR".to_string(), "my_value".to_string());

        let result = execute("sh", &os(&["-c", "echo $MY_VAR"]), &options).unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("my_value"));
    }

    #[cfg(unix)]
    #[test]
    fn execute_with_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        let options = CommandOptions {
            cwd: Some(temp.path().to_path_buf()),
            capture_stdout: true,
            ..Default::default()
        };

        let result = execute("pwd", &[], &options).unwrap();
        assert!(result.success);
    }

    #[cfg(unix)]
    #[test]
    fn execute_check_returns_bool() {
        assert!(execute_check("true", &[]));
        assert!(!execute_check("false", &[]));
    }

    #[cfg(unix)]
    #[test]
    fn command_result_tracks_duration() {
        let result = execute_quiet("echo", &os(&["fast"])).unwrap();
        assert!(result.duration.as_millis() < 5000);
    }

    #[cfg(unix)]
    #[test]
    fn execute_streaming_captures_output() {
        use std::sync::{Arc, Mutex};

        let lines = Arc::new(Mutex::new(Vec::new()));
        let lines_clone = Arc::clone(&lines);

        let callback: OutputCallback = Box::new(move |line| {
            lines_clone.lock().unwrap().push(line);
        });

        let options = CommandOptions::default();
        let result = execute_streaming(
            "sh",
            &os(&["-c", "echo line1 && echo line2"]),
            &options,
            callback,
        )
        .unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("line1"));

        let captured = lines.lock().unwrap();
        assert!(captured.len() >= 2);
    }

    #[cfg(unix)]
    #[test]
    fn execute_streaming_captures_stderr() {
        use std::sync::{Arc, Mutex};

        let lines = Arc::new(Mutex::new(Vec::new()));
        let lines_clone = Arc::clone(&lines);

        let callback: OutputCallback = Box::new(move |line| {
            lines_clone.lock().unwrap().push(line);
        });

        let options = CommandOptions::default();
        let _ = execute_streaming("sh", &os(&["-c", "echo error >&2"]), &options, callback);

        let captured = lines.lock().unwrap();
        assert!(captured.iter().any(|l| matches!(l, OutputLine::Stderr(_))));
    }

    #[test]
    fn argv_macro_builds_osstr_slice() {
        let args: &[&OsStr] = argv!["--version"];
        assert_eq!(args.len(), 1);
        assert_eq!(args[0], OsStr::new("--version"));
    }
}
