//! Format-on-save
//!
//! Remembers which file the active frame is showing when a buffer is
//! loaded, and runs an external formatter (`gofmt -w` by default) on that
//! file after every write. Whatever the formatter does, the buffer is then
//! reloaded from disk so a rewrite shows up immediately.

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::FormatError;
use crate::plugin::Host;

/// How often a child with a timeout is polled
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Formatter settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterConfig {
    /// Whether saves trigger the formatter at all
    pub enabled: bool,
    /// Program to run
    pub command: String,
    /// Arguments placed before the file path
    pub args: Vec<String>,
    /// Reload the buffer even when the formatter fails
    pub reload_on_failure: bool,
    /// Kill the formatter after this long
    pub timeout: Option<Duration>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "gofmt".to_string(),
            args: vec!["-w".to_string()],
            reload_on_failure: true,
            timeout: None,
        }
    }
}

impl FormatterConfig {
    /// The command line, for messages
    pub fn describe(&self, path: &Path) -> String {
        let mut parts = vec![self.command.clone()];
        parts.extend(self.args.iter().cloned());
        parts.push(path.display().to_string());
        parts.join(" ")
    }
}

/// What a finished subprocess left behind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubprocessOutput {
    /// Exit code, `None` when killed by a signal
    pub status: Option<i32>,
    /// Captured stdout followed by stderr
    pub output: String,
    /// Whether the run hit its timeout
    pub timed_out: bool,
}

impl SubprocessOutput {
    /// Whether the process exited with status 0
    pub fn success(&self) -> bool {
        self.status == Some(0) && !self.timed_out
    }

    /// Length of the captured output in bytes
    pub fn output_len(&self) -> usize {
        self.output.len()
    }
}

/// Result of a save-triggered format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// The formatter exited cleanly
    Formatted,
    /// The formatter failed or timed out
    Failed(SubprocessOutput),
    /// Formatting is turned off
    Disabled,
}

/// Report of one save-triggered format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatReport {
    pub outcome: FormatOutcome,
    /// Whether the host was asked to reload the buffer
    pub reloaded: bool,
}

/// The format-on-save trigger
#[derive(Debug, Clone, Default)]
pub struct FormatTrigger {
    config: FormatterConfig,
    target: Option<PathBuf>,
}

impl FormatTrigger {
    pub fn new(config: FormatterConfig) -> Self {
        Self {
            config,
            target: None,
        }
    }

    /// The file the next save will format
    pub fn target(&self) -> Option<&Path> {
        self.target.as_deref()
    }

    /// Set the file the next save will format
    pub fn record(&mut self, path: impl Into<PathBuf>) {
        self.target = Some(path.into());
    }

    /// Record the path of the buffer shown in the active frame
    pub fn on_file_loaded_or_focused(&mut self, host: &dyn Host) -> Result<&Path, FormatError> {
        let frame = host.active_frame().ok_or(FormatError::NoActiveFrame)?;
        let buffer = frame.buffer.ok_or(FormatError::NoBuffer)?;
        let path = buffer.path.ok_or(FormatError::NoPath)?;
        debug!(path = %path.display(), "recorded format target");
        Ok(self.target.insert(path).as_path())
    }

    /// Format the recorded file, report, and reload the active buffer
    pub fn on_file_saved(&mut self, host: &mut dyn Host) -> Result<FormatReport, FormatError> {
        if !self.config.enabled {
            return Ok(FormatReport {
                outcome: FormatOutcome::Disabled,
                reloaded: false,
            });
        }

        let frame = host.active_frame().ok_or(FormatError::NoActiveFrame)?;
        let buffer = frame.buffer.ok_or(FormatError::NoBuffer)?;
        let path = self.target.clone().ok_or(FormatError::NoPath)?;

        let mut args: Vec<OsString> = self.config.args.iter().map(OsString::from).collect();
        args.push(path.clone().into_os_string());

        debug!(command = %self.config.describe(&path), "running formatter");
        // A formatter that cannot start counts as a failed run
        let output = host
            .run_subprocess(&self.config.command, &args, self.config.timeout)
            .unwrap_or_else(|source| {
                let err = FormatError::Spawn {
                    command: self.config.command.clone(),
                    source,
                };
                warn!("{err}");
                SubprocessOutput {
                    status: None,
                    output: err.to_string(),
                    timed_out: false,
                }
            });

        let outcome = if output.success() {
            info!(path = %path.display(), "formatted");
            host.message("Formatted buffer");
            FormatOutcome::Formatted
        } else {
            info!(
                path = %path.display(),
                status = ?output.status,
                timed_out = output.timed_out,
                "formatter failed"
            );
            host.message(&failure_message(&output, self.config.timeout));
            FormatOutcome::Failed(output)
        };

        let reload = matches!(outcome, FormatOutcome::Formatted) || self.config.reload_on_failure;
        if reload {
            host.reload_buffer(buffer.id).map_err(FormatError::Reload)?;
            host.message("Buffer reloaded");
        }

        Ok(FormatReport {
            outcome,
            reloaded: reload,
        })
    }
}

fn failure_message(output: &SubprocessOutput, timeout: Option<Duration>) -> String {
    let mut msg = "Failure to format Go source".to_string();
    if output.timed_out {
        if let Some(limit) = timeout {
            msg.push_str(&format!(": timed out after {}ms", limit.as_millis()));
        }
    } else if let Some(line) = output.output.lines().map(str::trim).find(|l| !l.is_empty()) {
        msg.push_str(": ");
        msg.push_str(line);
    }
    msg
}

/// Run a program to completion, capturing its output
///
/// The program is started directly, not through a shell. With a timeout
/// the child is killed once it expires.
pub fn run_process(
    program: &str,
    args: &[OsString],
    timeout: Option<Duration>,
) -> io::Result<SubprocessOutput> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = child.stdout.take().map(spawn_reader);
    let stderr = child.stderr.take().map(spawn_reader);

    let (status, timed_out) = match timeout {
        Some(limit) => wait_with_timeout(&mut child, limit)?,
        None => (child.wait()?, false),
    };

    // Grandchildren of a killed process may still hold the pipes open;
    // their readers are left detached rather than joined.
    let mut output = String::new();
    if !timed_out {
        for bytes in [stdout, stderr].into_iter().flatten().map(join_reader) {
            output.push_str(&String::from_utf8_lossy(&bytes));
        }
    }

    Ok(SubprocessOutput {
        status: status.code(),
        output,
        timed_out,
    })
}

fn spawn_reader<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

fn join_reader(handle: JoinHandle<Vec<u8>>) -> Vec<u8> {
    handle.join().unwrap_or_default()
}

fn wait_with_timeout(
    child: &mut std::process::Child,
    limit: Duration,
) -> io::Result<(ExitStatus, bool)> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((status, false));
        }
        if Instant::now() >= deadline {
            // Already exited between the poll and the kill is fine
            let _ = child.kill();
            return Ok((child.wait()?, true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}
