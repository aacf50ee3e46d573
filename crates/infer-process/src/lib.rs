//! Helpers for spawning external build tools.
//!
//! Maven and Bazel can print a lot to stdout (Bazel's `aquery --output=proto`
//! response is binary and can be tens of megabytes). Stdout is therefore
//! redirected into a scoped temporary file instead of a pipe, and stderr is
//! inherited so the tool's own diagnostics reach the host's stderr directly.

use std::{
    env, fmt,
    io::{self, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

/// A full command invocation (cwd + program + args).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub cwd: PathBuf,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(
        cwd: impl Into<PathBuf>,
        program: impl Into<PathBuf>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            cwd: cwd.into(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Human-readable, not a round-trippable shell snippet.
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.contains(' ') || arg.contains('\t') {
                write!(f, " \"{}\"", arg.replace('"', "\\\""))?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Exit status plus everything the command wrote to stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
}

impl CommandOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

pub trait CommandRunner: Send + Sync + fmt::Debug {
    fn run(&self, command: &CommandSpec) -> io::Result<CommandOutput>;
}

#[derive(Debug, Clone)]
pub struct DefaultCommandRunner {
    /// Kill the process tree if it hasn't exited after this duration.
    ///
    /// A timeout is reported as an [`io::ErrorKind::TimedOut`] error.
    pub timeout: Option<Duration>,
    /// How long to wait after `SIGTERM` before sending `SIGKILL`.
    pub kill_grace: Duration,
}

impl Default for DefaultCommandRunner {
    fn default() -> Self {
        Self {
            timeout: None,
            kill_grace: Duration::from_millis(250),
        }
    }
}

impl DefaultCommandRunner {
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

impl CommandRunner for DefaultCommandRunner {
    fn run(&self, command: &CommandSpec) -> io::Result<CommandOutput> {
        let mut capture = tempfile::Builder::new()
            .prefix("infer-command-output")
            .suffix(".out")
            .tempfile()?;

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .current_dir(&command.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::from(capture.as_file().try_clone()?))
            .stderr(Stdio::inherit());

        // Own process group on Unix so a timeout can take down wrapper scripts
        // together with the JVM they spawn.
        #[cfg(unix)]
        unsafe {
            use std::os::unix::process::CommandExt;

            cmd.pre_exec(|| {
                // SAFETY: `setpgid` is async-signal-safe and does not allocate.
                if libc::setpgid(0, 0) != 0 {
                    return Err(io::Error::last_os_error());
                }
                Ok(())
            });
        }

        let mut child = cmd.spawn().map_err(|err| {
            io::Error::new(err.kind(), format!("failed to spawn `{command}`: {err}"))
        })?;
        // Drop our handle to the child's stdout so only the child holds it open.
        drop(cmd);

        let status = match self.timeout {
            None => child.wait()?,
            Some(timeout) => {
                let start = Instant::now();
                loop {
                    if let Some(status) = child.try_wait()? {
                        break status;
                    }
                    if start.elapsed() >= timeout {
                        let _ = terminate_process_tree(&mut child, self.kill_grace);
                        return Err(io::Error::new(
                            io::ErrorKind::TimedOut,
                            format!("`{command}` timed out after {timeout:?}"),
                        ));
                    }
                    thread::sleep(
                        Duration::from_millis(50).min(timeout.saturating_sub(start.elapsed())),
                    );
                }
            }
        };

        let file = capture.as_file_mut();
        file.seek(SeekFrom::Start(0))?;
        let mut stdout = Vec::new();
        file.read_to_end(&mut stdout)?;

        Ok(CommandOutput { status, stdout })
    }
}

/// Run `command` and return its stdout, or `None` when it exits unsuccessfully.
///
/// Spawn and I/O errors (including timeouts) are returned as `Err`; a non-zero
/// exit is logged with the full command line and mapped to `Ok(None)`.
pub fn stdout_if_success(
    runner: &dyn CommandRunner,
    command: &CommandSpec,
) -> io::Result<Option<Vec<u8>>> {
    tracing::info!(target: "infer.process", command = %command, "running");
    let output = runner.run(command)?;
    if !output.status.success() {
        tracing::error!(
            target: "infer.process",
            command = %command,
            cwd = %command.cwd.display(),
            code = ?output.status.code(),
            "command returned a non-zero exit status"
        );
        return Ok(None);
    }
    Ok(Some(output.stdout))
}

/// Look for an executable file called `name` in the directories listed in `PATH`.
pub fn find_executable_on_path(name: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = path.metadata() else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

fn terminate_process_tree(
    child: &mut std::process::Child,
    grace: Duration,
) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        let pid = child.id() as i32;
        // Negative pid targets the process group set up in `pre_exec`.
        unsafe {
            let _ = libc::kill(-pid, libc::SIGTERM);
        }

        let start = Instant::now();
        while start.elapsed() < grace {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            thread::sleep(Duration::from_millis(25));
        }

        unsafe {
            let _ = libc::kill(-pid, libc::SIGKILL);
        }
        child.wait()
    }

    #[cfg(not(unix))]
    {
        let _ = grace;
        let _ = child.kill();
        child.wait()
    }
}

/// Helpers for tests that substitute a fake [`CommandRunner`].
pub mod test_support {
    use std::process::ExitStatus;

    /// Build an [`ExitStatus`] that reports `code` from [`ExitStatus::code`].
    pub fn exit_status(code: i32) -> ExitStatus {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            ExitStatus::from_raw(code << 8)
        }
        #[cfg(windows)]
        {
            use std::os::windows::process::ExitStatusExt;
            ExitStatus::from_raw(code as u32)
        }
    }
}
