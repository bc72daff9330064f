use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;

/// Output captured from one child process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    /// Stdout, or stdout and stderr merged in arrival order in capture-stderr mode.
    pub text: String,
    pub exit_code: i32,
}

/// Errors produced while running the child command.
#[derive(Debug)]
pub enum RunError {
    /// The invocation had no program name.
    EmptyCommand,
    /// The program could not be found or launched.
    Spawn {
        program: String,
        source: std::io::Error,
    },
    /// The program exited non-zero while stderr was kept separate.
    ChildFailed {
        exit_code: i32,
        stderr: String,
        /// Stdout captured before the failure, kept for callers that want it.
        stdout: String,
    },
    Io(std::io::Error),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCommand => write!(f, "empty command"),
            Self::Spawn { program, .. } => write!(f, "failed to run {program}"),
            Self::ChildFailed {
                exit_code, stderr, ..
            } => {
                let stderr = stderr.trim_end();
                if stderr.is_empty() {
                    write!(f, "exit status: {exit_code}")
                } else {
                    write!(f, "exit status: {exit_code} (stderr: {stderr})")
                }
            }
            Self::Io(e) => write!(f, "i/o error while capturing output: {e}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            Self::EmptyCommand | Self::ChildFailed { .. } => None,
        }
    }
}

impl From<std::io::Error> for RunError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Extract an exit code from a process status, mapping signals to 128+N on Unix.
fn exit_code_from_status(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        status
            .code()
            .unwrap_or_else(|| status.signal().map_or(1, |s| 128 + s))
    }
    #[cfg(not(unix))]
    {
        status.code().unwrap_or(1)
    }
}

/// Forward raw chunks from `pipe` until EOF.
fn pump(mut pipe: impl Read, tx: &mpsc::Sender<Vec<u8>>) {
    let mut buf = [0u8; 8192];
    loop {
        match pipe.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    }
}

/// Read stdout and stderr concurrently into one buffer so the merged text
/// keeps the order in which the child wrote it.
fn run_merged(mut child: std::process::Child) -> Result<Captured, RunError> {
    let stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| RunError::Io(std::io::Error::other("stdout not captured")))?;
    let stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| RunError::Io(std::io::Error::other("stderr not captured")))?;

    let (tx, rx) = mpsc::channel();
    let tx2 = tx.clone();

    let stdout_thread = thread::spawn(move || pump(stdout_pipe, &tx));
    let stderr_thread = thread::spawn(move || pump(stderr_pipe, &tx2));

    stdout_thread
        .join()
        .map_err(|_| RunError::Io(std::io::Error::other("stdout reader thread panicked")))?;
    stderr_thread
        .join()
        .map_err(|_| RunError::Io(std::io::Error::other("stderr reader thread panicked")))?;

    // All senders dropped → rx iteration terminates
    let merged: Vec<u8> = rx.into_iter().flatten().collect();
    let status = child.wait()?;

    Ok(Captured {
        text: String::from_utf8_lossy(&merged).into_owned(),
        exit_code: exit_code_from_status(status),
    })
}

/// Run `argv` to completion and capture its output.
///
/// With `merge_stderr`, stderr is folded into the captured text and a
/// non-zero exit is not an error. Otherwise a non-zero exit is reported as
/// [`RunError::ChildFailed`] carrying both streams.
///
/// # Errors
///
/// Returns an error if `argv` is empty, the program cannot be spawned, or
/// (without `merge_stderr`) the program exits non-zero.
pub fn execute(argv: &[String], merge_stderr: bool) -> Result<Captured, RunError> {
    let (program, args) = argv.split_first().ok_or(RunError::EmptyCommand)?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if merge_stderr {
        let child = cmd.spawn().map_err(|source| RunError::Spawn {
            program: program.clone(),
            source,
        })?;
        return run_merged(child);
    }

    let output = cmd.output().map_err(|source| RunError::Spawn {
        program: program.clone(),
        source,
    })?;
    let exit_code = exit_code_from_status(output.status);
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

    if !output.status.success() {
        return Err(RunError::ChildFailed {
            exit_code,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            stdout,
        });
    }

    Ok(Captured {
        text: stdout,
        exit_code,
    })
}
