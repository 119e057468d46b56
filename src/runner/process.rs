//! Subprocess execution with captured output and a wall-clock deadline.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// How long output readers may lag behind a process that is already gone
const READER_GRACE: Duration = Duration::from_secs(1);

/// How a supervised process ended
#[derive(Debug)]
pub(crate) enum ProcessExit {
    /// The process exited on its own before the deadline
    Exited {
        status: ExitStatus,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
    /// The deadline passed; the process (and its process group) was killed and reaped
    TimedOut,
}

/// Run `path` with no arguments, stdin closed and both output streams captured.
///
/// Polls for exit every `poll_interval` until `timeout` has elapsed since the
/// spawn. A timeout too large to represent as an `Instant` means no deadline.
/// Whatever happens, the child is reaped and nothing left in its process
/// group survives to hold the output pipes open.
pub(crate) fn run_with_deadline(
    path: &Path,
    timeout: Duration,
    poll_interval: Duration,
) -> io::Result<ProcessExit> {
    let mut command = Command::new(path);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    isolate(&mut command);

    let mut child = command.spawn()?;
    let deadline = Instant::now().checked_add(timeout);
    debug!(pid = child.id(), path = %path.display(), "spawned test executable");

    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = child.id(), %status, "test executable exited");
                // Background jobs the test left behind still hold the pipes.
                kill_leftovers(&child);
                return Ok(ProcessExit::Exited {
                    status,
                    stdout: collect(&stdout, deadline)?,
                    stderr: collect(&stderr, deadline)?,
                });
            }
            Ok(None) => {}
            Err(err) => {
                warn!(pid = child.id(), error = %err, "failed to poll test executable");
                terminate(&mut child);
                reap(&mut child);
                let _ = collect(&stdout, deadline);
                let _ = collect(&stderr, deadline);
                return Err(err);
            }
        }

        let now = Instant::now();
        let remaining = match deadline {
            Some(deadline) if now >= deadline => {
                debug!(pid = child.id(), ?timeout, "deadline reached, terminating");
                terminate(&mut child);
                reap(&mut child);
                let _ = collect(&stdout, Some(deadline));
                let _ = collect(&stderr, Some(deadline));
                return Ok(ProcessExit::TimedOut);
            }
            Some(deadline) => deadline - now,
            None => poll_interval,
        };

        thread::sleep(poll_interval.min(remaining));
    }
}

/// Exit code of a finished process. A child killed by a signal reports the
/// negated signal number.
pub(crate) fn exit_code(status: &ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => signal_code(status),
    }
}

#[cfg(unix)]
fn signal_code(status: &ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.signal().map(|sig| -sig).unwrap_or(-1)
}

#[cfg(not(unix))]
fn signal_code(_status: &ExitStatus) -> i32 {
    -1
}

/// Put the child in its own process group so a timeout can take down
/// anything it forked as well.
#[cfg(unix)]
fn isolate(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn isolate(_command: &mut Command) {}

#[cfg(unix)]
fn terminate(child: &mut Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let pgid = Pid::from_raw(child.id() as i32);
    match killpg(pgid, Signal::SIGKILL) {
        Ok(()) => debug!(pgid = child.id(), "killed test process group"),
        Err(errno) => {
            warn!(pid = child.id(), error = %errno, "failed to kill process group, killing child only");
            if let Err(err) = child.kill() {
                warn!(pid = child.id(), error = %err, "failed to kill test executable");
            }
        }
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    if let Err(err) = child.kill() {
        warn!(pid = child.id(), error = %err, "failed to kill test executable");
    }
}

/// Kill whatever is left in the process group of a child that already exited.
#[cfg(unix)]
fn kill_leftovers(child: &Child) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    match killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL) {
        Ok(()) => debug!(pgid = child.id(), "killed leftover processes in test process group"),
        Err(Errno::ESRCH) => {}
        Err(errno) => warn!(pgid = child.id(), error = %errno, "failed to kill leftover processes"),
    }
}

#[cfg(not(unix))]
fn kill_leftovers(_child: &Child) {}

fn reap(child: &mut Child) {
    if let Err(err) = child.wait() {
        warn!(pid = child.id(), error = %err, "failed to reap test executable");
    }
}

fn spawn_reader<R>(source: Option<R>) -> Receiver<io::Result<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let result = match source {
            Some(mut source) => source.read_to_end(&mut buffer).map(|_| buffer),
            None => Ok(buffer),
        };
        let _ = tx.send(result);
    });
    rx
}

/// Wait for a reader to hit end of file, at most until the deadline plus a
/// short grace period. Without a deadline this waits for as long as it takes.
fn collect(rx: &Receiver<io::Result<Vec<u8>>>, deadline: Option<Instant>) -> io::Result<Vec<u8>> {
    let Some(deadline) = deadline else {
        return rx
            .recv()
            .map_err(|_| io::Error::other("output reader thread panicked"))?;
    };

    let wait = deadline.saturating_duration_since(Instant::now()) + READER_GRACE;
    match rx.recv_timeout(wait) {
        Ok(output) => output,
        Err(RecvTimeoutError::Timeout) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            "test output is still held open by a process outside the test's process group",
        )),
        Err(RecvTimeoutError::Disconnected) => {
            Err(io::Error::other("output reader thread panicked"))
        }
    }
}
