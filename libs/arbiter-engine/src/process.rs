// Deadline-bounded subprocess execution shared by the compiler and the sandbox

use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How long to wait for pipes to hit EOF after the process has exited.
/// A backgrounded grandchild can hold them open indefinitely.
const PIPE_DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Per-stream capture cap used when the caller has no opinion
pub(crate) const DEFAULT_CAPTURE_LIMIT: usize = 8 * 1024 * 1024; // 8MB

#[derive(Debug)]
pub(crate) enum Completion {
    Exited {
        status: ExitStatus,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
    TimedOut,
}

/// Spawn `cmd`, feed it `stdin`, and wait for whichever comes first: process
/// exit or `limit`. Exit wins a tie with the timer.
///
/// The process leads its own process group. Before returning, that whole
/// group is killed, so nothing the program forked outlives the call. On
/// timeout the direct child is also reaped.
///
/// At most `capture_limit` bytes of each stream are kept; the rest is read
/// and discarded so the writer never stalls on a full pipe.
pub(crate) async fn run_with_deadline(
    cmd: &mut Command,
    stdin: Option<&[u8]>,
    limit: Duration,
    capture_limit: usize,
) -> io::Result<(Completion, Duration)> {
    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let start = Instant::now();
    let mut child = cmd.spawn()?;
    // id() is gone once the child is reaped; the group outlives it
    let group = child.id();

    let stdin_task = match (child.stdin.take(), stdin) {
        (Some(mut pipe), Some(data)) => {
            let data = data.to_vec();
            Some(tokio::spawn(async move {
                if let Err(e) = pipe.write_all(&data).await {
                    // Programs are free to exit without reading their input
                    if e.kind() != io::ErrorKind::BrokenPipe {
                        debug!(error = %e, "Failed to write stdin");
                    }
                }
            }))
        }
        _ => None,
    };
    let stdout = PipeCapture::spawn(child.stdout.take(), capture_limit);
    let stderr = PipeCapture::spawn(child.stderr.take(), capture_limit);

    let waited = tokio::select! {
        biased;
        status = child.wait() => Some(status),
        _ = tokio::time::sleep(limit) => None,
    };

    let completion = match waited {
        Some(Ok(status)) => {
            let (stdout, stderr) = tokio::join!(stdout.collect(), stderr.collect());
            kill_process_group(group);
            Completion::Exited {
                status,
                stdout,
                stderr,
            }
        }
        Some(Err(e)) => {
            kill_process_group(group);
            stdout.abort();
            stderr.abort();
            return Err(e);
        }
        None => {
            kill_process_group(group);
            // kill() also waits, so the process is reaped once this returns
            if let Err(e) = child.kill().await {
                warn!(error = %e, "Failed to kill timed-out process");
            }
            stdout.abort();
            stderr.abort();
            Completion::TimedOut
        }
    };

    if let Some(task) = stdin_task {
        task.abort();
    }

    Ok((completion, start.elapsed()))
}

/// Best-effort SIGKILL to the group led by `group`. A group with no members
/// left is the normal case after a clean exit.
#[cfg(unix)]
fn kill_process_group(group: Option<u32>) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pgid) = group.and_then(|id| i32::try_from(id).ok()) else {
        return;
    };
    match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => warn!(pgid, error = %e, "Failed to kill process group"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_group: Option<u32>) {}

type Sink = Arc<Mutex<Vec<u8>>>;

fn lock(sink: &Sink) -> MutexGuard<'_, Vec<u8>> {
    sink.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A pipe being read in the background into a shared, capped buffer.
/// Whatever has arrived so far can be taken at any time.
struct PipeCapture {
    sink: Sink,
    task: JoinHandle<()>,
}

impl PipeCapture {
    fn spawn<R>(pipe: Option<R>, limit: usize) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let sink = Sink::default();
        let task = tokio::spawn(read_pipe(pipe, sink.clone(), limit));
        Self { sink, task }
    }

    /// Wait briefly for EOF, then return what was captured either way
    async fn collect(mut self) -> Vec<u8> {
        if tokio::time::timeout(PIPE_DRAIN_GRACE, &mut self.task).await.is_err() {
            self.task.abort();
            debug!("Pipe still open after exit, keeping partial output");
        }
        std::mem::take(&mut *lock(&self.sink))
    }

    fn abort(self) {
        self.task.abort();
    }
}

async fn read_pipe<R>(pipe: Option<R>, sink: Sink, limit: usize)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let Some(mut pipe) = pipe else {
        return;
    };

    let mut chunk = [0u8; 8192];
    let mut truncated = false;
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                let mut buf = lock(&sink);
                let room = limit.saturating_sub(buf.len());
                buf.extend_from_slice(&chunk[..n.min(room)]);
                if n > room && !truncated {
                    truncated = true;
                    debug!(limit, "Output exceeded capture limit, discarding the rest");
                }
            }
            Err(e) => {
                debug!(error = %e, "Failed to read pipe");
                break;
            }
        }
    }
}
