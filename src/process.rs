use std::{
    ffi::OsStr,
    process::{ExitStatus, Output, Stdio},
    time::{Duration, Instant},
};
use tokio::process::{Child, Command};

use crate::future::WithTimeout;

struct MetricsGuard {
    start: Instant,
    armed: bool,
    command: &'static str,
}

impl MetricsGuard {
    fn guard(command: &'static str) -> Self {
        metrics::counter!(crate::init_metrics::PROCESS_START, "command" => command).increment(1);

        Self {
            start: Instant::now(),
            armed: true,
            command,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for MetricsGuard {
    fn drop(&mut self) {
        metrics::histogram!(
            crate::init_metrics::PROCESS_DURATION,
            "command" => self.command,
            "completed" => (!self.armed).to_string(),
        )
        .record(self.start.elapsed().as_secs_f64());

        metrics::counter!(
            crate::init_metrics::PROCESS_END,
            "completed" => (!self.armed).to_string(),
            "command" => self.command,
        )
        .increment(1);
    }
}

pub(crate) struct Process {
    command: &'static str,
    child: Child,
    guard: MetricsGuard,
    timeout: Duration,
}

impl std::fmt::Debug for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Process")
            .field("command", &self.command)
            .field("child", &"Child")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ProcessError {
    #[error("Required command {0} not found, make sure it exists in tubely's $PATH")]
    NotFound(&'static str),

    #[error("Cannot run command {0} due to invalid permissions on binary, make sure the tubely user has permission to run it")]
    PermissionDenied(&'static str),

    #[error("Reached process spawn limit")]
    LimitReached,

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("{command} failed with {status}: {stderr}")]
    Status {
        command: &'static str,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Unknown process error")]
    Other(#[source] std::io::Error),
}

impl Process {
    pub(crate) fn run<T>(command: &'static str, args: &[T], timeout: u64) -> Result<Self, ProcessError>
    where
        T: AsRef<OsStr>,
    {
        let res = tracing::trace_span!(parent: None, "Create command", %command)
            .in_scope(|| Self::spawn(command, Command::new(command).args(args), timeout));

        match res {
            Ok(this) => Ok(this),
            Err(e) => match e.kind() {
                std::io::ErrorKind::NotFound => Err(ProcessError::NotFound(command)),
                std::io::ErrorKind::PermissionDenied => {
                    Err(ProcessError::PermissionDenied(command))
                }
                std::io::ErrorKind::WouldBlock => Err(ProcessError::LimitReached),
                _ => Err(ProcessError::Other(e)),
            },
        }
    }

    fn spawn(command: &'static str, cmd: &mut Command, timeout: u64) -> std::io::Result<Self> {
        tracing::trace_span!(parent: None, "Spawn command", %command).in_scope(|| {
            let guard = MetricsGuard::guard(command);

            let cmd = cmd
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            cmd.spawn().map(|child| Process {
                command,
                child,
                guard,
                timeout: Duration::from_secs(timeout),
            })
        })
    }

    /// Wait for the child to exit, collecting everything it wrote
    ///
    /// A child that outlives the timeout is killed when its handle is dropped
    #[tracing::instrument(skip(self), fields(command = self.command))]
    pub(crate) async fn output(self) -> Result<Output, ProcessError> {
        let Process {
            command,
            child,
            guard,
            timeout,
        } = self;

        match child.wait_with_output().with_timeout(timeout).await {
            Ok(Ok(output)) if output.status.success() => {
                guard.disarm();

                Ok(output)
            }
            Ok(Ok(output)) => Err(ProcessError::Status {
                command,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
            Ok(Err(e)) => Err(ProcessError::Other(e)),
            Err(_) => Err(ProcessError::Timeout(command)),
        }
    }
}
