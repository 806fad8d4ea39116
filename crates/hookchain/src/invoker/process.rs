// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Child-process handler execution.

use super::{HandlerInvoker, HandlerOutput, InvokeFuture, Invocation};
use crate::error::InvokeError;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinError;
use tokio::time::Instant;

/// Runs each handler as a child process, payload on stdin.
#[derive(Clone, Debug, Default)]
pub struct ProcessInvoker {
    /// Run handlers through this program (`/bin/sh guard.sh`) instead of
    /// executing them directly
    interpreter: Option<PathBuf>,
    working_dir: Option<PathBuf>,
}

impl ProcessInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<PathBuf>) -> Self {
        self.interpreter = Some(interpreter.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    async fn run(&self, invocation: Invocation) -> Result<HandlerOutput, InvokeError> {
        let mut command = match &self.interpreter {
            Some(interpreter) => {
                let mut command = Command::new(interpreter);
                command.arg(&invocation.handler);
                command
            }
            None => Command::new(&invocation.handler),
        };
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                InvokeError::Spawn(format!("{}: {e}", invocation.handler.display()))
            })?;
        let mut group = ProcessGroup::of(&child);

        // Drain both pipes concurrently so a chatty handler cannot block on
        // a full pipe while we wait for it to exit.
        let mut stdout_task = tokio::spawn(read_all(child.stdout.take()));
        let mut stderr_task = tokio::spawn(read_all(child.stderr.take()));
        let stdin = child.stdin.take();

        let deadline = Instant::now() + invocation.timeout;
        let input = invocation.input;
        let finished = tokio::time::timeout_at(deadline, async {
            if let Some(mut stdin) = stdin {
                match stdin.write_all(input.as_bytes()).await {
                    Ok(()) => {}
                    // Handler exited without reading its input
                    Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
                    Err(e) => return Err(InvokeError::Io(e.to_string())),
                }
                drop(stdin);
            }
            child
                .wait()
                .await
                .map_err(|e| InvokeError::Io(e.to_string()))
        })
        .await;

        let status = match finished {
            Ok(status) => status,
            Err(_) => {
                group.kill();
                let _ = child.kill().await;
                stdout_task.abort();
                stderr_task.abort();
                return Err(InvokeError::Timeout(invocation.timeout));
            }
        };
        let status = match status {
            Ok(status) => status,
            Err(e) => {
                stdout_task.abort();
                stderr_task.abort();
                return Err(e);
            }
        };

        // A background process forked by the handler can keep the pipes open
        // past its exit; the deadline still applies.
        let drained = tokio::time::timeout_at(deadline, async {
            ((&mut stdout_task).await, (&mut stderr_task).await)
        })
        .await;
        let (stdout, stderr) = match drained {
            Ok(pair) => pair,
            Err(_) => {
                group.kill();
                stdout_task.abort();
                stderr_task.abort();
                return Err(InvokeError::Timeout(invocation.timeout));
            }
        };
        group.release();

        Ok(HandlerOutput {
            exit_code: status.code(),
            stdout: collect(stdout)?,
            stderr: collect(stderr)?,
        })
    }
}

impl HandlerInvoker for ProcessInvoker {
    fn invoke(&self, invocation: Invocation) -> InvokeFuture<'_> {
        Box::pin(self.run(invocation))
    }
}

/// The handler's process group. Killed on drop unless released, so a
/// timed-out or cancelled handler takes its descendants down with it.
struct ProcessGroup {
    #[cfg(unix)]
    pgid: Option<nix::unistd::Pid>,
}

impl ProcessGroup {
    #[cfg(unix)]
    fn of(child: &tokio::process::Child) -> Self {
        let pgid = child
            .id()
            .and_then(|id| i32::try_from(id).ok())
            .map(nix::unistd::Pid::from_raw);
        Self { pgid }
    }

    #[cfg(not(unix))]
    fn of(_child: &tokio::process::Child) -> Self {
        Self {}
    }

    fn kill(&mut self) {
        #[cfg(unix)]
        if let Some(pgid) = self.pgid.take() {
            if let Err(e) = nix::sys::signal::killpg(pgid, nix::sys::signal::Signal::SIGKILL) {
                if e != nix::errno::Errno::ESRCH {
                    tracing::warn!(pgid = pgid.as_raw(), error = %e, "failed to kill handler process group");
                }
            }
        }
    }

    /// The handler finished normally; leave anything it detached alone.
    fn release(&mut self) {
        #[cfg(unix)]
        {
            self.pgid = None;
        }
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

async fn read_all<R>(reader: Option<R>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

fn collect(joined: Result<std::io::Result<Vec<u8>>, JoinError>) -> Result<String, InvokeError> {
    let bytes = joined
        .map_err(|e| InvokeError::Io(e.to_string()))?
        .map_err(|e| InvokeError::Io(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
