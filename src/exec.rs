//! Running step commands in a shell.

use crate::error::ExecError;
use anyhow::{Context as _, Result, bail};
use async_trait::async_trait;
use std::io::Write;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Runs one command line to completion.
///
/// [`ShellExecutor`] is the implementation used by default. Swap it on a
/// [`Run`](crate::Run) to observe or fake command execution.
#[async_trait(?Send)]
pub trait Executor: Send + Sync {
    /// Run `command` with `shell`, streaming everything it prints into `out`.
    async fn execute(
        &self,
        shell: &str,
        command: &str,
        out: &mut (dyn Write + Send),
        cancel: &CancellationToken,
    ) -> Result<(), ExecError>;
}

/// Executes commands as `<shell> -c <command>` with stdin closed.
///
/// Stdout and stderr are forwarded to the sink chunk by chunk as they arrive.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellExecutor;

#[async_trait(?Send)]
impl Executor for ShellExecutor {
    async fn execute(
        &self,
        shell: &str,
        command: &str,
        out: &mut (dyn Write + Send),
        cancel: &CancellationToken,
    ) -> Result<(), ExecError> {
        debug!(shell, command, "spawning command");
        let mut child = Command::new(shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecError::Spawn {
                shell: shell.to_string(),
                source,
            })?;

        let mut stdout = child.stdout.take();
        let mut stderr = child.stderr.take();
        let mut out_buf = [0u8; 4096];
        let mut err_buf = [0u8; 4096];

        while stdout.is_some() || stderr.is_some() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    let _ = child.kill().await;
                    return Err(ExecError::Cancelled);
                }
                read = read_some(&mut stdout, &mut out_buf), if stdout.is_some() => {
                    forward(read, &out_buf, &mut stdout, out)?;
                }
                read = read_some(&mut stderr, &mut err_buf), if stderr.is_some() => {
                    forward(read, &err_buf, &mut stderr, out)?;
                }
            }
        }

        let status = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let _ = child.kill().await;
                return Err(ExecError::Cancelled);
            }
            status = child.wait() => status,
        };
        check_status(status)
    }
}

fn check_status(status: std::io::Result<ExitStatus>) -> Result<(), ExecError> {
    let status = status.map_err(ExecError::Wait)?;
    if status.success() {
        Ok(())
    } else {
        Err(ExecError::Exit {
            code: status.code(),
        })
    }
}

async fn read_some<R>(reader: &mut Option<R>, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    match reader {
        Some(reader) => reader.read(buf).await,
        None => Ok(0),
    }
}

/// Copy one read result into the sink, closing the stream on EOF.
fn forward<R>(
    read: std::io::Result<usize>,
    buf: &[u8],
    stream: &mut Option<R>,
    out: &mut (dyn Write + Send),
) -> Result<(), ExecError> {
    match read {
        Ok(0) => {
            *stream = None;
            Ok(())
        }
        Err(err) => {
            *stream = None;
            Err(ExecError::Output(err))
        }
        Ok(n) => {
            out.write_all(&buf[..n]).map_err(ExecError::Output)?;
            out.flush().map_err(ExecError::Output)
        }
    }
}

/// Run helper commands with `sh -c` in order, discarding their output.
///
/// Stops at the first failing command. Meant for setup and cleanup hooks.
pub async fn ensure(commands: &[&str]) -> Result<()> {
    ensure_with_cancel(commands, &CancellationToken::new()).await
}

/// Like [`ensure`], but aborts as soon as `cancel` fires.
pub async fn ensure_with_cancel(commands: &[&str], cancel: &CancellationToken) -> Result<()> {
    for command in commands {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn: {}", command))?;

        let status = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let _ = child.kill().await;
                bail!("Cancelled while running: {}", command);
            }
            status = child.wait() => status.with_context(|| format!("Failed to wait for: {}", command))?,
        };

        if !status.success() {
            bail!("run command `{}`: exited with {}", command, status);
        }
    }
    Ok(())
}
