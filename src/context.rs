//! The [`Context`] type steps receive when executed.

use crate::config::Options;
use crate::error::{DemoError, ExecError};
use crate::exec::Executor;
use crate::style::Palette;
use crate::typewriter::Typewriter;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Marker written while waiting for the presenter to advance.
pub const WAIT_MARKER: &str = "…";

/// Marker written while paused on a breakpoint.
pub const BREAKPOINT_MARKER: &str = "bp";

/// Moves the cursor one line up, over the marker line.
pub const CURSOR_UP: &str = "\x1b[1A";

/// Read-only execution context passed to [`Step::execute`](crate::Step::execute).
///
/// Bundles the playback options with the output sink, the interactive input
/// the presenter advances with, the command executor and the cancellation
/// token observed at every suspension point.
pub struct Context<'a> {
    pub(crate) options: &'a Options,
    pub(crate) palette: Palette,
    pub(crate) typewriter: Typewriter,
    out: &'a mut (dyn Write + Send),
    input: &'a mut (dyn AsyncBufRead + Unpin + Send),
    executor: &'a dyn Executor,
    cancel: &'a CancellationToken,
}

impl<'a> Context<'a> {
    pub fn new(
        options: &'a Options,
        out: &'a mut (dyn Write + Send),
        input: &'a mut (dyn AsyncBufRead + Unpin + Send),
        executor: &'a dyn Executor,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            options,
            palette: Palette::new(!options.no_color),
            typewriter: Typewriter::from_options(options),
            out,
            input,
            executor,
            cancel,
        }
    }

    pub fn options(&self) -> &Options {
        self.options
    }

    /// Write text to the output sink as-is.
    pub fn emit(&mut self, text: &str) -> Result<(), DemoError> {
        self.out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(DemoError::Output)
    }

    /// Write lines through the typewriter.
    pub async fn render<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<(), DemoError> {
        self.typewriter
            .render(self.out, lines)
            .await
            .map_err(DemoError::Output)
    }

    /// Wait before moving on: sleep in auto mode, otherwise block until the
    /// presenter presses enter.
    pub async fn pace(&mut self) -> Result<(), DemoError> {
        if self.options.auto {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(DemoError::Cancelled),
                _ = sleep(self.options.auto_timeout) => Ok(()),
            }
        } else {
            self.await_line(WAIT_MARKER).await
        }
    }

    /// Block on a breakpoint until the presenter presses enter.
    pub async fn await_breakpoint(&mut self) -> Result<(), DemoError> {
        self.await_line(BREAKPOINT_MARKER).await
    }

    /// Run `command` with the configured shell, streaming into the sink.
    pub async fn run_command(&mut self, command: &str) -> Result<(), ExecError> {
        self.executor
            .execute(&self.options.shell, command, self.out, self.cancel)
            .await
    }

    async fn await_line(&mut self, marker: &str) -> Result<(), DemoError> {
        self.emit(marker)?;

        let cancel = self.cancel;
        let mut line = String::new();
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DemoError::Cancelled),
            read = self.input.read_line(&mut line) => read.map_err(DemoError::Input)?,
        };
        if read == 0 {
            return Err(DemoError::Input(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            )));
        }

        self.emit(CURSOR_UP)
    }
}
