//! A single narrated unit of a run, optionally paired with a command.

use crate::context::Context;
use crate::error::DemoError;
use tracing::debug;

/// Separator shown between command lines, rendering them as shell continuations.
const LINE_CONTINUATION: &str = " \\\n    ";

/// One step of a [`Run`](crate::Run).
///
/// A step without narration, command or breakpoint is a legal no-op that
/// still consumes one pacing cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Step {
    text: Vec<String>,
    command: Vec<String>,
    can_fail: bool,
    breakpoint: bool,
}

impl Step {
    /// A step with narration and a command. Either may be empty.
    pub fn new<T, C>(text: T, command: C) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            text: text.into_iter().map(Into::into).collect(),
            command: command.into_iter().map(Into::into).collect(),
            can_fail: false,
            breakpoint: false,
        }
    }

    /// A narration-only step.
    pub fn narration<T>(text: T) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self::new(text, Vec::<String>::new())
    }

    /// A step running a command without narration.
    pub fn command<C>(command: C) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self::new(Vec::<String>::new(), command)
    }

    /// A step pausing playback when breakpoints are enabled.
    pub fn breakpoint() -> Self {
        Self {
            can_fail: true,
            breakpoint: true,
            ..Self::default()
        }
    }

    /// Let the command fail without aborting the run.
    pub fn allow_failure(mut self) -> Self {
        self.can_fail = true;
        self
    }

    pub fn text(&self) -> &[String] {
        &self.text
    }

    pub fn command_lines(&self) -> &[String] {
        &self.command
    }

    pub fn can_fail(&self) -> bool {
        self.can_fail
    }

    pub fn is_breakpoint(&self) -> bool {
        self.breakpoint
    }

    /// Execute the step as step `current` of `total`.
    ///
    /// `force_can_fail` tolerates a failing command even if the step itself
    /// does not, which is how continue-on-error is applied.
    pub async fn execute(
        &self,
        ctx: &mut Context<'_>,
        current: usize,
        total: usize,
        force_can_fail: bool,
    ) -> Result<(), DemoError> {
        debug!(current, total, "executing step");
        ctx.pace().await?;

        if !self.text.is_empty() && !ctx.options.hide_descriptions {
            let narration = self.narration_lines(ctx, current, total);
            ctx.render(narration.as_slice()).await?;
        }

        if self.breakpoint {
            if ctx.options.breakpoints {
                ctx.await_breakpoint().await?;
            }
            return Ok(());
        }

        if self.command.is_empty() {
            return Ok(());
        }

        let display = ctx
            .palette
            .command(&format!("> {}", self.command.join(LINE_CONTINUATION)));
        ctx.render(&[display]).await?;

        ctx.pace().await?;

        if ctx.options.dry_run {
            return Ok(());
        }

        let result = ctx.run_command(&self.command.join(" ")).await;
        ctx.render(&[""]).await?;

        match result {
            Ok(()) => Ok(()),
            Err(err) if err.is_cancelled() => Err(DemoError::Cancelled),
            Err(err) if self.can_fail || force_can_fail => {
                debug!(current, error = %err, "ignoring failed command");
                Ok(())
            }
            Err(source) => Err(DemoError::Command {
                step: current,
                source,
            }),
        }
    }

    /// `# line` for every narration line, with the progress marker on the last
    /// one and a trailing colon only if a command follows.
    fn narration_lines(&self, ctx: &Context<'_>, current: usize, total: usize) -> Vec<String> {
        let last = self.text.len() - 1;
        self.text
            .iter()
            .enumerate()
            .map(|(i, line)| {
                if i == last {
                    let colon = if self.command.is_empty() { "" } else { ":" };
                    format!(
                        "{}\n",
                        ctx.palette
                            .narration(&format!("# {line} [{current}/{total}]{colon}"))
                    )
                } else {
                    ctx.palette.narration(&format!("# {line}"))
                }
            })
            .collect()
    }
}
