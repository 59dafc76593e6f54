use crate::config::Options;
use crate::context::Context;
use crate::error::DemoError;
use crate::exec::{Executor, ShellExecutor};
use crate::input::LineReader;
use crate::step::Step;
use std::io::{self, Write};
use tokio::io::AsyncBufRead;
use tokio_util::sync::CancellationToken;
use tracing::info;
use unicode_width::UnicodeWidthStr;

/// Callback invoked around an execution.
pub type Hook = Box<dyn FnMut() -> anyhow::Result<()> + Send>;

fn noop() -> Hook {
    Box::new(|| Ok(()))
}

/// A titled, ordered sequence of steps: one demo scenario.
pub struct Run {
    title: String,
    description: Vec<String>,
    steps: Vec<Step>,
    out: Box<dyn Write + Send>,
    input: Box<dyn AsyncBufRead + Unpin + Send>,
    executor: Box<dyn Executor>,
    setup: Hook,
    cleanup: Hook,
}

impl Run {
    /// Create a run writing to stdout and advancing on lines read from stdin.
    pub fn new<D>(title: impl Into<String>, description: D) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Run {
            title: title.into(),
            description: description.into_iter().map(Into::into).collect(),
            steps: Vec::new(),
            out: Box::new(io::stdout()),
            input: Box::new(LineReader::stdin()),
            executor: Box::new(ShellExecutor),
            setup: noop(),
            cleanup: noop(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &[String] {
        &self.description
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Append a step.
    pub fn push(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Append a step with narration and a command. Either may be empty.
    pub fn step<T, C>(&mut self, text: T, command: C) -> &mut Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        self.push(Step::new(text, command))
    }

    /// Append a step whose command may fail without aborting the run.
    pub fn step_can_fail<T, C>(&mut self, text: T, command: C) -> &mut Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        self.push(Step::new(text, command).allow_failure())
    }

    /// Append a breakpoint.
    pub fn breakpoint(&mut self) -> &mut Self {
        self.push(Step::breakpoint())
    }

    /// Set the function called before this run.
    pub fn setup<F>(&mut self, setup: F) -> &mut Self
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        self.setup = Box::new(setup);
        self
    }

    /// Set the function called after this run completes successfully.
    pub fn cleanup<F>(&mut self, cleanup: F) -> &mut Self
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        self.cleanup = Box::new(cleanup);
        self
    }

    /// Replace the default stdout output.
    pub fn set_output(&mut self, out: impl Write + Send + 'static) -> &mut Self {
        self.out = Box::new(out);
        self
    }

    /// Replace the interactive input used to advance steps.
    pub fn set_input(&mut self, input: impl AsyncBufRead + Unpin + Send + 'static) -> &mut Self {
        self.input = Box::new(input);
        self
    }

    /// Replace the executor used for step commands.
    pub fn set_executor(&mut self, executor: impl Executor + 'static) -> &mut Self {
        self.executor = Box::new(executor);
        self
    }

    /// Execute the run with the provided options.
    pub async fn execute(&mut self, options: &Options) -> Result<(), DemoError> {
        self.execute_with(options, &CancellationToken::new()).await
    }

    /// Execute the run, returning [`DemoError::Cancelled`] as soon as `cancel`
    /// fires at a suspension point.
    ///
    /// The cleanup hook only runs after every step succeeded.
    pub async fn execute_with(
        &mut self,
        options: &Options,
        cancel: &CancellationToken,
    ) -> Result<(), DemoError> {
        let options = options.normalized();

        (self.setup)().map_err(DemoError::Setup)?;

        info!(title = %self.title, steps = self.steps.len(), "starting run");
        let mut ctx = Context::new(
            &options,
            self.out.as_mut(),
            self.input.as_mut(),
            self.executor.as_ref(),
            cancel,
        );

        print_title_and_description(&mut ctx, &self.title, &self.description)?;

        let total = self.steps.len();
        for (i, step) in self.steps.iter().enumerate().skip(options.skip_steps) {
            step.execute(&mut ctx, i + 1, total, options.continue_on_error)
                .await?;
        }
        drop(ctx);

        (self.cleanup)().map_err(DemoError::Cleanup)
    }
}

fn print_title_and_description(
    ctx: &mut Context<'_>,
    title: &str,
    description: &[String],
) -> Result<(), DemoError> {
    let palette = ctx.palette;
    ctx.emit(&format!("{}\n", palette.title(title)))?;
    ctx.emit(&palette.title(&"=".repeat(title.width())))?;
    ctx.emit("\n")?;

    if !ctx.options.hide_descriptions {
        for line in description {
            ctx.emit(&format!("{}\n", palette.narration(line)))?;
        }
        ctx.emit("\n")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn options() -> Options {
        Options {
            no_color: true,
            ..Options::unattended()
        }
    }

    #[tokio::test]
    async fn test_title_underline_matches_width() {
        let capture = Capture::default();
        let mut run = Run::new("Démo", ["first", "second"]);
        run.set_output(capture.clone());
        run.execute(&options()).await.unwrap();
        assert_eq!(capture.text(), "Démo\n====\nfirst\nsecond\n\n");
    }

    #[tokio::test]
    async fn test_empty_title() {
        let capture = Capture::default();
        let mut run = Run::new("", Vec::<String>::new());
        run.set_output(capture.clone());
        run.execute(&options()).await.unwrap();
        assert_eq!(capture.text(), "\n\n\n");
    }

    #[tokio::test]
    async fn test_hidden_description() {
        let capture = Capture::default();
        let mut run = Run::new("Title", ["hidden"]);
        run.set_output(capture.clone());
        let options = Options {
            hide_descriptions: true,
            ..options()
        };
        run.execute(&options).await.unwrap();
        assert_eq!(capture.text(), "Title\n=====\n");
    }

    #[tokio::test]
    async fn test_builder_appends_in_order() {
        let mut run = Run::new("Title", ["desc"]);
        run.step(["one"], ["echo one"])
            .step_can_fail(["two"], ["exit 1"])
            .breakpoint()
            .push(Step::narration(["three"]));

        let steps = run.steps();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0].text(), ["one"]);
        assert!(!steps[0].can_fail());
        assert!(steps[1].can_fail());
        assert!(steps[2].is_breakpoint());
        assert!(steps[3].command_lines().is_empty());
    }
}
