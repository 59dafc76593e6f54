//! Selecting registered runs from the command line and playing them back.

use crate::config::Options;
use crate::error::DemoError;
use crate::run::{Hook, Run};
use clap::{Arg, ArgAction, ArgMatches, Args, Command, FromArgMatches};
use std::ffi::OsString;
use std::io;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Command-line flags shared by every demo.
///
/// Each registered run adds one more boolean flag on top of these.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    /// Run all demos
    #[arg(short = 'l', long)]
    pub all: bool,

    /// Run the demos continuously without any end
    #[arg(short, long)]
    pub continuously: bool,

    #[command(flatten)]
    pub options: Options,
}

/// Which runs to execute, and whether to repeat them forever.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub all: bool,
    pub continuously: bool,
    /// Run names or registration indices.
    pub runs: Vec<String>,
}

impl Selection {
    /// Select every registered run.
    pub fn all() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }

    /// Select runs by name or registration index.
    pub fn runs<I>(runs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            runs: runs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Repeat the selection until cancelled or failed.
    pub fn continuously(mut self) -> Self {
        self.continuously = true;
        self
    }

    pub fn selects(&self, index: usize, name: &str) -> bool {
        self.all
            || self
                .runs
                .iter()
                .any(|run| run == name || *run == index.to_string())
    }
}

/// How a [`Demo::run`] ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Interrupted,
}

struct Registration {
    run: Run,
    name: String,
    description: String,
}

/// A collection of named runs behind a command-line interface.
///
/// The process-wide setup and cleanup hooks are fixed while building the demo
/// and wrap every selected run individually.
///
/// ```no_run
/// use termdemo::{Demo, Run};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let mut run = Run::new("Title", ["Some description"]);
///     run.step(["Print a greeting"], ["echo hello world"]);
///
///     let mut demo = Demo::new("greeting").about("Say hello");
///     demo.add(run, "hello", "the greeting demo")?;
///     demo.run().await?;
///     Ok(())
/// }
/// ```
pub struct Demo {
    name: String,
    about: Option<String>,
    runs: Vec<Registration>,
    setup: Hook,
    cleanup: Hook,
}

impl Demo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: None,
            runs: Vec::new(),
            setup: Box::new(|| Ok(())),
            cleanup: Box::new(|| Ok(())),
        }
    }

    /// Usage text shown in `--help`.
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Set the function called before each selected run.
    pub fn with_setup<F>(mut self, setup: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        self.setup = Box::new(setup);
        self
    }

    /// Set the function called after each selected run, and once on interrupt.
    pub fn with_cleanup<F>(mut self, cleanup: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        self.cleanup = Box::new(cleanup);
        self
    }

    /// Register `run`, selectable with `--<name>` or with its index (`--0`, `--1`, ...).
    pub fn add(
        &mut self,
        run: Run,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<&mut Self, DemoError> {
        let name = name.into();
        self.validate_name(&name)?;
        self.runs.push(Registration {
            run,
            name,
            description: description.into(),
        });
        Ok(self)
    }

    fn validate_name(&self, name: &str) -> Result<(), DemoError> {
        if name.is_empty() || name.starts_with('-') || name.contains(char::is_whitespace) {
            return Err(DemoError::Config(format!("invalid run name `{name}`")));
        }
        if name.chars().all(|c| c.is_ascii_digit()) {
            return Err(DemoError::Config(format!(
                "run name `{name}` clashes with run indices"
            )));
        }
        if reserved_flags().iter().any(|flag| flag == name) {
            return Err(DemoError::Config(format!(
                "run name `{name}` clashes with a built-in flag"
            )));
        }
        if self.runs.iter().any(|registration| registration.name == name) {
            return Err(DemoError::Config(format!("run `{name}` registered twice")));
        }
        Ok(())
    }

    /// Names of the registered runs, in registration order.
    pub fn run_names(&self) -> impl Iterator<Item = &str> {
        self.runs.iter().map(|registration| registration.name.as_str())
    }

    /// The command-line interface: the shared flags plus one flag per run.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(self.name.clone());
        if let Some(about) = &self.about {
            cmd = cmd.about(about.clone());
        }
        let mut cmd = Cli::augment_args(cmd);
        for (index, registration) in self.runs.iter().enumerate() {
            cmd = cmd.arg(
                Arg::new(registration.name.clone())
                    .long(registration.name.clone())
                    .visible_alias(index.to_string())
                    .help(registration.description.clone())
                    .action(ArgAction::SetTrue),
            );
        }
        cmd
    }

    /// Recover the selection and options from parsed flags.
    pub fn selection_from(&self, matches: &ArgMatches) -> Result<(Selection, Options), DemoError> {
        let cli = Cli::from_arg_matches(matches)?;
        let runs = self
            .runs
            .iter()
            .filter(|registration| matches.get_flag(&registration.name))
            .map(|registration| registration.name.clone())
            .collect();
        let selection = Selection {
            all: cli.all,
            continuously: cli.continuously,
            runs,
        };
        Ok((selection, cli.options))
    }

    /// Execute the selected runs in registration order.
    ///
    /// Every run is wrapped in the process-wide setup and cleanup hooks. The
    /// first error, including a failing cleanup, stops the whole batch. In
    /// continuous mode the batch repeats until an error or cancellation.
    pub async fn execute(
        &mut self,
        selection: &Selection,
        options: &Options,
        cancel: &CancellationToken,
    ) -> Result<(), DemoError> {
        let selected: Vec<usize> = self
            .runs
            .iter()
            .enumerate()
            .filter(|(index, registration)| selection.selects(*index, &registration.name))
            .map(|(index, _)| index)
            .collect();

        if selected.is_empty() {
            if !selection.continuously {
                debug!("no runs selected");
                return Ok(());
            }
            info!("no runs selected, waiting for interrupt");
            cancel.cancelled().await;
            return Err(DemoError::Cancelled);
        }

        loop {
            self.execute_batch(&selected, options, cancel).await?;
            if !selection.continuously {
                return Ok(());
            }
        }
    }

    async fn execute_batch(
        &mut self,
        selected: &[usize],
        options: &Options,
        cancel: &CancellationToken,
    ) -> Result<(), DemoError> {
        for &index in selected {
            if cancel.is_cancelled() {
                return Err(DemoError::Cancelled);
            }

            (self.setup)().map_err(DemoError::Setup)?;

            let registration = &mut self.runs[index];
            info!(run = %registration.name, "executing run");
            registration
                .run
                .execute_with(options, cancel)
                .await
                .map_err(|err| err.in_run(&registration.name))?;

            (self.cleanup)().map_err(DemoError::Cleanup)?;
        }
        Ok(())
    }

    /// Parse the process arguments and play back the selected runs.
    ///
    /// Exits the process on `--help`, `--version` or invalid flags, like any
    /// clap program.
    pub async fn run(self) -> Result<Outcome, DemoError> {
        let matches = self.command().get_matches();
        self.run_matches(matches).await
    }

    /// Like [`Demo::run`], with explicit arguments and clap errors returned.
    pub async fn run_from<I, T>(self, args: I) -> Result<Outcome, DemoError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command().try_get_matches_from(args)?;
        self.run_matches(matches).await
    }

    async fn run_matches(mut self, matches: ArgMatches) -> Result<Outcome, DemoError> {
        let (selection, options) = self.selection_from(&matches)?;

        let cancel = CancellationToken::new();
        // Registered before executing so an early Ctrl-C is never lost.
        let listener = match Interrupt::listen() {
            Ok(interrupt) => Some(tokio::spawn(cancel_on_interrupt(interrupt, cancel.clone()))),
            Err(err) => {
                warn!("unable to listen for interrupt: {err}");
                None
            }
        };

        let result = self.execute(&selection, &options, &cancel).await;
        if let Some(listener) = listener {
            listener.abort();
        }

        self.conclude(result)
    }

    /// Map an execution result to an outcome, cleaning up after an interrupt.
    fn conclude(&mut self, result: Result<(), DemoError>) -> Result<Outcome, DemoError> {
        match result {
            Ok(()) => Ok(Outcome::Completed),
            Err(err) if err.is_cancelled() => {
                info!("interrupted, cleaning up");
                if let Err(err) = (self.cleanup)() {
                    warn!("unable to cleanup: {err:#}");
                }
                Ok(Outcome::Interrupted)
            }
            Err(err) => Err(err),
        }
    }
}

/// A Ctrl-C listener whose signal handler is installed on creation.
struct Interrupt {
    #[cfg(unix)]
    inner: tokio::signal::unix::Signal,
    #[cfg(windows)]
    inner: tokio::signal::windows::CtrlC,
}

impl Interrupt {
    fn listen() -> io::Result<Self> {
        #[cfg(unix)]
        let inner = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;
        #[cfg(windows)]
        let inner = tokio::signal::windows::ctrl_c()?;
        Ok(Interrupt { inner })
    }

    async fn recv(&mut self) -> Option<()> {
        self.inner.recv().await
    }
}

async fn cancel_on_interrupt(mut interrupt: Interrupt, cancel: CancellationToken) {
    if interrupt.recv().await.is_some() {
        info!("received interrupt");
        cancel.cancel();
    }
}

/// Long flag names a run may not take.
fn reserved_flags() -> Vec<String> {
    let cmd = Cli::augment_args(Command::new("demo"));
    let mut flags = vec!["help".to_string(), "version".to_string()];
    for arg in cmd.get_arguments() {
        flags.push(arg.get_id().as_str().to_string());
        if let Some(long) = arg.get_long() {
            flags.push(long.to_string());
        }
    }
    flags
}
