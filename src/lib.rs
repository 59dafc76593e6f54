//! # Termdemo
//!
//! A framework for scripted, narrated terminal demonstrations.
//!
//! A demo is made of [`Run`]s: titled, ordered sequences of [`Step`]s. Each
//! step pairs a human readable description with a shell command, either of
//! which may be omitted. Playback waits for the presenter to press enter
//! before every step and again before every command, or sleeps for a fixed
//! delay in auto mode. Text appears with a typewriter effect.
//!
//! ## Quick start
//!
//! ```no_run
//! use termdemo::{Demo, Outcome, Run};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut run = Run::new("Title", ["Some additional", "multiline description"]);
//!     run.step(["This is a possible", "description of the command"], ["echo hello world"]);
//!     run.push(termdemo::Step::command(["echo without description"]));
//!     run.push(termdemo::Step::narration(["Just a description without a command"]));
//!
//!     let mut demo = Demo::new("demo").about("Learn how this framework is being used");
//!     demo.add(run, "example", "an example run")?;
//!
//!     if demo.run().await? == Outcome::Interrupted {
//!         eprintln!("interrupted");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Running the resulting binary with `--example` (or `--0`, or `--all`)
//! plays the run back.
//!
//! ## Command-line flags
//!
//! | Flag | Description |
//! |------|-------------|
//! | `-l, --all` | Run every registered run |
//! | `-a, --auto` | Advance automatically instead of waiting for enter |
//! | `-t, --auto-timeout 1s` | Delay between steps in auto mode (`ms` or `s`) |
//! | `--with-breakpoints` | Pause on breakpoints |
//! | `--continue-on-error` | Keep going when a command fails |
//! | `-c, --continuously` | Repeat the selected runs until interrupted |
//! | `--dry-run` | Print commands without executing them |
//! | `-d, --hide-descriptions` | Hide the narration |
//! | `-i, --immediate` | Disable the typewriter effect |
//! | `--no-color` | Print without colors |
//! | `-s, --skip-steps N` | Skip the first `N` steps of each run |
//! | `--shell bash` | Shell used to execute commands |
//! | `--typewriter-speed 40` | Maximum milliseconds per typed character |
//!
//! ## Executing a run directly
//!
//! [`Run::execute`] plays a single run with explicit [`Options`], writing to
//! any sink:
//!
//! ```no_run
//! use termdemo::{Options, Run};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let captured = std::sync::Arc::new(std::sync::Mutex::new(Vec::<u8>::new()));
//!
//!     struct Sink(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);
//!     impl std::io::Write for Sink {
//!         fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
//!             self.0.lock().unwrap().extend_from_slice(buf);
//!             Ok(buf.len())
//!         }
//!         fn flush(&mut self) -> std::io::Result<()> {
//!             Ok(())
//!         }
//!     }
//!
//!     let mut run = Run::new("Title", ["description"]);
//!     run.step(["desc"], ["echo hello world"]);
//!     run.set_output(Sink(captured.clone()));
//!     run.execute(&Options::unattended()).await?;
//!
//!     println!("{}", String::from_utf8_lossy(&captured.lock().unwrap()));
//!     Ok(())
//! }
//! ```
//!
//! ## Interrupts
//!
//! [`Demo::run`] listens for Ctrl-C while playing. An interrupt cancels the
//! current wait, sleep or command, runs the demo's cleanup hook once and
//! returns [`Outcome::Interrupted`]. Nothing exits the process on its own,
//! and returning from `main` afterwards does not wait for the presenter:
//! stdin is read by [`LineReader`] on a detached thread.

pub mod config;
pub mod context;
pub mod demo;
pub mod error;
pub mod exec;
pub mod input;
pub mod logging;
pub mod run;
pub mod step;
pub mod style;
pub mod typewriter;

pub use config::Options;
pub use context::Context;
pub use demo::{Cli, Demo, Outcome, Selection};
pub use error::{DemoError, ExecError};
pub use exec::{Executor, ShellExecutor, ensure, ensure_with_cancel};
pub use input::LineReader;
pub use run::{Hook, Run};
pub use step::Step;
pub use style::Palette;
pub use typewriter::Typewriter;
pub use tokio_util::sync::CancellationToken;
