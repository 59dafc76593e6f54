//! Playback configuration and the command-line flags that produce it.

use anyhow::{Context as _, Result, anyhow};
use clap::Args;
use std::time::Duration;

/// Shell used when none is configured.
pub const DEFAULT_SHELL: &str = "bash";

/// Default ceiling, in milliseconds, of the per-character typewriter delay.
pub const DEFAULT_TYPEWRITER_SPEED: u64 = 40;

/// Options controlling how a [`Run`](crate::Run) is played back.
///
/// Built by hand or recovered from parsed flags through clap's
/// `FromArgMatches`. Executions always work on [`Options::normalized`].
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Run the demo in automatic mode, where every step gets executed automatically
    #[arg(short, long)]
    pub auto: bool,

    /// The timeout to be waited when `auto` is enabled
    #[arg(short = 't', long, value_parser = parse_duration, default_value = "1s")]
    pub auto_timeout: Duration,

    /// Pause on breakpoints
    #[arg(long = "with-breakpoints")]
    pub breakpoints: bool,

    /// Continue if a step fails
    #[arg(long)]
    pub continue_on_error: bool,

    /// Run the demo and only print the commands
    #[arg(long)]
    pub dry_run: bool,

    /// Hide descriptions between the steps
    #[arg(short = 'd', long)]
    pub hide_descriptions: bool,

    /// Immediately output without the typewriter animation
    #[arg(short, long)]
    pub immediate: bool,

    /// Print without colors, for writing into a file
    #[arg(long)]
    pub no_color: bool,

    /// Skip the given amount of initial steps within the demo
    #[arg(short, long, default_value_t = 0)]
    pub skip_steps: usize,

    /// The shell used to execute the command(s)
    #[arg(long, default_value = DEFAULT_SHELL)]
    pub shell: String,

    /// Maximum milliseconds per character for the typewriter animation
    #[arg(long, default_value_t = DEFAULT_TYPEWRITER_SPEED)]
    pub typewriter_speed: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            auto: false,
            auto_timeout: Duration::from_secs(1),
            breakpoints: false,
            continue_on_error: false,
            dry_run: false,
            hide_descriptions: false,
            immediate: false,
            no_color: false,
            skip_steps: 0,
            shell: DEFAULT_SHELL.to_string(),
            typewriter_speed: DEFAULT_TYPEWRITER_SPEED,
        }
    }
}

impl Options {
    /// Options for unattended playback: auto mode, no pause, no typewriter delay.
    pub fn unattended() -> Self {
        Self {
            auto: true,
            auto_timeout: Duration::ZERO,
            immediate: true,
            ..Self::default()
        }
    }

    /// Return a copy with empty or zero values replaced by their defaults.
    pub fn normalized(&self) -> Self {
        let mut options = self.clone();
        if options.shell.trim().is_empty() {
            options.shell = DEFAULT_SHELL.to_string();
        }
        if options.typewriter_speed == 0 {
            options.typewriter_speed = DEFAULT_TYPEWRITER_SPEED;
        }
        options
    }
}

/// Parse a duration string: `1s`, `500ms`, `1.5s`.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if let Some(ms_str) = s.strip_suffix("ms") {
        let ms: u64 = ms_str
            .trim()
            .parse()
            .context("Invalid milliseconds value")?;
        Ok(Duration::from_millis(ms))
    } else if let Some(s_str) = s.strip_suffix('s') {
        let secs: f64 = s_str.trim().parse().context("Invalid seconds value")?;
        Duration::try_from_secs_f64(secs).context("Seconds value out of range")
    } else {
        Err(anyhow!("Duration must end with 's' or 'ms', got: {}", s))
    }
}
