//! Error types surfaced by the playback engine.

use std::io;
use thiserror::Error;

/// Failure of a single shell command.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("unable to spawn `{shell}`: {source}")]
    Spawn {
        shell: String,
        #[source]
        source: io::Error,
    },

    #[error("command exited with {}", exit_code(.code))]
    Exit { code: Option<i32> },

    #[error("command cancelled")]
    Cancelled,

    #[error("unable to stream command output: {0}")]
    Output(#[source] io::Error),

    #[error("unable to wait for command: {0}")]
    Wait(#[source] io::Error),
}

impl ExecError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecError::Cancelled)
    }
}

fn exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Errors returned by [`Run`](crate::Run) and [`Demo`](crate::Demo) execution.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("invalid demo configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error("unable to read newline: {0}")]
    Input(#[source] io::Error),

    #[error("write: {0}")]
    Output(#[source] io::Error),

    #[error("step {step} command failed: {source}")]
    Command {
        step: usize,
        #[source]
        source: ExecError,
    },

    #[error("setup: {0}")]
    Setup(#[source] anyhow::Error),

    #[error("cleanup: {0}")]
    Cleanup(#[source] anyhow::Error),

    #[error("run `{name}` failed")]
    Run {
        name: String,
        #[source]
        source: Box<DemoError>,
    },

    #[error("execution cancelled")]
    Cancelled,
}

impl DemoError {
    /// Whether this error, or the error it wraps, is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            DemoError::Cancelled => true,
            DemoError::Command { source, .. } => source.is_cancelled(),
            DemoError::Run { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }

    pub(crate) fn in_run(self, name: &str) -> Self {
        DemoError::Run {
            name: name.to_string(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_display() {
        let err = ExecError::Exit { code: Some(42) };
        assert_eq!(err.to_string(), "command exited with status 42");
        let err = ExecError::Exit { code: None };
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn test_is_cancelled_through_wrappers() {
        assert!(DemoError::Cancelled.is_cancelled());
        assert!(DemoError::Cancelled.in_run("intro").is_cancelled());
        let cmd = DemoError::Command {
            step: 1,
            source: ExecError::Cancelled,
        };
        assert!(cmd.in_run("intro").is_cancelled());
        assert!(!DemoError::Config("bad".into()).is_cancelled());
    }

    #[test]
    fn test_setup_message_keeps_cause() {
        let err = DemoError::Setup(anyhow::anyhow!("setup failed"));
        assert!(err.to_string().contains("setup failed"));
    }
}
