use anyhow::Result;
use std::process::ExitCode;
use termdemo::{Demo, Outcome, Run, Step};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    termdemo::logging::init();

    match run().await {
        Ok(Outcome::Completed | Outcome::Interrupted) => ExitCode::SUCCESS,
        Err(err) => {
            error!("run failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<Outcome> {
    Ok(build()?.run().await?)
}

fn build() -> Result<Demo> {
    let mut demo = Demo::new("termdemo").about("Learn how this framework is being used");
    demo.add(example(), "example", "an example demo run")?;
    Ok(demo)
}

fn example() -> Run {
    let mut run = Run::new("Title", ["Some additional", "multiline description"]);

    run.step(
        [
            "This is a possible",
            "description of the command",
            "to be executed",
        ],
        ["echo hello world"],
    );

    // Commands do not need to have a description
    run.push(Step::command(["echo without description"]));

    // It is also not needed to provide a command
    run.push(Step::narration(["Just a description without a command"]));

    run
}
