//! latz: image search across pluggable backends.

use clap::Parser;
use latz::app::App;
use latz::cli::{Cli, Command, config, search};
use latz::config::ConfigPaths;
use latz::error::{EXIT_APP_ERROR, LatzError, Result};
use latz::logging::{self, LogTarget};
use latz::plugins;
use std::process::ExitCode;
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init(&LogTarget::parse(&cli.log), cli.verbose) {
        eprintln!("Error: {err:#}");
        return ExitCode::from(EXIT_APP_ERROR);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let app = App::bootstrap(plugins::builtin())?;
    let paths = ConfigPaths::discover().with_explicit(cli.config);
    debug!(candidates = ?paths.candidate_paths(), "Configuration candidates");

    match cli.command {
        Command::Search(args) => {
            let output = search::run(&app, &paths, &args).await?;
            print!("{}", output.rendered);
            output.into_result()
        }
        Command::Config(args) => {
            let out = config::run(&app, &paths, &args)?;
            print!("{out}");
            Ok(())
        }
    }
}

fn report(err: &LatzError) {
    match err {
        LatzError::Search(failures) => {
            for failure in failures {
                eprintln!("Error: {failure}");
            }
        }
        other => eprintln!("Error: {other}"),
    }
}
