use anyhow::Result;
use borgrun::cli::Cli;
use borgrun::job::{RunConfig, ToolPaths};
use borgrun::pipeline::{self, ExitOutcome};
use borgrun::settings::Settings;
use borgrun::tool::{ProcessInvoker, Tool};
use borgrun::{logging, path_util};
use clap::Parser;
use std::process::ExitCode;

/// Entry point for the borgrun CLI application.
/// Parses command-line arguments, resolves the run configuration and drives the backup pipeline.
fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match prepare(&cli) {
        Ok((config, tools)) => {
            let invoker = ProcessInvoker;
            let engine = Tool::new(tools.borg.as_os_str(), &invoker);
            let sync_tool = Tool::new(tools.rclone.as_os_str(), &invoker);
            pipeline::run(&config, engine, Some(sync_tool)).into()
        }
        Err(e) => {
            eprintln!("{e:#}");
            ExitOutcome::Failure.into()
        }
    }
}

/// Loads settings and validates the command line against them.
fn prepare(cli: &Cli) -> Result<(RunConfig, ToolPaths)> {
    let explicit = cli.config.as_deref().map(path_util::expand_home);
    let settings = Settings::load(explicit.as_deref())?;
    let config = RunConfig::resolve(cli, &settings)?;
    let tools = ToolPaths::resolve(cli, &settings);
    Ok((config, tools))
}
