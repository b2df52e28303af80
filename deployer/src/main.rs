//! Plugin deployer CLI entrypoint.
//!
//! Parses the command line, loads `deploy.toml`, and runs the release
//! pipeline against the plugin repository in the current directory.

use camino::Utf8Path;
use clap::Parser;
use plugin_deployer::cli::Cli;
use plugin_deployer::config::DeployConfig;
use plugin_deployer::error::Result;
use plugin_deployer::logging;
use plugin_deployer::output::{detect_style, write_stderr_line};
use plugin_deployer::pipeline::{RunContext, run as run_pipeline};
use plugin_deployer::process::SystemCommandExecutor;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let config = DeployConfig::load(&cli.config)?;
    let style = detect_style(cli.no_color);
    let context = RunContext {
        cli,
        config: &config,
        executor: &SystemCommandExecutor,
        style: style.as_ref(),
        workspace_root: Utf8Path::new("."),
        run_date: chrono::Local::now().date_naive(),
    };
    run_pipeline(&context, stderr).map(|_| ())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}
