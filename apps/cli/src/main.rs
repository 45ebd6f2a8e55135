//! PantheonFS CLI - pantheon commands and the native commands they run.
//!
//! `pantheon-cli pantheon <command>` validates and translates the command and
//! re-executes this binary with the native equivalent. The native commands
//! (`format`, `mount`, `umount`, `clone`) are handed to the engine binary.

mod config;
mod engine;

use clap::{ArgMatches, Command};
use pantheon_core::command;
use pantheon_core::{
    AlternateCommand, ChildExit, Result, SubprocessRunner, TargetCommand, translate,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LOG_ENV, LogFormat};

fn cli() -> Command {
    Command::new("pantheon-cli")
        .about("CLI for PantheonFS volumes")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(command::pantheon_command())
        .subcommands(TargetCommand::ALL.map(command::native_command))
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout belongs to the child
    let result = match format {
        LogFormat::Human => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact()
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .flatten_event(true)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("failed to initialize logger: {}", e);
    }
}

fn run(config: &Config, matches: &ArgMatches) -> Result<ChildExit> {
    match matches.subcommand() {
        Some(("pantheon", matches)) => {
            let Some((name, matches)) = matches.subcommand() else {
                if let Err(e) = command::pantheon_command().print_help() {
                    debug!(error = %e, "failed to print help");
                }
                return Ok(ChildExit::Success);
            };
            let cmd = AlternateCommand::from_name(name)?;
            let invocation = command::invocation_from_matches(cmd, matches)?;
            let native = translate(&invocation)?;
            SubprocessRunner::new().run(&native)
        }
        Some((name, matches)) => {
            let target = TargetCommand::from_name(name)?;
            let argv = command::native_argv(target, matches)?;
            Err(engine::exec(&config.engine, &argv))
        }
        None => Ok(ChildExit::Success),
    }
}

fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(config.log_format);

    let matches = cli().get_matches();

    match run(&config, &matches) {
        Ok(exit) => std::process::exit(exit.code()),
        Err(e) => {
            debug!(error = ?e, "command failed");
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
