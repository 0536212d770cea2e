//! `shapemap` CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use shapemap_cli::commands::{run_bindings, run_to_storage, run_to_transport};
use shapemap_cli::logging::{LogConfig, LogFormat, init_logging};
use shapemap_core::{AbsentCollection, MapOptions, NullPolicy};
use tracing::level_filters::LevelFilter;

mod cli;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, NullPolicyArg};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let options = map_options_from_cli(&cli);
    let result = match &cli.command {
        Command::ToTransport { input } => run_to_transport(input, options),
        Command::ToStorage { input, merge_into } => {
            run_to_storage(input, merge_into.as_deref(), options)
        }
        Command::Bindings { json } => run_bindings(options, *json),
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn map_options_from_cli(cli: &Cli) -> MapOptions {
    let null_policy = match cli.null_policy {
        NullPolicyArg::Reject => NullPolicy::Reject,
        NullPolicyArg::Default => NullPolicy::UseDefault,
    };
    let absent = if cli.skip_absent_collections {
        AbsentCollection::Skip
    } else {
        AbsentCollection::TreatAsEmpty
    };
    MapOptions::new()
        .with_null_policy(null_policy)
        .with_absent_source_collection(absent)
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
