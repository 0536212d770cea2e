//! CLI argument definitions for `shapemap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "shapemap",
    version,
    about = "Map order documents between their storage and transport shapes",
    long_about = "Map order documents between their storage and transport shapes.\n\n\
                  Documents are JSON. Pass `-` as the input path to read stdin."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// What to write when a missing value meets a non-optional field.
    #[arg(
        long = "null-policy",
        value_enum,
        default_value = "reject",
        global = true
    )]
    pub null_policy: NullPolicyArg,

    /// Leave destination collections untouched when the source has none.
    #[arg(long = "skip-absent-collections", global = true)]
    pub skip_absent_collections: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Map a stored order to its transport shape.
    ToTransport {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Map a transport order to its stored shape.
    ToStorage {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Update this stored document instead of starting from an empty one.
        #[arg(long = "merge-into", value_name = "PATH")]
        merge_into: Option<PathBuf>,
    },

    /// List the registered bindings.
    Bindings {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum NullPolicyArg {
    /// Fail the mapping.
    Reject,
    /// Write the field's default value.
    Default,
}
