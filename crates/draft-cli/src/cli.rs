//! CLI argument definitions for `drafts`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "drafts",
    version,
    about = "Inspect and edit auto-saved form drafts",
    long_about = "Inspect and edit auto-saved form drafts.\n\n\
                  Drafts are merged onto their form's default fields on every read \
                  and write, so saved copies never lose a field."
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

    /// Log output format (pretty for human, json for machine parsing).
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

    /// Include draft field values in logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Draft directory (overrides the settings file).
    #[arg(long = "store-dir", value_name = "DIR", global = true)]
    pub store_dir: Option<PathBuf>,

    /// Settings file to use instead of the default location.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print a draft merged onto its default fields.
    Show {
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Print one field, e.g. `styles.primaryColor` or `packages[0].name`.
    Get {
        #[arg(value_name = "KEY")]
        key: String,
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Set one field. VALUE is parsed as JSON, or taken as text if that fails.
    Set {
        #[arg(value_name = "KEY")]
        key: String,
        #[arg(value_name = "PATH")]
        path: String,
        #[arg(value_name = "VALUE")]
        value: String,
    },

    /// Deep-merge a JSON object into a draft.
    Merge {
        #[arg(value_name = "KEY")]
        key: String,
        #[arg(value_name = "JSON")]
        json: String,
    },

    /// Replace a draft with the JSON object in a file.
    Import {
        #[arg(value_name = "KEY")]
        key: String,
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Delete a saved draft.
    Clear {
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// List saved drafts.
    Keys,

    /// Write the settings file, recording `--store-dir` if given.
    InitConfig {
        /// Overwrite an existing settings file.
        #[arg(long)]
        force: bool,
    },

    /// Start a new checkout, resuming its saved draft if there is one.
    NewCheckout,

    /// Edit an existing checkout, resuming a usable saved draft.
    EditCheckout {
        /// Checkout id.
        #[arg(value_name = "ID")]
        id: String,

        /// JSON file with the checkout as saved on the server.
        #[arg(long = "original", value_name = "FILE")]
        original: Option<PathBuf>,
    },
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
