//! `drafts`: command-line access to saved form drafts.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use draft_checkout::ResumeOutcome;
use draft_cli::commands::{
    DraftWorkspace, keys_table, run_clear, run_edit_checkout, run_get, run_import,
    run_init_config, run_keys, run_merge, run_new_checkout, run_set, run_show,
};
use draft_cli::logging::{LogConfig, LogFormat, init_logging};
use draft_cli::settings::Settings;
use tracing::level_filters::LevelFilter;

mod cli;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref());
    let workspace = DraftWorkspace::from_settings(&settings, cli.store_dir.as_deref());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match cli.command {
        Command::Show { key } => println!("{}", run_show(&workspace, &key)?),
        Command::Get { key, path } => match run_get(&workspace, &key, &path)? {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => anyhow::bail!("Field `{path}` is not set in draft `{key}`"),
        },
        Command::Set { key, path, value } => {
            runtime.block_on(run_set(&workspace, &key, &path, &value))?;
        }
        Command::Merge { key, json } => runtime.block_on(run_merge(&workspace, &key, &json))?,
        Command::Import { key, file } => runtime.block_on(run_import(&workspace, &key, &file))?,
        Command::Clear { key } => {
            if run_clear(&workspace, &key)? {
                println!("Cleared draft `{key}`");
            } else {
                println!("No saved draft `{key}`");
            }
        }
        Command::Keys => {
            let entries = run_keys(&workspace)?;
            if entries.is_empty() {
                println!("No drafts in {}", workspace.dir().display());
            } else {
                println!("{}", keys_table(&entries));
            }
        }
        Command::InitConfig { force } => {
            let path = cli.config.clone().unwrap_or_else(Settings::config_path);
            let mut settings = settings;
            if let Some(dir) = cli.store_dir {
                settings.storage.dir = Some(dir);
            }
            if run_init_config(&settings, &path, force)? {
                println!("Wrote settings to {}", path.display());
            } else {
                println!("{} already exists, use --force to overwrite", path.display());
            }
        }
        Command::NewCheckout => {
            if run_new_checkout(&workspace) {
                println!("Resumed saved new-checkout draft");
            } else {
                println!("Started a new checkout from the default form");
            }
        }
        Command::EditCheckout { id, original } => {
            let outcome =
                runtime.block_on(run_edit_checkout(&workspace, &id, original.as_deref()))?;
            println!("{}", describe_outcome(outcome, &id));
        }
    }
    Ok(())
}

fn describe_outcome(outcome: ResumeOutcome, id: &str) -> String {
    match outcome {
        ResumeOutcome::Resumed => format!("Resumed saved draft for checkout {id}"),
        ResumeOutcome::DiscardedStale => {
            format!("Discarded incomplete draft for checkout {id}, loaded the original")
        }
        ResumeOutcome::LoadedOriginal => format!("Loaded checkout {id}"),
    }
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
    config = config
        .with_format(match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        })
        .with_log_file(cli.log_file.clone())
        .with_log_data(cli.log_data);
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
