use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use nudge_core::domain::ErrorKind;
use nudge_core::{JobKind, NudgeError};

mod commands;

#[derive(Parser)]
#[command(name = "nudge")]
#[command(about = "Push reminders and daily digests for the to-do tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log notifications instead of sending them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Recipients dispatched in parallel (overrides NOTIFY_CONCURRENCY)
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Read variables from this file instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Print the run summary as JSON on stdout
    #[arg(long, global = true)]
    summary_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Notify every open task due tomorrow, one notification per task
    RemindTomorrow,
    /// Send each subscriber one summary of today's pending tasks
    Digest,
}

impl Commands {
    fn job(&self) -> JobKind {
        match self {
            Commands::RemindTomorrow => JobKind::TomorrowReminder,
            Commands::Digest => JobKind::DailyDigest,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// `.env` is optional; an explicit `--env-file` is not.
fn load_env(path: Option<&PathBuf>) -> Result<(), dotenvy::Error> {
    match path {
        Some(path) => dotenvy::from_path(path),
        None => match dotenvy::dotenv() {
            Ok(_) => Ok(()),
            Err(e) if e.not_found() => Ok(()),
            Err(e) => Err(e),
        },
    }
}

/// 2 for configuration problems, 1 for everything else that aborted the run.
fn exit_code(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<NudgeError>().map(NudgeError::kind) {
        Some(ErrorKind::Configuration) => 2,
        Some(ErrorKind::Infrastructure) | None => 1,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // env first: it may carry RUST_LOG
    let env_loaded = load_env(cli.env_file.as_ref());
    init_tracing(cli.log_format);
    if let Err(e) = env_loaded {
        error!(error = %e, "cannot load environment file");
        return ExitCode::FAILURE;
    }

    let options = commands::RunOptions {
        job: cli.command.job(),
        dry_run: cli.dry_run,
        concurrency: cli.concurrency,
        summary_json: cli.summary_json,
    };

    match commands::run(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format_args!("{e:#}"), "run failed");
            ExitCode::from(exit_code(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use nudge_core::config::ConfigError;
    use nudge_core::domain::StoreError;

    #[test]
    fn configuration_errors_exit_with_two() {
        let err = Err::<(), _>(NudgeError::from(ConfigError::Missing("SUPABASE_URL")))
            .context("reading configuration")
            .unwrap_err();
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn store_errors_exit_with_one() {
        let err = anyhow::Error::from(NudgeError::from(StoreError::Other("down".into())));
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn unclassified_errors_exit_with_one() {
        assert_eq!(exit_code(&anyhow::anyhow!("stdout closed")), 1);
    }
}
