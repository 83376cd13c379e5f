use std::{path::PathBuf, process::ExitCode};

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use colored::Colorize;
use healthlog_lib::{
    Error, Repository,
    repository::{self, config::CoreConfig},
};
use sysexits::ExitCode as SysExit;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod nutrition;
mod profile;
mod stats;
mod workout;

#[derive(Parser, Debug)]
#[command(name = "healthlog")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Store records in this directory instead of the configured one
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Operate on the user profile
    #[command(subcommand)]
    Profile(profile::Command),
    /// Operate on workout records
    #[command(subcommand)]
    Workout(workout::Command),
    /// Operate on nutrition records
    #[command(subcommand)]
    Nutrition(nutrition::Command),
    /// Show health metrics for the current profile
    Stats,
    /// Delete every workout and nutrition record, keeping the profile
    Clear {
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> ExitCode {
    // Human friendly panicking in release mode
    human_panic::setup_panic!();

    // Logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("{} failed to set up logging", "warning:".yellow().bold());
    }

    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code.into(),
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            exit_code(&err).into()
        }
    }
}

fn run(cli: &Cli) -> healthlog_lib::Result<SysExit> {
    let repo = open_repository(cli.data_dir.as_ref())?;

    match &cli.command {
        Command::Profile(cmd) => profile::handle(&repo, cmd),
        Command::Workout(cmd) => workout::handle(&repo, cmd),
        Command::Nutrition(cmd) => nutrition::handle(&repo, cmd),
        Command::Stats => stats::handle(&repo),
        Command::Clear { yes } => clear(&repo, *yes),
    }
}

fn open_repository(data_dir: Option<&PathBuf>) -> repository::Result<Repository> {
    match data_dir {
        Some(dir) => {
            let mut cfg = CoreConfig::load()?;
            cfg.data_dir.clone_from(dir);
            Repository::open(cfg)
        }
        None => Repository::new(),
    }
}

fn clear(repo: &Repository, yes: bool) -> healthlog_lib::Result<SysExit> {
    if !yes && !confirm("Delete every workout and nutrition record?")? {
        println!("Nothing deleted");
        return Ok(SysExit::Ok);
    }

    repo.clear_all_data()?;
    println!("{}", "All records deleted".green());

    Ok(SysExit::Ok)
}

fn confirm(question: &str) -> repository::Result<bool> {
    use std::io::Write;

    print!("{question} [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;

    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Map a library error onto a BSD style exit code.
fn exit_code(err: &Error) -> SysExit {
    match err {
        Error::Validation(_) | Error::Calculation(_) => SysExit::DataErr,
        Error::Storage(err) => match err {
            repository::Error::Io(_) => SysExit::IoErr,
            repository::Error::Config(_) | repository::Error::NoHomeDirectory => SysExit::Config,
            repository::Error::Json(_)
            | repository::Error::Validation(_)
            | repository::Error::IndexOutOfRange { .. }
            | repository::Error::NotStorable(_) => SysExit::DataErr,
        },
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parse a local date and time. A bare date means midnight.
fn parse_date(value: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| format!("`{value}` is not a date, expected YYYY-MM-DD [HH:MM]"))
}
