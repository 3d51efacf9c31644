//! Apply, revert, or inspect the embedded database migrations.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io::{self, Write};

use backend::outbound::persistence::{
    force_version, migration_status, revert_migrations, run_pending_migrations,
};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};

const DATABASE_URL_VARS: [&str; 2] = ["TRAVEL_DATABASE_URL", "DATABASE_URL"];

/// `migrate` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "migrate",
    about = "Manage the travel request database schema",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `TRAVEL_DATABASE_URL`, then
    /// `DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url", global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand, PartialEq, Eq)]
enum Command {
    /// Apply every pending migration.
    Up,
    /// Revert the most recently applied migrations.
    Down {
        #[arg(default_value_t = 1)]
        steps: usize,
    },
    /// List embedded migrations and whether each is applied.
    Status,
    /// Mark the schema as migrated up to `version` without running SQL.
    Force { version: String },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let lookup = |name: &str| env::var(name).ok();
    let database_url = resolve_database_url(args.database_url, lookup)?;
    run(args.command, &database_url, &mut io::stdout().lock())
}

fn run(command: Command, database_url: &str, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Up => {
            let applied =
                run_pending_migrations(database_url).wrap_err("failed to apply migrations")?;
            if applied.is_empty() {
                writeln!(out, "schema already up to date")?;
            }
            for version in applied {
                writeln!(out, "applied {version}")?;
            }
        }
        Command::Down { steps } => {
            let reverted = revert_migrations(database_url, steps)
                .wrap_err("failed to revert migrations")?;
            if reverted.is_empty() {
                writeln!(out, "nothing to revert")?;
            }
            for version in reverted {
                writeln!(out, "reverted {version}")?;
            }
        }
        Command::Status => {
            let states = migration_status(database_url).wrap_err("failed to read migrations")?;
            for state in states {
                let marker = if state.applied { "applied" } else { "pending" };
                writeln!(out, "{marker:<8} {} {}", state.version, state.name)?;
            }
        }
        Command::Force { version } => {
            let ledger = force_version(database_url, &version)
                .wrap_err_with(|| format!("failed to force schema version {version}"))?;
            writeln!(
                out,
                "forced schema version {} ({} migrations marked applied)",
                version.trim(),
                ledger.len()
            )?;
        }
    }
    Ok(())
}

fn resolve_database_url(
    explicit: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(eyre!("--database-url must not be empty when provided"));
        }
        return Ok(value);
    }

    DATABASE_URL_VARS
        .iter()
        .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()))
        .ok_or_else(|| {
            eyre!("database URL missing: set --database-url, TRAVEL_DATABASE_URL, or DATABASE_URL")
        })
}
