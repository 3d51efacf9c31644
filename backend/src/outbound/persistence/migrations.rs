//! Embedded schema migrations.
//!
//! The SQL under `backend/migrations` is compiled into the binary so the
//! server and the `migrate` tool never depend on the working directory.
//! These helpers are synchronous; async callers wrap them in
//! `spawn_blocking`.

use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while migrating the schema.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to connect to database: {message}")]
    Connection { message: String },

    #[error("migration failed: {message}")]
    Apply { message: String },

    #[error("no embedded migration has version {version}")]
    UnknownVersion { version: String },
}

impl MigrationError {
    fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    fn apply(message: impl std::fmt::Display) -> Self {
        Self::Apply {
            message: message.to_string(),
        }
    }
}

/// One embedded migration and whether the database has applied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationState {
    pub version: String,
    pub name: String,
    pub applied: bool,
}

fn connect(database_url: &str) -> Result<PgConnection, MigrationError> {
    PgConnection::establish(database_url).map_err(|err| MigrationError::connection(err.to_string()))
}

/// Apply every pending migration, returning the versions that ran.
///
/// # Errors
///
/// Fails when the database is unreachable or a migration script errors.
pub fn run_pending_migrations(database_url: &str) -> Result<Vec<String>, MigrationError> {
    let mut conn = connect(database_url)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(MigrationError::apply)?
        .into_iter()
        .map(|version| version.to_string())
        .collect::<Vec<_>>();
    info!(count = applied.len(), "applied pending migrations");
    Ok(applied)
}

/// Revert up to `steps` of the most recently applied migrations.
///
/// Stops early once nothing is left to revert.
///
/// # Errors
///
/// Fails when the database is unreachable or a `down.sql` script errors.
pub fn revert_migrations(database_url: &str, steps: usize) -> Result<Vec<String>, MigrationError> {
    let mut conn = connect(database_url)?;
    let mut reverted = Vec::new();
    for _ in 0..steps {
        let applied = conn.applied_migrations().map_err(MigrationError::apply)?;
        if applied.is_empty() {
            break;
        }
        let version = conn
            .revert_last_migration(MIGRATIONS)
            .map_err(MigrationError::apply)?;
        reverted.push(version.to_string());
    }
    info!(count = reverted.len(), "reverted migrations");
    Ok(reverted)
}

/// List the embedded migrations in order with their applied flag.
///
/// # Errors
///
/// Fails when the database is unreachable or the migrations table cannot be
/// read.
pub fn migration_status(database_url: &str) -> Result<Vec<MigrationState>, MigrationError> {
    let mut conn = connect(database_url)?;
    let applied = conn
        .applied_migrations()
        .map_err(MigrationError::apply)?
        .into_iter()
        .map(|version| version.to_string())
        .collect::<Vec<_>>();
    let known = embedded_migrations()?;
    Ok(known
        .into_iter()
        .map(|(version, name)| MigrationState {
            applied: applied.contains(&version),
            version,
            name,
        })
        .collect())
}

/// Versions at or below `requested`, which must name an embedded migration.
fn versions_through(
    known: &[(String, String)],
    requested: &str,
) -> Result<Vec<String>, MigrationError> {
    let requested = requested.trim();
    if !known.iter().any(|(version, _)| version == requested) {
        return Err(MigrationError::UnknownVersion {
            version: requested.to_owned(),
        });
    }
    Ok(known
        .iter()
        .map(|(version, _)| version.clone())
        .filter(|version| version.as_str() <= requested)
        .collect())
}

/// Rewrite the migration ledger so the schema reads as migrated exactly up
/// to `version`, without running any SQL scripts.
///
/// Used to recover after a script was applied or repaired by hand.
///
/// # Errors
///
/// Fails with [`MigrationError::UnknownVersion`] before connecting when
/// `version` is not embedded, or when the ledger cannot be rewritten.
pub fn force_version(database_url: &str, version: &str) -> Result<Vec<String>, MigrationError> {
    let ledger = versions_through(&embedded_migrations()?, version)?;
    let mut conn = connect(database_url)?;
    // Creates the ledger table when it does not exist yet.
    conn.applied_migrations().map_err(MigrationError::apply)?;
    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::sql_query("DELETE FROM __diesel_schema_migrations").execute(conn)?;
        for entry in &ledger {
            diesel::sql_query("INSERT INTO __diesel_schema_migrations (version) VALUES ($1)")
                .bind::<Text, _>(entry)
                .execute(conn)?;
        }
        Ok(())
    })
    .map_err(MigrationError::apply)?;
    info!(version = version.trim(), "forced migration ledger");
    Ok(ledger)
}

/// Versions and names of the embedded migrations, oldest first.
///
/// # Errors
///
/// Fails only if the embedded set cannot be enumerated.
pub fn embedded_migrations() -> Result<Vec<(String, String)>, MigrationError> {
    let mut migrations = diesel::migration::MigrationSource::<Pg>::migrations(&MIGRATIONS)
        .map_err(MigrationError::apply)?
        .into_iter()
        .map(|migration| {
            let name = migration.name();
            (name.version().to_string(), name.to_string())
        })
        .collect::<Vec<_>>();
    migrations.sort();
    Ok(migrations)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn users_migration_precedes_travel_requests() {
        let migrations = embedded_migrations().expect("embedded migrations");
        let names = migrations
            .iter()
            .map(|(_, name)| name.as_str())
            .collect::<Vec<_>>();

        assert_eq!(names.len(), 2);
        assert!(names.first().is_some_and(|name| name.ends_with("create_users")));
        assert!(
            names
                .get(1)
                .is_some_and(|name| name.ends_with("create_travel_requests"))
        );
    }

    #[rstest]
    fn forcing_a_version_marks_it_and_its_predecessors() {
        let known = embedded_migrations().expect("embedded migrations");
        let (first, _) = known.first().expect("first migration").clone();
        let (last, _) = known.last().expect("last migration").clone();

        assert_eq!(
            versions_through(&known, &first).expect("known version"),
            vec![first.clone()]
        );
        assert_eq!(
            versions_through(&known, &format!(" {last} ")).expect("known version"),
            vec![first, last]
        );
    }

    #[rstest]
    fn forcing_an_unknown_version_fails_before_connecting() {
        let err = force_version("postgres://nobody@127.0.0.1:1/none", "19990101000000")
            .expect_err("version is not embedded");

        assert!(matches!(
            err,
            MigrationError::UnknownVersion { ref version } if version == "19990101000000"
        ));
    }

    #[rstest]
    fn unreachable_database_is_a_connection_error() {
        let err = run_pending_migrations("postgres://nobody@127.0.0.1:1/none")
            .expect_err("no server listens on port 1");

        assert!(matches!(err, MigrationError::Connection { .. }));
    }
}
