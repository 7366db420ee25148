//! # Database Operations
//!
//! This module defines functions and operations related to the application's
//! database interactions: connection pooling and the raw statements the reset
//! job is made of.

use std::{path::Path, time::Duration};

use fs_err as fs;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DbConn};

use super::Result as AppResult;
use crate::{config, errors::Error};

/// Establish a connection to the database using the provided configuration
/// settings.
///
/// # Errors
///
/// Returns a [`sea_orm::DbErr`] if an error occurs during the database
/// connection establishment.
pub async fn connect(config: &config::Database) -> Result<DbConn, sea_orm::DbErr> {
    let mut opt = ConnectOptions::new(&config.uri);
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_millis(config.connect_timeout))
        .idle_timeout(Duration::from_millis(config.idle_timeout))
        .sqlx_logging(config.enable_logging);

    Database::connect(opt).await
}

/// Toggle referential-integrity enforcement on the session.
///
/// On Postgres this flips `session_replication_role` between `replica` and
/// `origin`; on Sqlite it flips the `foreign_keys` pragma.
///
/// # Errors
///
/// Returns an error when the statement fails or the backend is unsupported.
pub async fn set_referential_integrity(db: &DbConn, enabled: bool) -> AppResult<()> {
    let stmt = match db.get_database_backend() {
        DatabaseBackend::Postgres => {
            let role = if enabled { "origin" } else { "replica" };
            format!("SET session_replication_role = '{role}';")
        }
        DatabaseBackend::Sqlite => {
            let mode = if enabled { "ON" } else { "OFF" };
            format!("PRAGMA foreign_keys = {mode};")
        }
        other => {
            return Err(Error::Message(format!(
                "unsupported database backend: {other:?}"
            )))
        }
    };

    db.execute_unprepared(&stmt).await?;
    Ok(())
}

/// Delete all rows from the given table.
///
/// # Errors
///
/// Returns an error when the statement fails.
pub async fn delete_all(db: &DbConn, table: &str) -> AppResult<()> {
    db.execute_unprepared(&format!("DELETE FROM {table};"))
        .await?;
    Ok(())
}

/// Resync the table's identity sequence with its current contents, so the next
/// generated id is `max(column) + 1`, or `1` when the table is empty.
///
/// On Postgres this sets the serial sequence to `coalesce(max(id), 1)` with the
/// no-advance flag; on Sqlite the `sqlite_sequence` counter is set to
/// `coalesce(max(id), 0)`, which yields the same next value.
///
/// # Errors
///
/// Returns an error when the statement fails or the backend is unsupported.
pub async fn reset_sequence(db: &DbConn, table: &str, column: &str) -> AppResult<()> {
    let stmt = match db.get_database_backend() {
        DatabaseBackend::Postgres => format!(
            "SELECT setval(pg_get_serial_sequence('{table}', '{column}'), \
             coalesce(max({column}), 1), false) FROM {table};"
        ),
        DatabaseBackend::Sqlite => format!(
            "UPDATE sqlite_sequence SET seq = (SELECT coalesce(max({column}), 0) FROM {table}) \
             WHERE name = '{table}';"
        ),
        other => {
            return Err(Error::Message(format!(
                "unsupported database backend: {other:?}"
            )))
        }
    };

    db.execute_unprepared(&stmt).await?;
    Ok(())
}

/// Read the seed file and execute its content as one SQL script.
///
/// The file is read as UTF-8 text and its lines joined with newlines before
/// execution.
///
/// # Errors
///
/// Returns an error naming the seed file when it cannot be read, or the
/// database error when execution fails.
pub async fn run_seed_file(db: &DbConn, path: &Path) -> AppResult<()> {
    let content = fs::read_to_string(path)
        .map_err(|err| Error::Message(format!("error reading seed file: {err}")))?;

    let sql = content.lines().collect::<Vec<_>>().join("\n");
    if sql.trim().is_empty() {
        return Ok(());
    }

    db.execute_unprepared(&sql).await?;
    Ok(())
}
