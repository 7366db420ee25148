//! # The Reset Job
//!
//! The one maintenance task this service exists for: wipe the configured
//! table, reload it from the seed file, and resync its identity sequence.

use std::path::PathBuf;

use sea_orm::DbConn;
use tracing::info;

use crate::{config, db, Result};

/// The outcome of a single job invocation.
///
/// The job never panics or propagates an error to its caller; failures are
/// reported as data so the harness running the job decides whether to log,
/// alert, or retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed { message: String },
}

/// The daily reset job.
///
/// Holds everything resolved at construction time: the table to act on and
/// the seed file path. Nothing is looked up from process-wide state during a
/// run.
#[derive(Debug, Clone)]
pub struct ResetJob {
    table: String,
    seed_path: PathBuf,
}

impl ResetJob {
    #[must_use]
    pub fn new(table: impl Into<String>, seed_path: impl Into<PathBuf>) -> Self {
        Self {
            table: table.into(),
            seed_path: seed_path.into(),
        }
    }

    /// Builds the job from the application configuration, resolving the seed
    /// file path once.
    ///
    /// # Errors
    ///
    /// Returns an error when the seed path cannot be resolved.
    pub fn from_config(config: &config::Config) -> Result<Self> {
        Ok(Self::new(config.reset.table.clone(), config.seed_path()?))
    }

    /// Runs the reset once and reports the outcome.
    ///
    /// No step is retried and no transaction spans the statements: a failure
    /// mid-run leaves the table in whatever state the completed steps
    /// produced (typically empty, with the sequence already reset).
    pub async fn run(&self, db: &DbConn) -> Outcome {
        match self.reset_database(db).await {
            Ok(()) => Outcome::Completed,
            Err(err) => Outcome::Failed {
                message: err.to_string(),
            },
        }
    }

    // Step order is load-bearing: integrity enforcement is re-enabled right
    // after the delete, before the sequence reset and the reload.
    async fn reset_database(&self, db: &DbConn) -> Result<()> {
        info!(table = %self.table, "starting database reset");

        db::set_referential_integrity(db, false).await?;
        db::delete_all(db, &self.table).await?;
        db::set_referential_integrity(db, true).await?;
        db::reset_sequence(db, &self.table, "id").await?;

        info!(seed_path =? self.seed_path, "loading the default data");
        db::run_seed_file(db, &self.seed_path).await?;

        info!("database reset is completed");
        Ok(())
    }
}
