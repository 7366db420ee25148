//! # Scheduler Module
//!
//! An explicit cron scheduler owned by the process. It holds the reset job,
//! its schedule descriptor (cron expression plus timezone) and the database
//! handle, and fires the job on schedule until the process is shut down.

use std::{fmt, io, sync::OnceLock, time::{Duration, Instant}};

use chrono_tz::Tz;
use regex::Regex;
use sea_orm::DbConn;
use tokio_cron_scheduler::{JobScheduler, JobSchedulerError};
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    config,
    task::{Outcome, ResetJob},
};

static RE_IS_CRON_SYNTAX: OnceLock<Regex> = OnceLock::new();

fn get_re_is_cron_syntax() -> &'static Regex {
    RE_IS_CRON_SYNTAX.get_or_init(|| Regex::new(r"^[\*\d]").unwrap())
}

/// Errors that may occur while operating the scheduler.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid cron {cron}. err: '{error}'")]
    InvalidCronSyntax { cron: String, error: String },

    #[error("Invalid timezone {timezone}. err: '{error}'")]
    InvalidTimezone { timezone: String, error: String },

    #[error(transparent)]
    Job(#[from] JobSchedulerError),

    #[error(transparent)]
    IO(#[from] io::Error),
}

/// Result type used in the module, with a custom error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// When and in which timezone the job fires.
#[derive(Clone, Debug)]
pub struct Descriptor {
    /// The cron expression (or English phrase) defining the job's schedule.
    ///
    /// The cron format is as follows:
    /// sec   min   hour   day of month   month   day of week
    pub schedule: String,
    /// The timezone the schedule is evaluated in.
    pub timezone: Tz,
    /// Fire the job once immediately when the scheduler starts.
    pub run_on_start: bool,
}

impl Descriptor {
    /// Builds a descriptor from the reset configuration section.
    ///
    /// # Errors
    ///
    /// When the configured timezone is not a valid IANA name.
    pub fn from_config(config: &config::Reset) -> Result<Self> {
        let timezone = config
            .timezone
            .parse::<Tz>()
            .map_err(|error| Error::InvalidTimezone {
                timezone: config.timezone.clone(),
                error: error.to_string(),
            })?;

        Ok(Self {
            schedule: config.schedule.clone(),
            timezone,
            run_on_start: config.run_on_start,
        })
    }

    /// Resolves the schedule into cron syntax, translating English phrases
    /// such as `every day at 11:59 pm` when needed.
    ///
    /// # Errors
    ///
    /// When the schedule is neither cron syntax nor a translatable phrase.
    pub fn cron_syntax(&self) -> Result<String> {
        if get_re_is_cron_syntax().is_match(&self.schedule) {
            return Ok(self.schedule.clone());
        }

        english_to_cron::str_cron_syntax(&self.schedule).map_err(|err| Error::InvalidCronSyntax {
            cron: self.schedule.clone(),
            error: err.to_string(),
        })
    }
}

/// Representing the scheduler itself.
pub struct Scheduler {
    name: String,
    job: ResetJob,
    descriptor: Descriptor,
    db: DbConn,
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<15} {:<12} {:<22} {:<20}",
            "job_name", "run_on_start", "schedule", "timezone"
        )?;
        writeln!(
            f,
            "{:<15} {:<12} {:<22} {:<20}",
            self.name, self.descriptor.run_on_start, self.descriptor.schedule, self.descriptor.timezone
        )?;

        Ok(())
    }
}

impl Scheduler {
    #[must_use]
    pub fn new(name: impl Into<String>, job: ResetJob, descriptor: Descriptor, db: DbConn) -> Self {
        Self {
            name: name.into(),
            job,
            descriptor,
            db,
        }
    }

    /// Runs the scheduled job according to its cron expression, in its
    /// timezone, until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// When could not add the job to the scheduler
    pub async fn run(self) -> Result<()> {
        let mut sched = JobScheduler::new().await?;

        let cron_syntax = self.descriptor.cron_syntax()?;

        if self.descriptor.run_on_start {
            let job = self.job.clone();
            let db = self.db.clone();
            let job_name = self.name.clone();
            sched
                .add(tokio_cron_scheduler::Job::new_one_shot_async(
                    Duration::from_secs(0),
                    move |uuid, _l| {
                        let job = job.clone();
                        let db = db.clone();
                        let job_name = job_name.clone();
                        Box::pin(async move {
                            execute_job(job_name.as_str(), uuid, &job, &db).await;
                        })
                    },
                )?)
                .await?;
        }

        let job = self.job.clone();
        let db = self.db.clone();
        let job_name = self.name.clone();
        sched
            .add(tokio_cron_scheduler::Job::new_async_tz(
                cron_syntax.as_str(),
                self.descriptor.timezone,
                move |uuid, _l| {
                    let job = job.clone();
                    let db = db.clone();
                    let job_name = job_name.clone();
                    Box::pin(async move {
                        execute_job(job_name.as_str(), uuid, &job, &db).await;
                    })
                },
            )?)
            .await?;

        sched.start().await?;

        tokio::signal::ctrl_c().await?;
        sched.shutdown().await?;

        Ok(())
    }
}

// The harness owns the failure policy: outcomes are logged here and the
// scheduler keeps waiting for the next trigger.
async fn execute_job(job_name: &str, uuid: Uuid, job: &ResetJob, db: &DbConn) {
    let task_span = tracing::span!(
        tracing::Level::DEBUG,
        "run_job",
        job_name,
        job_id = ?uuid,
    );
    let start = Instant::now();
    match job.run(db).instrument(task_span).await {
        Outcome::Completed => {
            tracing::debug!(
                job_name,
                duration = ?start.elapsed(),
                "scheduled job finished"
            );
        }
        Outcome::Failed { message } => {
            tracing::error!(
                job_name,
                duration = ?start.elapsed(),
                error = %message,
                "scheduled job failed"
            );
        }
    }
}
