//! command-line interface for the spartan reset service.
//!
//! The binary owns the process lifecycle: it resolves the environment, loads
//! the configuration, initializes the logger, connects to the database, and
//! then either starts the scheduler or runs the reset job once.

use clap::{Parser, Subcommand};
use colored::Colorize;
use sea_orm::DbConn;
use spartan_reset::{
    config::Config,
    db,
    environment::{resolve_from_env, Environment, DEFAULT_ENVIRONMENT},
    init_logger,
    scheduler::{Descriptor, Scheduler},
    task::{Outcome, ResetJob},
    Error, Result,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Specify the environment
    #[arg(short, long, global = true, help = &format!("Specify the environment [default: {}]", DEFAULT_ENVIRONMENT))]
    environment: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the scheduler and run until a shutdown signal
    #[clap(alias("s"))]
    Start,
    /// Run the reset job once, immediately
    Reset,
    /// Show the configured job
    Jobs,
}

const JOB_NAME: &str = "daily_reset";

fn build_scheduler(config: &Config, db: DbConn) -> Result<Scheduler> {
    let job = ResetJob::from_config(config)?;
    let descriptor = Descriptor::from_config(&config.reset)?;
    Ok(Scheduler::new(JOB_NAME, job, descriptor, db))
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let environment: Environment = cli
        .environment
        .unwrap_or_else(resolve_from_env)
        .into();
    let config = environment.load()?;
    init_logger(&config.logger);

    match cli.command {
        Commands::Start => {
            let db = db::connect(&config.database).await?;
            build_scheduler(&config, db)?.run().await?;
        }
        Commands::Reset => {
            let db = db::connect(&config.database).await?;
            let job = ResetJob::from_config(&config)?;
            match job.run(&db).await {
                Outcome::Completed => {}
                Outcome::Failed { message } => return Err(Error::Message(message)),
            }
        }
        Commands::Jobs => {
            // listing does not need a live connection
            let scheduler = build_scheduler(&config, DbConn::default())?;
            println!("{scheduler}");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{}", err.to_string().red());
        std::process::exit(1);
    }
}
