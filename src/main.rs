use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use workout_log::backup::{self, Endpoint, ImportMode};
use workout_log::config::AppConfig;
use workout_log::db::Database;
use workout_log::parse_with_report;

#[derive(Parser)]
#[command(name = "workout-log", version, about = "Plain-text workout journal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import workouts from log text (`-` reads stdin)
    Import {
        source: Endpoint,
        /// append, replace or merge
        #[arg(long, default_value = "merge")]
        mode: ImportMode,
    },
    /// Write all stored workouts as log text (`-` writes stdout)
    Export {
        #[arg(default_value = "-")]
        target: Endpoint,
    },
    /// Show stored workouts
    List {
        #[arg(long)]
        json: bool,
    },
    /// Parse log text without storing it and report dropped lines
    Check { source: Endpoint },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.log_filter);
    let vocabulary = config.vocabulary();

    match cli.command {
        Command::Import { source, mode } => {
            let text = source.read_text()?;
            let mut db = open_database(&config)?;
            let summary = backup::import(&mut db, &text, &vocabulary, mode)?;
            println!("{}", summary);
        }
        Command::Export { target } => {
            let db = open_database(&config)?;
            let text = backup::export(&db, &vocabulary)?;
            target.write_text(&text)?;
            info!("Backup written to {}", target);
        }
        Command::List { json } => {
            let db = open_database(&config)?;
            let workouts = db.list_workouts().context("Failed to load workouts")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&workouts)?);
            } else {
                for w in &workouts {
                    println!(
                        "{} {:<5}  {} exercises, {} sets",
                        w.date,
                        w.start_time.as_deref().unwrap_or(""),
                        w.exercises.len(),
                        w.set_count()
                    );
                }
            }
        }
        Command::Check { source } => {
            let text = source.read_text()?;
            let report = parse_with_report(&text, &vocabulary);
            for skipped in &report.skipped {
                println!("line {}: {} ({})", skipped.line_number, skipped.text, skipped.reason);
            }
            println!(
                "{} workouts, {} skipped lines",
                report.workouts.len(),
                report.skipped.len()
            );
            if report.workouts.is_empty() {
                bail!("No workouts found in {}", source);
            }
        }
    }

    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_database(config: &AppConfig) -> Result<Database> {
    Database::open(config.database_path())
        .with_context(|| format!("Failed to open database {}", config.database_url))
}
