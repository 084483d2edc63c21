//! Command-line probe over `release_tracker_core`.
//!
//! Reads configuration from the environment, opens the configured database
//! and prints one answer per invocation.

use clap::{Parser, Subcommand};
use log::error;
use release_tracker_core::db::open_db;
use release_tracker_core::{
    init_logging, repositories, search_filter, sop_version, AppSlot, GithubContentsClient,
    Release, ReleaseFilter, ReleaseId, ReleaseService, SqliteReleaseRepository, TrackerConfig,
};
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "release-tracker", version, about = "Query scheduled releases")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check core linkage.
    Ping,
    /// List tracked repositories.
    Repositories,
    /// Show the latest release dated before today.
    Last,
    /// Show the earliest release dated today or later.
    Next,
    /// Resolve the version of an app for a release.
    Version { app: AppSlot, release_id: ReleaseId },
    /// Filter releases by notes text.
    Search { term: Option<String> },
    /// Fetch the SOP version shipped with a repository version.
    Sop { repo: String, version: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    let config = TrackerConfig::from_env()?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir)?;
    }

    match command {
        Command::Ping => {
            println!("release_tracker_core ping={}", release_tracker_core::ping());
            println!(
                "release_tracker_core version={}",
                release_tracker_core::core_version()
            );
        }
        Command::Repositories => {
            for slot in repositories() {
                println!("{slot}");
            }
        }
        Command::Sop { repo, version } => {
            let client = GithubContentsClient::new(&config.sop)?;
            print!("{}", sop_version(&client, &repo, &version));
        }
        command => {
            let conn = open_db(require_db_path(&config)?)?;
            let repo = SqliteReleaseRepository::try_new(&conn)?
                .with_default_coordinator(config.default_coordinator.as_str());
            let service = ReleaseService::new(repo);

            match command {
                Command::Last => print_release(service.last_release()?.as_ref()),
                Command::Next => print_release(service.next_release()?.as_ref()),
                Command::Version { app, release_id } => {
                    let release = service.get_release(release_id)?;
                    match service.version(app, release.as_ref())? {
                        Some(version) => println!("{version}"),
                        None => println!("release {release_id} not found"),
                    }
                }
                Command::Search { term } => {
                    let filter = ReleaseFilter {
                        text: term,
                        ..ReleaseFilter::default()
                    };
                    for release in search_filter(&conn, &filter)? {
                        print_release(Some(&release));
                    }
                }
                Command::Ping | Command::Repositories | Command::Sop { .. } => {}
            }
        }
    }
    Ok(())
}

/// Database-backed commands need a real file; an in-memory database would
/// always be empty.
fn require_db_path(config: &TrackerConfig) -> Result<&Path, String> {
    config.db_path.as_deref().ok_or_else(|| {
        "RELEASE_TRACKER_DB_PATH is not set; point it at the release database".to_string()
    })
}

fn print_release(release: Option<&Release>) {
    let Some(release) = release else {
        println!("none");
        return;
    };
    let date = release
        .date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let versions = AppSlot::ALL
        .iter()
        .filter_map(|slot| release.version_for(*slot).map(|v| format!("{slot}={v}")))
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "#{} {date} status={} coordinator={} {versions}",
        release.id.unwrap_or_default(),
        release.status,
        release.coordinator.as_deref().unwrap_or_default(),
    );
}
