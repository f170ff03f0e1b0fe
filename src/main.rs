//! job-hunt CLI entrypoint.
//! `search` prints the top accepted postings, `run` performs the daily notify/apply flow,
//! `send-logs` ships log files through the messaging channel.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use job_hunt::engine::DailyRun;
use job_hunt::notify::{channel_from_env, ApplicationMailer, Notifier};
use job_hunt::{build_aggregator, SearchConfig};

#[derive(Parser)]
#[command(name = "job-hunt")]
#[command(about = "Relocation-friendly job search: scrape, filter, notify, apply")]
struct Cli {
    /// Path to a TOML/JSON config (overrides JOB_HUNT_CONFIG and config/ fallbacks)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search all sources and print the accepted postings
    Search {
        /// Number of postings to show (defaults to top_n from config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Search, send new postings, wait for a selection and apply
    Run,

    /// Send log files as documents
    SendLogs {
        /// Files to send (default: the log file this binary writes); missing files are skipped
        files: Vec<PathBuf>,
    },
}

const LOG_FILE: &str = "job-hunt.log";

/// $JOB_HUNT_LOG_FILE, else `job-hunt.log` in the working directory.
fn log_file_path() -> PathBuf {
    std::env::var_os("JOB_HUNT_LOG_FILE")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(LOG_FILE))
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Compact logs on stdout by default; JOB_HUNT_LOG_FORMAT=json switches to JSON lines.
/// A plain-text copy is appended to the log file for `send-logs`.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("job_hunt=info,warn"));
    let json = std::env::var("JOB_HUNT_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let path = log_file_path();
    let file_layer = match open_log_file(&path) {
        Ok(file) => Some(fmt::layer().with_ansi(false).with_writer(Arc::new(file))),
        Err(e) => {
            eprintln!("log file {} disabled: {e}", path.display());
            None
        }
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let cfg = SearchConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Search { limit } => {
            let aggregator = build_aggregator(&cfg)?;
            let channel = channel_from_env(&cfg.http);
            let report = aggregator.search_jobs(channel.as_notifier()).await;

            let limit = limit.unwrap_or(cfg.top_n);
            if report.jobs.is_empty() {
                println!("No matching jobs found.");
            }
            for (i, job) in report.jobs.iter().take(limit).enumerate() {
                println!("{}. {} | {} | {}", i + 1, job.title, job.company, job.location);
                if !job.posted_date.is_empty() {
                    println!("   posted {}", job.posted_date);
                }
                println!("   {}", job.link);
            }
            if !report.blocked.is_empty() {
                eprintln!("Blocked sources: {}", report.blocked.join(", "));
            }
        }

        Commands::Run => {
            let aggregator = build_aggregator(&cfg)?;
            let channel = channel_from_env(&cfg.http);
            let mailer = match ApplicationMailer::from_env(&cfg.mail) {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(error = ?e, "mailer disabled");
                    None
                }
            };
            let today = chrono::Local::now().date_naive();
            let outcome = DailyRun::new(&cfg, &aggregator, channel.as_notifier(), channel.as_replies())
                .with_mailer(mailer.as_ref())
                .run(today)
                .await?;
            println!(
                "Offered {} job(s), applied to {}.",
                outcome.offered, outcome.applied
            );
        }

        Commands::SendLogs { mut files } => {
            if files.is_empty() {
                files.push(log_file_path());
            }
            let channel = channel_from_env(&cfg.http);
            send_logs(channel.as_notifier(), &files).await;
        }
    }

    Ok(())
}

async fn send_logs(notifier: &dyn Notifier, files: &[PathBuf]) {
    for path in files {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "log file absent");
            continue;
        }
        let caption = format!(
            "Logs: {}",
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        );
        if let Err(e) = notifier.send_document(path, &caption).await {
            tracing::warn!(error = ?e, path = %path.display(), "failed to send log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn log_file_is_created_then_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn send_logs_defaults_to_written_file() {
        let cli = Cli::try_parse_from(["job-hunt", "send-logs"]).unwrap();
        match cli.command {
            Commands::SendLogs { files } => assert!(files.is_empty()),
            _ => panic!("expected send-logs"),
        }
        std::env::remove_var("JOB_HUNT_LOG_FILE");
        assert_eq!(log_file_path(), PathBuf::from(LOG_FILE));
    }
}
