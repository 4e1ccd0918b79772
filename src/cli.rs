// src/cli.rs
//! Operator commands: run the server, trigger discovery, inspect and export results

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::app_log;
use crate::core::config_manager::StorageBackend;
use crate::core::{ConfigManager, Database};
use crate::job_discovery::DiscoveryOutcome;
use crate::services::AppServices;
use crate::types::JobMatch;
use crate::web::start_web_server;

#[derive(Parser)]
#[command(name = "careerai")]
#[command(about = "Job discovery, matching and analytics backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, default_value = "config.yaml")]
    pub config: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API
    Serve,
    /// Run job discovery for a user with an uploaded resume
    Discover {
        #[arg(long)]
        user: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the analytics dashboard for a user as JSON
    Analytics {
        #[arg(long)]
        user: String,
    },
    /// List stored job matches, best first
    Jobs {
        #[arg(long)]
        user: String,
    },
    /// Export stored job matches to CSV
    Export {
        #[arg(long)]
        user: String,
        #[arg(long)]
        output: PathBuf,
    },
    /// Delete the resume, job matches and interview preps stored for a user
    Clear {
        #[arg(long)]
        user: String,
    },
    /// Create the database and run migrations
    Init,
}

pub async fn handle_command(command: Command, config: ConfigManager) -> Result<()> {
    match command {
        Command::Serve => {
            config.ensure_directories().await?;
            app_log!(info, "Database: {}", config.environment.database_path.display());
            app_log!(info, "Snapshots: {}", config.environment.snapshot_path.display());
            let services = AppServices::from_config(&config).await?;
            start_web_server(services, config.server.port).await
        }

        Command::Discover {
            user,
            location,
            limit,
        } => {
            let services = AppServices::from_config(&config).await?;
            match services
                .discovery
                .discover(&user, location.as_deref(), limit)
                .await?
            {
                DiscoveryOutcome::Matched(matches) => {
                    println!("✅ {} jobs matched for {}", matches.len(), user);
                    print_matches(&matches);
                }
                outcome @ DiscoveryOutcome::NoValidJobs { .. } => {
                    println!("❌ {}", outcome.message());
                }
            }
            Ok(())
        }

        Command::Analytics { user } => {
            let services = AppServices::from_config(&config).await?;
            let analytics = services.analytics.user_analytics(&user).await?;
            let json = serde_json::to_string_pretty(&analytics)
                .context("Failed to serialize analytics")?;
            println!("{}", json);
            Ok(())
        }

        Command::Jobs { user } => {
            let services = AppServices::from_config(&config).await?;
            let matches = services.discovery.current_jobs(&user).await?;
            if matches.is_empty() {
                println!("No job matches stored for {}", user);
            } else {
                print_matches(&matches);
            }
            Ok(())
        }

        Command::Export { user, output } => {
            let services = AppServices::from_config(&config).await?;
            let matches = services.discovery.current_jobs(&user).await?;
            let written = export_csv(&matches, &output)?;
            println!("✅ Exported {} job matches to {}", written, output.display());
            Ok(())
        }

        Command::Clear { user } => {
            let services = AppServices::from_config(&config).await?;
            services.clear_user(&user).await?;
            println!("✅ Cleared stored data for {}", user);
            Ok(())
        }

        Command::Init => {
            if config.environment.storage == StorageBackend::Memory {
                println!("Storage backend is memory, nothing to initialize");
                return Ok(());
            }
            let db = Database::new(&config.environment.database_path).await?;
            db.health_check().await?;
            println!(
                "✅ Database ready: {}",
                config.environment.database_path.display()
            );
            Ok(())
        }
    }
}

fn print_matches(matches: &[JobMatch]) {
    println!(
        "{:<6} {:<10} {:<32} {:<24} {:<20}",
        "Score", "Status", "Title", "Company", "Location"
    );
    println!("{}", "-".repeat(96));
    for m in matches {
        println!(
            "{:<6} {:<10} {:<32} {:<24} {:<20}",
            m.match_score,
            m.status,
            truncate(&m.job.title, 31),
            truncate(&m.job.company, 23),
            truncate(&m.job.location, 19)
        );
    }
}

fn truncate(text: &str, max: usize) -> &str {
    crate::utils::truncate_chars(text, max)
}

#[derive(Debug, Serialize)]
struct JobMatchCsvRow<'a> {
    id: &'a str,
    job_id: &'a str,
    title: &'a str,
    company: &'a str,
    location: &'a str,
    job_type: &'a str,
    salary: &'a str,
    posted: String,
    url: &'a str,
    source: &'a str,
    requirements: String,
    match_score: u8,
    match_reasons: String,
    status: &'static str,
    created_at: String,
}

impl<'a> From<&'a JobMatch> for JobMatchCsvRow<'a> {
    fn from(m: &'a JobMatch) -> Self {
        Self {
            id: &m.id,
            job_id: &m.job_id,
            title: &m.job.title,
            company: &m.job.company,
            location: &m.job.location,
            job_type: &m.job.job_type,
            salary: m.job.salary.as_deref().unwrap_or(""),
            posted: m.job.posted.to_rfc3339(),
            url: &m.job.url,
            source: &m.job.source,
            requirements: m.job.requirements.join("; "),
            match_score: m.match_score,
            match_reasons: m.match_reasons.join(" | "),
            status: m.status.as_str(),
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// One row per match, in the order given. Returns the number of rows written.
pub fn export_csv(matches: &[JobMatch], output: &Path) -> Result<usize> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("Failed to open {}", output.display()))?;
    for m in matches {
        writer.serialize(JobMatchCsvRow::from(m))?;
    }
    writer.flush()?;

    app_log!(info, "Wrote {} rows to {}", matches.len(), output.display());
    Ok(matches.len())
}
