// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::core::{ConfigManager, Database, FsOps, ProfileRepository, ProfileStore};
use crate::extract_profile;
use crate::linkedin::{Section, ToRecord};
use crate::types::{ExtractionMode, ExtractionOutcome, Profile};

#[derive(Parser)]
#[command(name = "profile-scraper")]
#[command(about = "Scrape LinkedIn profiles into a structured store")]
pub struct ProfileCli {
    #[command(subcommand)]
    pub command: ProfileCommand,

    #[arg(long, global = true, default_value = "config.yaml")]
    pub config: PathBuf,
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Initialize the database
    Init,
    /// Scrape the LinkedIn account behind a session token
    Scrape {
        /// Key the profile is stored under
        #[arg(long)]
        owner: String,
        /// Value of the `li_at` session cookie
        #[arg(long)]
        token: String,
        #[arg(long, value_enum, default_value_t = ExtractionMode::Full)]
        mode: ExtractionMode,
    },
    /// Scrape every `owner,token[,mode]` row of a CSV file
    Import {
        csv_file: PathBuf,
        #[arg(long, default_value_t = 2)]
        concurrency: usize,
    },
    /// Print the stored profile of an owner
    Show { owner: String },
    /// List stored profiles
    List,
    /// Delete the stored profile of an owner
    Remove { owner: String },
    /// Run one section extractor on a saved page
    Parse {
        #[arg(value_enum)]
        section: Section,
        html_file: PathBuf,
    },
}

#[derive(Debug, Deserialize)]
struct ImportRow {
    owner: String,
    token: String,
    #[serde(default)]
    mode: ExtractionMode,
}

pub async fn handle_command(cli: ProfileCli, config: ConfigManager) -> Result<()> {
    if let ProfileCommand::Parse { section, html_file } = &cli.command {
        return parse_page(*section, html_file).await;
    }

    let db = Database::new(&config.environment.database_path).await?;
    let repo = db.profiles();

    match cli.command {
        ProfileCommand::Init => {
            db.health_check().await?;
            println!(
                "✅ Database initialized at: {}",
                config.environment.database_path.display()
            );
        }

        ProfileCommand::Scrape { owner, token, mode } => {
            let outcome = extract_profile(
                &config.scraper,
                &repo,
                &token,
                &owner,
                mode,
            )
            .await?;
            println!("{}: {}", owner, outcome);
        }

        ProfileCommand::Import {
            csv_file,
            concurrency,
        } => import(csv_file, concurrency, config, repo).await?,

        ProfileCommand::Show { owner } => match repo.find(&owner).await? {
            Some(stored) => {
                let record = stored
                    .record()
                    .with_context(|| format!("Stored profile for {} is not valid JSON", owner))?;
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
            None => println!("❌ No stored profile for: {}", owner),
        },

        ProfileCommand::List => {
            let profiles = repo.list().await?;
            if profiles.is_empty() {
                println!("No stored profiles.");
            } else {
                println!("{:<25} {:<20} {:<36}", "Owner", "Last modified", "Run");
                println!("{}", "-".repeat(83));
                for profile in profiles {
                    println!(
                        "{:<25} {:<20} {:<36}",
                        profile.owner,
                        profile.last_modified.format("%Y-%m-%d %H:%M"),
                        profile.run_id
                    );
                }
            }
        }

        ProfileCommand::Remove { owner } => {
            if repo.delete(&owner).await? {
                println!("✅ Removed stored profile for: {}", owner);
            } else {
                println!("❌ No stored profile for: {}", owner);
            }
        }

        ProfileCommand::Parse { .. } => {}
    }

    Ok(())
}

async fn parse_page(section: Section, html_file: &PathBuf) -> Result<()> {
    let html = FsOps::read_file_safe(html_file).await?;
    let profile = section
        .apply(&html, Profile::default())
        .with_context(|| format!("Failed to extract {} from {}", section, html_file.display()))?;

    println!("{}", serde_json::to_string_pretty(&profile.to_record())?);
    Ok(())
}

/// Read import rows; a repeated owner keeps its position and its last token.
fn read_rows(content: &str) -> Result<Vec<ImportRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rows: Vec<ImportRow> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (line, result) in reader.deserialize::<ImportRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping CSV record {}: {}", line + 1, e);
                continue;
            }
        };
        if row.owner.is_empty() || row.token.is_empty() {
            warn!("Skipping CSV record {}: empty owner or token", line + 1);
            continue;
        }

        match positions.get(&row.owner) {
            Some(&index) => rows[index] = row,
            None => {
                positions.insert(row.owner.clone(), rows.len());
                rows.push(row);
            }
        }
    }

    Ok(rows)
}

async fn import(
    csv_file: PathBuf,
    concurrency: usize,
    config: ConfigManager,
    repo: ProfileRepository,
) -> Result<()> {
    if !csv_file.exists() {
        anyhow::bail!("CSV file not found: {}", csv_file.display());
    }

    let content = FsOps::read_file_safe(&csv_file).await?;
    let rows = read_rows(&content)?;
    info!("Importing {} profiles from {}", rows.len(), csv_file.display());

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let config = Arc::new(config);
    let mut handles = Vec::with_capacity(rows.len());

    for row in rows {
        let semaphore = Arc::clone(&semaphore);
        let config = Arc::clone(&config);
        let repo = repo.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let outcome = extract_profile(
                &config.scraper,
                &repo,
                &row.token,
                &row.owner,
                row.mode,
            )
            .await;
            anyhow::Ok((row.owner, outcome))
        }));
    }

    let summary = collect(handles).await;

    println!("\nImport completed:");
    println!("  ✅ Persisted: {}", summary.persisted);
    println!("  ❌ Errors:    {}", summary.errors);
    Ok(())
}

type ImportTask = JoinHandle<Result<(String, Result<ExtractionOutcome>)>>;

#[derive(Debug, Default, PartialEq, Eq)]
struct ImportSummary {
    persisted: usize,
    errors: usize,
}

/// Await every task; a task that panicked counts as an error like a failed
/// scrape.
async fn collect(handles: Vec<ImportTask>) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for handle in handles {
        match handle.await {
            Ok(Ok((owner, Ok(outcome)))) => {
                if outcome.is_persisted() {
                    summary.persisted += 1;
                }
                println!("✅ {}: {}", owner, outcome);
            }
            Ok(Ok((owner, Err(e)))) => {
                summary.errors += 1;
                error!("Scraping failed for {}: {:#}", owner, e);
                println!("❌ {}: {:#}", owner, e);
            }
            Ok(Err(e)) => {
                summary.errors += 1;
                println!("❌ {:#}", e);
            }
            Err(e) => {
                summary.errors += 1;
                error!("Import task failed: {}", e);
                println!("❌ Import task failed: {}", e);
            }
        }
    }

    summary
}
