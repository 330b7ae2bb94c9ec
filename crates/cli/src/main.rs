//! CGSG CLI - Command-line interface for the maintenance gate

use anyhow::{Context, Result};
use cgsg_core::application::resolver::resolve;
use cgsg_core::application::{
    gate, MaintenanceResolver, PageView, ResolverConfig, ResolverSnapshot, SetMaintenanceRequest,
};
use cgsg_core::domain::{MaintenanceRecord, PageKey};
use cgsg_sdk::{MaintenanceClient, SseChangeFeed};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;
use tabled::{Table, Tabled};

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8787";

#[derive(Parser)]
#[command(name = "cgsg")]
#[command(about = "CGSG maintenance gate CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Server URL
    #[arg(long, global = true, env = "CGSG_URL", default_value = DEFAULT_SERVER_URL)]
    url: String,

    /// Admin API token (required by set, clear and list)
    #[arg(long, global = true, env = "CGSG_ADMIN_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a page once and print what it would render
    Status {
        /// Router path (e.g. "/", "/promotions")
        path: String,

        /// Request timeout in seconds
        #[arg(long, default_value = "5")]
        timeout_secs: u64,
    },

    /// Keep a page resolved and print every change until Ctrl+C
    Watch {
        /// Router path
        path: String,

        /// Fallback poll interval in seconds
        #[arg(long, default_value = "120")]
        poll_secs: u64,

        /// Request timeout in seconds
        #[arg(long, default_value = "5")]
        timeout_secs: u64,
    },

    /// Put a page into maintenance
    Set {
        /// Router path
        path: String,

        /// Message shown instead of the page
        #[arg(short, long)]
        message: Option<String>,

        /// Keep the record but switch maintenance off
        #[arg(long)]
        off: bool,
    },

    /// Remove a page's maintenance record
    Clear {
        /// Router path
        path: String,
    },

    /// List all maintenance records
    List,
}

#[derive(Tabled)]
struct RecordRow {
    page: String,
    maintenance: String,
    message: String,
    updated: String,
}

impl From<MaintenanceRecord> for RecordRow {
    fn from(record: MaintenanceRecord) -> Self {
        Self {
            page: page_label(&record.page_path),
            maintenance: if record.is_maintenance { "ON" } else { "off" }.to_string(),
            message: record.maintenance_message.unwrap_or_default(),
            updated: chrono::DateTime::from_timestamp_millis(record.updated_at)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Page key with its route, e.g. `home (/)` or `news (/news)`
fn page_label(key: &PageKey) -> String {
    if key.is_home() {
        format!("{} (/)", key)
    } else {
        format!("{} (/{})", key, key)
    }
}

fn admin_client(url: &str, token: Option<String>) -> Result<MaintenanceClient> {
    let token = token.context("Admin token required (--token or CGSG_ADMIN_TOKEN)")?;
    Ok(MaintenanceClient::new(url)?.with_token(token))
}

fn print_snapshot(snapshot: &ResolverSnapshot) {
    if snapshot.is_loading {
        println!("{} {}", page_label(&snapshot.page_key).bold(), "loading...".dimmed());
        return;
    }

    match gate(snapshot) {
        PageView::Content => println!(
            "{} {}",
            page_label(&snapshot.page_key).bold(),
            "CONTENT".green()
        ),
        PageView::Maintenance { message } => println!(
            "{} {} {}",
            page_label(&snapshot.page_key).bold(),
            "MAINTENANCE".red().bold(),
            message
        ),
    }

    if let Some(error) = &snapshot.error {
        println!("  {} {}", "⚠ fetch failed, showing content:".yellow(), error);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status { path, timeout_secs } => {
            let client = MaintenanceClient::new(&cli.url)?;
            let resolution = resolve(&client, &path, Duration::from_secs(timeout_secs)).await;
            print_snapshot(&ResolverSnapshot::from(resolution));
        }

        Commands::Watch {
            path,
            poll_secs,
            timeout_secs,
        } => {
            let config = ResolverConfig::new(
                Duration::from_secs(timeout_secs),
                Duration::from_secs(poll_secs),
            )?;
            let client = MaintenanceClient::new(&cli.url)?
                .with_request_timeout(Duration::from_secs(timeout_secs));
            let feed = SseChangeFeed::new(&cli.url)?;

            let resolver =
                MaintenanceResolver::mount(&path, Arc::new(client), Arc::new(feed), config);
            let mut updates = resolver.watch();

            println!("{}", format!("Watching {} (Ctrl+C to stop)", path).cyan().bold());
            print_snapshot(&updates.borrow_and_update().clone());

            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let snapshot = updates.borrow_and_update().clone();
                        print_snapshot(&snapshot);
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }

            resolver.unmount().await;
        }

        Commands::Set { path, message, off } => {
            let client = admin_client(&cli.url, cli.token)?;
            let key = PageKey::from_path(&path);
            let request = SetMaintenanceRequest {
                is_maintenance: !off,
                maintenance_message: message,
            };

            let record = client.set(&key, &request).await?;

            println!("{}", format!("✓ Maintenance saved for {}", key).green().bold());
            println!();
            println!("{}", Table::new(vec![RecordRow::from(record)]));
        }

        Commands::Clear { path } => {
            let client = admin_client(&cli.url, cli.token)?;
            let key = PageKey::from_path(&path);

            if client.clear(&key).await? {
                println!("{}", format!("✓ Maintenance cleared for {}", key).green().bold());
            } else {
                println!("{}", format!("No maintenance record for {}", key).yellow());
            }
        }

        Commands::List => {
            let client = admin_client(&cli.url, cli.token)?;
            let records = client.list().await?;

            if records.is_empty() {
                println!("{}", "No maintenance records".yellow());
            } else {
                let rows: Vec<RecordRow> = records.into_iter().map(RecordRow::from).collect();
                println!("{}", Table::new(rows));
            }
        }
    }

    Ok(())
}
