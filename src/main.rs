//! Command-line surface for the Electrodomésticos ERP client.
//!
//! Acts as the composition root: configuration, token persistence, auth
//! manager, API client, and the services are all wired here and nowhere
//! else.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use electroerp::{
    init_logger, ApiClient, AuthManager, ChunkReport, ChunkedImportDriver, Config,
    CustomerService, DashboardService, FileTokenStore, ImportObserver, ImportOptions,
    ImportRequest, ImportSummary, InventoryService, ListParams, MemoryTokenStore, Paginated,
    ProductService, ProviderService, RunPhase, SaleService, SessionService, TokenStore,
};

#[derive(Parser, Debug)]
#[command(name = "electroerp")]
#[command(about = "Headless client for the Electrodomésticos ERP REST API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify the configured credentials against the API
    Login,
    /// Show the current backend session
    Session,
    /// Fetch dashboard statistics
    Stats,
    /// List one page of a resource as JSON
    List {
        resource: ResourceKind,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long)]
        search: Option<String>,
    },
    /// Upload a spreadsheet through the chunked import endpoint
    Import {
        file: PathBuf,
        /// Provider the imported products belong to
        #[arg(long)]
        provider: String,
        /// Rows per backend batch
        #[arg(long)]
        chunk_size: Option<u32>,
        /// Delay between chunks, in seconds
        #[arg(long)]
        pacing_secs: Option<u64>,
        /// Upper bound on chunks before the run is stopped
        #[arg(long)]
        max_chunks: Option<u32>,
        /// Alternative import endpoint path
        #[arg(long)]
        endpoint: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResourceKind {
    Products,
    Providers,
    Customers,
    Sales,
    Inventory,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logger();

    let cli = Cli::parse();
    let config = Config::from_env().context("Configuration error")?;

    let store: Arc<dyn TokenStore> = match config
        .token_cache
        .clone()
        .or_else(FileTokenStore::default_path)
    {
        Some(path) => Arc::new(FileTokenStore::new(path)),
        None => Arc::new(MemoryTokenStore::default()),
    };
    let auth = Arc::new(AuthManager::new(&config, store)?);
    let api = Arc::new(ApiClient::new(&config, auth.clone())?);

    match cli.command {
        Command::Login => {
            if auth
                .login(&config.credentials.username, &config.credentials.password)
                .await
            {
                println!("Login OK for {}", config.credentials.username);
            } else {
                anyhow::bail!("Login failed; check ERP_USERNAME and ERP_PASSWORD");
            }
        }
        Command::Session => {
            let session = SessionService::new(api.clone()).session().await?;
            print_json(&session)?;
        }
        Command::Stats => {
            let stats = DashboardService::new(api.clone()).stats().await?;
            print_json(&stats)?;
        }
        Command::List {
            resource,
            page,
            limit,
            search,
        } => {
            let mut params = ListParams::new(page, limit);
            if let Some(search) = search {
                params = params.with_search(search);
            }
            match resource {
                ResourceKind::Products => {
                    print_page(ProductService::new(api.clone()).list(&params).await?)?
                }
                ResourceKind::Providers => {
                    print_page(ProviderService::new(api.clone()).list(&params).await?)?
                }
                ResourceKind::Customers => {
                    print_page(CustomerService::new(api.clone()).list(&params).await?)?
                }
                ResourceKind::Sales => {
                    print_page(SaleService::new(api.clone()).list(&params).await?)?
                }
                ResourceKind::Inventory => {
                    print_page(InventoryService::new(api.clone()).list(&params).await?)?
                }
            }
        }
        Command::Import {
            file,
            provider,
            chunk_size,
            pacing_secs,
            max_chunks,
            endpoint,
        } => {
            let payload = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("import.xlsx")
                .to_string();

            let mut options = ImportOptions::default();
            if let Some(value) = chunk_size {
                options.chunk_size = value;
            }
            if let Some(value) = pacing_secs {
                options.pacing = Duration::from_secs(value);
            }
            if let Some(value) = max_chunks {
                options.max_chunks = value;
            }
            if let Some(value) = endpoint {
                options.endpoint = value;
            }

            let driver = ChunkedImportDriver::new(api.clone(), auth.clone(), options)?;

            let cancel = CancellationToken::new();
            let ctrl_c_cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    eprintln!("Cancelling after the current chunk…");
                    ctrl_c_cancel.cancel();
                }
            });

            let outcome = driver
                .run(
                    ImportRequest {
                        file_name,
                        payload,
                        provider_name: provider,
                    },
                    cancel,
                    Arc::new(CliProgress),
                )
                .await?;

            println!(
                "Run {}: {} created, {} failed ({} rows attempted over {} chunks)",
                outcome.phase,
                outcome.summary.created_count,
                outcome.summary.failed_count,
                outcome.summary.attempted,
                outcome.summary.chunks,
            );
            for failed in &outcome.summary.failed {
                println!("  failed: {} - {}", failed.name, failed.error);
            }
            if let Some(error) = outcome.error {
                anyhow::bail!("Import ended early: {}", error);
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_page<T: Serialize>(page: Paginated<T>) -> Result<()> {
    info!(
        "Page {}/{} ({} records in total)",
        page.page, page.pages, page.total
    );
    print_json(&page)
}

/// Streams run progress to the terminal.
struct CliProgress;

impl ImportObserver for CliProgress {
    fn on_phase(&self, phase: RunPhase) {
        info!("Import phase: {}", phase);
    }

    fn on_upload_progress(&self, percent: u8) {
        debug!("Uploading: {}%", percent);
    }

    fn on_chunk(&self, report: &ChunkReport, summary: &ImportSummary) {
        println!(
            "chunk {}: +{} created, +{} failed (totals: {} created / {} failed)",
            summary.chunks,
            report.created_count,
            report.failed_count,
            summary.created_count,
            summary.failed_count,
        );
    }
}
