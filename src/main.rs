use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use edinet_dividends::api::EdinetClient;
use edinet_dividends::catalog_sync::{sync_window, SyncReport};
use edinet_dividends::database_sqlx::DatabaseManagerSqlx;
use edinet_dividends::models::Config;
use edinet_dividends::pipeline::{self, ProcessReport};

/// Annual report ingestion from the EDINET disclosure registry
#[derive(Parser)]
#[command(name = "edinet-dividends")]
#[command(version = "0.1.0")]
#[command(about = "Collect annual securities reports from EDINET and extract revenue, income and dividend figures")]
#[command(long_about = "
Scans EDINET's daily document listings for annual securities reports, keeps a
catalog of them in a local SQLite database, downloads each report's XBRL
bundle and stores revenue, operating income, net income and dividend figures
per issuer and fiscal year.

Configuration comes from the environment (or a .env file): DATABASE_PATH,
EDINET_BASE_URL, EDINET_API_KEY, EDINET_USER_AGENT, SCAN_DAYS, TARGET_DOC_TYPE,
RATE_LIMIT_PER_MINUTE.

Examples:
  edinet-dividends                 # sync the last 30 days, then extract
  edinet-dividends --days 365 sync # catalog one year of listings only
  edinet-dividends status -n 50    # show counts and the 50 newest documents
")]
struct Cli {
    /// Override SCAN_DAYS for the catalog window
    #[arg(long, short = 'd', global = true)]
    days: Option<u32>,

    /// Show debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan daily listings and record new annual reports
    Sync,
    /// Extract figures for every unprocessed document
    Process,
    /// Sync then process (default)
    Run,
    /// Show catalog counts and the newest documents
    Status {
        /// Number of documents to list
        #[arg(long, short = 'n', default_value_t = 20)]
        limit: i64,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "edinet_dividends=debug" } else { "edinet_dividends=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::from_env();
    if let Some(days) = cli.days {
        config.scan_days = days;
    }

    let database = match DatabaseManagerSqlx::new(&config.database_path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database {}: {}", config.database_path, e);
            return Err(e.into());
        }
    };

    let today = Local::now().date_naive();
    info!("🚀 EDINET ingestion {} (window {} days)", today, config.scan_days);

    match cli.command.unwrap_or(Command::Run) {
        Command::Sync => {
            let client = EdinetClient::new(&config)?;
            let report = sync_window(&database, &client, today, config.scan_days, &config.target_doc_type).await?;
            print_sync_report(&report);
        }
        Command::Process => {
            let client = EdinetClient::new(&config)?;
            let report = pipeline::process_queue(&database, &client).await?;
            print_process_report(&report);
        }
        Command::Run => {
            let client = EdinetClient::new(&config)?;
            let report = pipeline::run(&database, &client, &config, today).await?;
            print_sync_report(&report.sync);
            print_process_report(&report.process);
        }
        Command::Status { limit } => show_status(&database, limit).await?,
    }

    Ok(())
}

fn print_sync_report(report: &SyncReport) {
    println!("📋 Catalog sync");
    println!("   Dates scanned:     {}", report.dates_scanned);
    println!("   Annual reports:    {}", report.documents_matched);
    println!("   New documents:     {}", report.documents_inserted);
    if !report.skipped_dates.is_empty() {
        println!("   Skipped dates:     {}", report.skipped_dates.len());
        for skipped in &report.skipped_dates {
            println!("     - {}: {}", skipped.date, skipped.error);
        }
    }
}

fn print_process_report(report: &ProcessReport) {
    println!("📊 Extraction");
    println!("   Queued:            {}", report.queued);
    println!("   Processed:         {}", report.processed);
    println!("   Financial rows:    {}", report.financial_rows);
    println!("   Dividend rows:     {}", report.dividend_rows);
    if !report.without_attachment.is_empty() {
        println!("   Without XBRL:      {}", report.without_attachment.len());
    }
    if !report.failures.is_empty() {
        println!("   Failed:            {}", report.failures.len());
        for failure in report.failures.iter().take(10) {
            println!("     - {}: {}", failure.doc_id, failure.error);
        }
        if report.failures.len() > 10 {
            println!("     ... and {} more", report.failures.len() - 10);
        }
    }
}

async fn show_status(database: &DatabaseManagerSqlx, limit: i64) -> Result<()> {
    let stats = database.get_stats().await?;

    println!("📊 Registered annual reports");
    println!("══════════════════════════════════════");
    println!("   Documents:         {}", stats.documents);
    println!("   Processed:         {}", stats.processed_documents);
    println!("   Pending:           {}", stats.pending_documents());
    println!("   Financial rows:    {}", stats.financial_records);
    println!("   Dividend rows:     {}", stats.dividend_records);
    if stats.pending_documents() > 0 {
        println!("   ⚠️  Pending documents are downloaded again on every run, including bundles without XBRL");
    }
    println!();

    let documents = database.get_recent_documents(limit).await?;
    if documents.is_empty() {
        println!("No documents yet. Run `edinet-dividends sync` first.");
        return Ok(());
    }

    println!("{:<10} {:<8} {:<12} {}", "doc_id", "sec_code", "period_end", "processed");
    for doc in documents.iter().rev() {
        println!(
            "{:<10} {:<8} {:<12} {}",
            doc.doc_id,
            doc.sec_code.as_deref().unwrap_or("-"),
            doc.period_end.as_deref().unwrap_or("-"),
            if doc.processed { "yes" } else { "no" }
        );
    }

    Ok(())
}
