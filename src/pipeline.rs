//! Per-document extraction loop and the full ingestion run.
//!
//! Each queued document is retrieved, extracted and persisted on its own. A
//! recoverable failure is logged, recorded in the report and the loop moves
//! on; the document stays queued for the next run.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::api::FilingSource;
use crate::attachment::retrieve_attachment;
use crate::catalog_sync::{sync_window, SyncReport};
use crate::database_sqlx::DatabaseManagerSqlx;
use crate::error::{IngestError, Result};
use crate::extraction::extract_figures;
use crate::models::{Config, QueuedDocument};
use crate::persistence::persist_figures;

/// Result of handling one queued document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Processed { wrote_financials: bool, wrote_dividend: bool },
    /// Bundle had no XBRL member; left queued
    NoAttachment,
}

/// A document that failed with a recoverable error
#[derive(Debug)]
pub struct DocumentFailure {
    pub doc_id: String,
    pub error: IngestError,
}

/// Result of one pass over the processing queue
#[derive(Debug, Default)]
pub struct ProcessReport {
    pub queued: usize,
    pub processed: usize,
    pub financial_rows: usize,
    pub dividend_rows: usize,
    pub without_attachment: Vec<String>,
    pub failures: Vec<DocumentFailure>,
}

/// Catalog sync followed by queue processing
#[derive(Debug, Default)]
pub struct RunReport {
    pub sync: SyncReport,
    pub process: ProcessReport,
}

/// Retrieve, extract and persist a single document
pub async fn process_document(
    database: &DatabaseManagerSqlx,
    source: &dyn FilingSource,
    document: &QueuedDocument,
) -> Result<DocumentOutcome> {
    let Some(xbrl) = retrieve_attachment(source, &document.doc_id).await? else {
        return Ok(DocumentOutcome::NoAttachment);
    };

    let figures = extract_figures(&xbrl)?;
    if figures.is_empty() {
        warn!("No figures matched in {}", document.doc_id);
    }

    let outcome = persist_figures(database, document, &figures).await?;
    Ok(DocumentOutcome::Processed {
        wrote_financials: outcome.wrote_financials,
        wrote_dividend: outcome.wrote_dividend,
    })
}

/// Work through every unprocessed document, one at a time
pub async fn process_queue(
    database: &DatabaseManagerSqlx,
    source: &dyn FilingSource,
) -> Result<ProcessReport> {
    let queue = database.get_unprocessed_documents().await?;
    let total = queue.len();
    info!("📊 {} documents waiting for extraction", total);

    let mut report = ProcessReport {
        queued: total,
        ..Default::default()
    };

    for (index, document) in queue.iter().enumerate() {
        let position = index + 1;

        match process_document(database, source, document).await {
            Ok(DocumentOutcome::Processed { wrote_financials, wrote_dividend }) => {
                report.processed += 1;
                report.financial_rows += usize::from(wrote_financials);
                report.dividend_rows += usize::from(wrote_dividend);
                info!(
                    "✅ {}/{}: {} ({}) financials={} dividend={}",
                    position,
                    total,
                    document.doc_id,
                    document.sec_code.as_deref().unwrap_or("-"),
                    wrote_financials,
                    wrote_dividend
                );
            }
            Ok(DocumentOutcome::NoAttachment) => {
                warn!("⚪ {}/{}: {} has no XBRL member, skipping", position, total, document.doc_id);
                report.without_attachment.push(document.doc_id.clone());
            }
            Err(error) if error.is_recoverable() => {
                warn!("❌ {}/{}: {} failed - {}", position, total, document.doc_id, error);
                report.failures.push(DocumentFailure {
                    doc_id: document.doc_id.clone(),
                    error,
                });
            }
            Err(error) => return Err(error),
        }
    }

    info!(
        "📊 Extraction done: {} processed, {} without XBRL, {} failed",
        report.processed,
        report.without_attachment.len(),
        report.failures.len()
    );
    Ok(report)
}

/// Full ingestion: catalog sync over the configured window, then the queue
pub async fn run(
    database: &DatabaseManagerSqlx,
    source: &dyn FilingSource,
    config: &Config,
    today: NaiveDate,
) -> Result<RunReport> {
    let sync = sync_window(database, source, today, config.scan_days, &config.target_doc_type).await?;
    let process = process_queue(database, source).await?;
    Ok(RunReport { sync, process })
}
