//! Catalog synchronization
//!
//! Walks the registry's daily listings over a date window and records every
//! newly seen document of the target report type. Re-running over the same
//! dates is a no-op for documents already in the catalog.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::api::FilingSource;
use crate::database_sqlx::DatabaseManagerSqlx;
use crate::error::{IngestError, Result};
use crate::models::ListingEntry;
use crate::utils::dates_in_window;

/// Counts for one listing date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateSyncOutcome {
    pub listed: usize,
    pub matched: usize,
    pub inserted: usize,
}

/// A listing date that could not be fetched
#[derive(Debug)]
pub struct SkippedDate {
    pub date: NaiveDate,
    pub error: IngestError,
}

/// Result of a catalog scan over a window of dates
#[derive(Debug, Default)]
pub struct SyncReport {
    pub dates_scanned: usize,
    pub documents_listed: usize,
    pub documents_matched: usize,
    pub documents_inserted: usize,
    pub skipped_dates: Vec<SkippedDate>,
}

/// Exact match on the report type code, plus a usable issuer code
pub fn is_target_report(entry: &ListingEntry, target_doc_type: &str) -> bool {
    let type_matches = entry.doc_type_code.as_deref() == Some(target_doc_type);
    let has_issuer = entry
        .sec_code
        .as_deref()
        .is_some_and(|code| !code.trim().is_empty());

    type_matches && has_issuer
}

/// Fetch one day's listing and insert the matching documents
pub async fn sync_date(
    database: &DatabaseManagerSqlx,
    source: &dyn FilingSource,
    date: NaiveDate,
    target_doc_type: &str,
) -> Result<DateSyncOutcome> {
    let entries = source.list_documents(date).await?;
    let mut outcome = DateSyncOutcome {
        listed: entries.len(),
        ..Default::default()
    };

    // One date commits as a whole
    let mut tx = database.begin().await?;

    for entry in entries.iter().filter(|e| is_target_report(e, target_doc_type)) {
        let Some(doc_id) = entry.doc_id.as_deref().filter(|id| !id.trim().is_empty()) else {
            debug!("Listing entry on {} without docID, skipping", date);
            continue;
        };

        outcome.matched += 1;
        let inserted = DatabaseManagerSqlx::insert_document_if_absent(
            &mut tx,
            doc_id,
            entry.sec_code.as_deref().map(str::trim),
            entry.period_end.as_deref(),
        )
        .await?;

        if inserted {
            outcome.inserted += 1;
            debug!(
                "New document {} ({}) period {}",
                doc_id,
                entry.filer_name.as_deref().unwrap_or("-"),
                entry.period_end.as_deref().unwrap_or("-")
            );
        }
    }

    tx.commit().await?;
    Ok(outcome)
}

/// Scan `days` dates back from `today`, one date at a time.
///
/// A failed listing only skips its own date. Storage failures abort the scan.
pub async fn sync_window(
    database: &DatabaseManagerSqlx,
    source: &dyn FilingSource,
    today: NaiveDate,
    days: u32,
    target_doc_type: &str,
) -> Result<SyncReport> {
    info!("📋 Scanning {} days of listings back from {}", days, today);
    let mut report = SyncReport::default();

    for date in dates_in_window(today, days) {
        report.dates_scanned += 1;

        match sync_date(database, source, date, target_doc_type).await {
            Ok(outcome) => {
                info!(
                    "✅ {}: {} listed, {} annual reports, {} new",
                    date, outcome.listed, outcome.matched, outcome.inserted
                );
                report.documents_listed += outcome.listed;
                report.documents_matched += outcome.matched;
                report.documents_inserted += outcome.inserted;
            }
            Err(error) if error.is_recoverable() => {
                warn!("⚠️ Skipping {}: {}", date, error);
                report.skipped_dates.push(SkippedDate { date, error });
            }
            Err(error) => return Err(error),
        }
    }

    info!(
        "📋 Catalog sync done: {} new documents, {} dates skipped",
        report.documents_inserted,
        report.skipped_dates.len()
    );
    Ok(report)
}
