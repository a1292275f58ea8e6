use tracing::debug;

use crate::database_sqlx::DatabaseManagerSqlx;
use crate::error::{IngestError, Result};
use crate::models::{DividendRecord, ExtractedFigures, FinancialRecord, QueuedDocument};
use crate::utils::fiscal_year;

/// What a successful persist wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistOutcome {
    pub year: i32,
    pub wrote_financials: bool,
    pub wrote_dividend: bool,
}

/// Store the figures of one document and take it off the queue.
///
/// The financial row is written only when revenue was found (operating and
/// net income ride along, possibly null). The dividend row is written only
/// when a dividend was found. All writes and the processed flag share one
/// transaction.
pub async fn persist_figures(
    database: &DatabaseManagerSqlx,
    document: &QueuedDocument,
    figures: &ExtractedFigures,
) -> Result<PersistOutcome> {
    let sec_code = document
        .sec_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .ok_or_else(|| IngestError::MissingIssuer(document.doc_id.clone()))?;

    let period_end = document.period_end.as_deref().unwrap_or_default();
    let year = fiscal_year(period_end)
        .ok_or_else(|| IngestError::InvalidPeriod(period_end.to_string()))?;

    let mut outcome = PersistOutcome { year, ..Default::default() };
    let mut tx = database.begin().await?;

    if figures.revenue.is_some() {
        let record = FinancialRecord {
            sec_code: sec_code.to_string(),
            year,
            revenue: figures.revenue,
            operating_income: figures.operating_income,
            net_income: figures.net_income,
        };
        DatabaseManagerSqlx::upsert_financials(&mut tx, &record).await?;
        outcome.wrote_financials = true;
    }

    if figures.dividend.is_some() {
        let record = DividendRecord {
            sec_code: sec_code.to_string(),
            year,
            dividend: figures.dividend,
        };
        DatabaseManagerSqlx::upsert_dividend(&mut tx, &record).await?;
        outcome.wrote_dividend = true;
    }

    DatabaseManagerSqlx::mark_processed(&mut tx, &document.doc_id).await?;
    tx.commit().await?;

    debug!(
        "Persisted {} as {}/{} (financials: {}, dividend: {})",
        document.doc_id, sec_code, year, outcome.wrote_financials, outcome.wrote_dividend
    );
    Ok(outcome)
}
