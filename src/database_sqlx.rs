use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    Row, Sqlite, SqliteConnection, SqlitePool, Transaction,
};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{DatabaseStats, DividendRecord, Document, FinancialRecord, QueuedDocument};

/// SQLX-based storage for documents and extracted figures
#[derive(Clone)]
pub struct DatabaseManagerSqlx {
    pool: SqlitePool,
}

impl DatabaseManagerSqlx {
    /// Open (or create) the database file and make sure the schema exists
    pub async fn new(database_path: &str) -> Result<Self> {
        let database_path = database_path.strip_prefix("sqlite:").unwrap_or(database_path);

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.create_schema().await?;
        info!("💾 Database ready at {}", database_path);

        Ok(db)
    }

    async fn create_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                doc_id TEXT PRIMARY KEY,
                sec_code TEXT,
                period_end TEXT,
                processed INTEGER NOT NULL DEFAULT 0
            )
            "#
        ).execute(&self.pool).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS financials (
                sec_code TEXT NOT NULL,
                year INTEGER NOT NULL,
                revenue REAL,
                operating REAL,
                net_income REAL,
                PRIMARY KEY (sec_code, year)
            )
            "#
        ).execute(&self.pool).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS dividends (
                sec_code TEXT NOT NULL,
                year INTEGER NOT NULL,
                dividend REAL,
                PRIMARY KEY (sec_code, year)
            )
            "#
        ).execute(&self.pool).await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_processed ON documents(processed)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a transaction covering one unit of work
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Insert a newly listed document. Returns false if the doc_id was already known.
    pub async fn insert_document_if_absent(
        conn: &mut SqliteConnection,
        doc_id: &str,
        sec_code: Option<&str>,
        period_end: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO documents (doc_id, sec_code, period_end) VALUES (?, ?, ?)"
        )
        .bind(doc_id)
        .bind(sec_code)
        .bind(period_end)
        .execute(&mut *conn)
        .await?;

        let inserted = result.rows_affected() == 1;
        if !inserted {
            debug!("Document {} already in catalog", doc_id);
        }
        Ok(inserted)
    }

    pub async fn get_document(&self, doc_id: &str) -> Result<Option<Document>> {
        let row = sqlx::query(
            "SELECT doc_id, sec_code, period_end, processed FROM documents WHERE doc_id = ?"
        )
        .bind(doc_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Document {
            doc_id: r.get::<String, _>("doc_id"),
            sec_code: r.get::<Option<String>, _>("sec_code"),
            period_end: r.get::<Option<String>, _>("period_end"),
            processed: r.get::<bool, _>("processed"),
        }))
    }

    /// Documents still waiting for extraction, read fresh on every call
    pub async fn get_unprocessed_documents(&self) -> Result<Vec<QueuedDocument>> {
        let rows = sqlx::query(
            r#"
            SELECT doc_id, sec_code, period_end
            FROM documents
            WHERE processed = 0
            ORDER BY doc_id
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| QueuedDocument {
            doc_id: r.get::<String, _>("doc_id"),
            sec_code: r.get::<Option<String>, _>("sec_code"),
            period_end: r.get::<Option<String>, _>("period_end"),
        }).collect())
    }

    /// Replace the financial row for (sec_code, year)
    pub async fn upsert_financials(conn: &mut SqliteConnection, record: &FinancialRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO financials (sec_code, year, revenue, operating, net_income)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(sec_code, year) DO UPDATE SET
                revenue = excluded.revenue,
                operating = excluded.operating,
                net_income = excluded.net_income
            "#
        )
        .bind(&record.sec_code)
        .bind(record.year)
        .bind(record.revenue)
        .bind(record.operating_income)
        .bind(record.net_income)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Replace the dividend row for (sec_code, year)
    pub async fn upsert_dividend(conn: &mut SqliteConnection, record: &DividendRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO dividends (sec_code, year, dividend)
            VALUES (?, ?, ?)
            ON CONFLICT(sec_code, year) DO UPDATE SET
                dividend = excluded.dividend
            "#
        )
        .bind(&record.sec_code)
        .bind(record.year)
        .bind(record.dividend)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Flip the processed flag; returns the number of rows touched
    pub async fn mark_processed(conn: &mut SqliteConnection, doc_id: &str) -> Result<u64> {
        let result = sqlx::query("UPDATE documents SET processed = 1 WHERE doc_id = ?")
            .bind(doc_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn get_financial_record(&self, sec_code: &str, year: i32) -> Result<Option<FinancialRecord>> {
        let row = sqlx::query(
            "SELECT sec_code, year, revenue, operating, net_income FROM financials WHERE sec_code = ? AND year = ?"
        )
        .bind(sec_code)
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| FinancialRecord {
            sec_code: r.get::<String, _>("sec_code"),
            year: r.get::<i32, _>("year"),
            revenue: r.get::<Option<f64>, _>("revenue"),
            operating_income: r.get::<Option<f64>, _>("operating"),
            net_income: r.get::<Option<f64>, _>("net_income"),
        }))
    }

    pub async fn get_dividend_record(&self, sec_code: &str, year: i32) -> Result<Option<DividendRecord>> {
        let row = sqlx::query(
            "SELECT sec_code, year, dividend FROM dividends WHERE sec_code = ? AND year = ?"
        )
        .bind(sec_code)
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| DividendRecord {
            sec_code: r.get::<String, _>("sec_code"),
            year: r.get::<i32, _>("year"),
            dividend: r.get::<Option<f64>, _>("dividend"),
        }))
    }

    /// Tail sample of the catalog, newest doc_id first
    pub async fn get_recent_documents(&self, limit: i64) -> Result<Vec<Document>> {
        let rows = sqlx::query(
            r#"
            SELECT doc_id, sec_code, period_end, processed
            FROM documents
            ORDER BY doc_id DESC
            LIMIT ?
            "#
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| Document {
            doc_id: r.get::<String, _>("doc_id"),
            sec_code: r.get::<Option<String>, _>("sec_code"),
            period_end: r.get::<Option<String>, _>("period_end"),
            processed: r.get::<bool, _>("processed"),
        }).collect())
    }

    /// Get database statistics
    pub async fn get_stats(&self) -> Result<DatabaseStats> {
        let documents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        let processed_documents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE processed = 1")
            .fetch_one(&self.pool)
            .await?;
        let financial_records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM financials")
            .fetch_one(&self.pool)
            .await?;
        let dividend_records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dividends")
            .fetch_one(&self.pool)
            .await?;

        Ok(DatabaseStats {
            documents,
            processed_documents,
            financial_records,
            dividend_records,
        })
    }
}
