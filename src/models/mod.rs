use serde::{Deserialize, Serialize};

/// Report type code of the annual securities report
pub const ANNUAL_REPORT_DOC_TYPE: &str = "120";

/// Disclosure document known to the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: String,
    pub sec_code: Option<String>,
    pub period_end: Option<String>,
    pub processed: bool,
}

/// Projection of a document still waiting for extraction
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedDocument {
    pub doc_id: String,
    pub sec_code: Option<String>,
    pub period_end: Option<String>,
}

/// Income figures for one issuer and fiscal year
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialRecord {
    pub sec_code: String,
    pub year: i32,
    pub revenue: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
}

/// Dividend figure for one issuer and fiscal year
#[derive(Debug, Clone, PartialEq)]
pub struct DividendRecord {
    pub sec_code: String,
    pub year: i32,
    pub dividend: Option<f64>,
}

/// Figures pulled out of one XBRL document
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExtractedFigures {
    pub revenue: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
    pub dividend: Option<f64>,
}

impl ExtractedFigures {
    pub fn is_empty(&self) -> bool {
        self.revenue.is_none()
            && self.operating_income.is_none()
            && self.net_income.is_none()
            && self.dividend.is_none()
    }
}

/// One item of the registry's daily listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingEntry {
    #[serde(rename = "docID")]
    pub doc_id: Option<String>,
    #[serde(rename = "docTypeCode")]
    pub doc_type_code: Option<String>,
    #[serde(rename = "secCode")]
    pub sec_code: Option<String>,
    #[serde(rename = "periodEnd")]
    pub period_end: Option<String>,
    #[serde(rename = "filerName")]
    pub filer_name: Option<String>,
}

/// Status block the registry attaches to listing responses
#[derive(Debug, Clone, Deserialize)]
pub struct ListingMetadata {
    pub status: Option<String>,
    pub message: Option<String>,
}

/// Registry listing response
#[derive(Debug, Deserialize)]
pub struct ListingResponse {
    pub metadata: Option<ListingMetadata>,
    /// Only present on gateway-level errors (bad or missing API key)
    #[serde(rename = "StatusCode")]
    pub status_code: Option<u16>,
    pub message: Option<String>,
    #[serde(default)]
    pub results: Vec<ListingEntry>,
}

/// Row counts shown by the status report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabaseStats {
    pub documents: i64,
    pub processed_documents: i64,
    pub financial_records: i64,
    pub dividend_records: i64,
}

impl DatabaseStats {
    /// Documents still queued; their bundles are fetched again on every run
    pub fn pending_documents(&self) -> i64 {
        self.documents - self.processed_documents
    }
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub edinet_base_url: String,
    pub edinet_api_key: Option<String>,
    pub user_agent: String,
    pub scan_days: u32,
    pub target_doc_type: String,
    pub rate_limit_per_minute: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: "database.db".to_string(),
            edinet_base_url: "https://disclosure.edinet-fsa.go.jp/api/v1".to_string(),
            edinet_api_key: None,
            user_agent: "edinet-dividends/0.1".to_string(),
            scan_days: 30,
            target_doc_type: ANNUAL_REPORT_DOC_TYPE.to_string(),
            rate_limit_per_minute: 0,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if it exists
        let defaults = Config::default();

        Config {
            database_path: std::env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            edinet_base_url: std::env::var("EDINET_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.edinet_base_url),
            edinet_api_key: std::env::var("EDINET_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            user_agent: std::env::var("EDINET_USER_AGENT").unwrap_or(defaults.user_agent),
            scan_days: std::env::var("SCAN_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.scan_days),
            target_doc_type: std::env::var("TARGET_DOC_TYPE").unwrap_or(defaults.target_doc_type),
            rate_limit_per_minute: std::env::var("RATE_LIMIT_PER_MINUTE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rate_limit_per_minute),
        }
    }
}
