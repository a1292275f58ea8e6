use chrono::NaiveDate;
use std::time::Duration;

use crate::error::Result;
use crate::models::ListingEntry;

pub mod edinet_client;
pub use edinet_client::EdinetClient;

/// Simple pacing for registry requests
pub struct ApiRateLimiter {
    delay_ms: u64,
}

impl ApiRateLimiter {
    /// `0` requests per minute disables pacing
    pub fn new(requests_per_minute: u32) -> Self {
        let delay_ms = if requests_per_minute > 0 {
            60_000 / requests_per_minute as u64
        } else {
            0
        };

        Self { delay_ms }
    }

    pub async fn wait(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }
}

/// Source of listings and document bundles
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FilingSource: Send + Sync {
    /// Documents published on the given date
    async fn list_documents(&self, date: NaiveDate) -> Result<Vec<ListingEntry>>;

    /// Raw zip bundle of the main document
    async fn download_bundle(&self, doc_id: &str) -> Result<Vec<u8>>;
}
