use chrono::NaiveDate;
use reqwest::{header::CONTENT_TYPE, Client, Response};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{ApiRateLimiter, FilingSource};
use crate::error::{IngestError, Result};
use crate::models::{Config, ListingEntry, ListingResponse};

/// Upper bound for one listing call
pub const LISTING_TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound for one bundle download
pub const BUNDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// `type` value asking the listing endpoint for full metadata
const LISTING_TYPE_METADATA: &str = "2";
/// `type` value selecting the main-document zip (as opposed to PDF or attachments)
const BUNDLE_TYPE_MAIN_DOCUMENT: &str = "1";

/// Client for the EDINET document API
pub struct EdinetClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    rate_limiter: ApiRateLimiter,
}

impl EdinetClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(LISTING_TIMEOUT)
            .build()?;

        // Trailing slash so relative joins keep the version segment
        let base_url = Url::parse(&format!("{}/", config.edinet_base_url.trim_end_matches('/')))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.edinet_api_key.clone(),
            rate_limiter: ApiRateLimiter::new(config.rate_limit_per_minute),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("Subscription-Key", key);
        }
        Ok(url)
    }

    fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::HttpStatus {
                status: status.as_u16(),
                url: response.url().path().to_string(),
            });
        }
        Ok(response)
    }
}

/// Decode a listing body, surfacing registry-reported errors
pub fn parse_listing(body: &[u8]) -> Result<Vec<ListingEntry>> {
    let response: ListingResponse = serde_json::from_slice(body)?;

    if let Some(code) = response.status_code {
        if code != 200 {
            return Err(IngestError::Registry {
                status: code.to_string(),
                message: response.message.unwrap_or_default(),
            });
        }
    }

    if let Some(metadata) = &response.metadata {
        if let Some(status) = metadata.status.as_deref() {
            if status != "200" {
                return Err(IngestError::Registry {
                    status: status.to_string(),
                    message: metadata.message.clone().unwrap_or_default(),
                });
            }
        }
    }

    Ok(response.results)
}

#[async_trait::async_trait]
impl FilingSource for EdinetClient {
    async fn list_documents(&self, date: NaiveDate) -> Result<Vec<ListingEntry>> {
        self.rate_limiter.wait().await;

        let url = self.endpoint("documents.json")?;
        let date_str = date.format("%Y-%m-%d").to_string();
        debug!("GET {} date={}", url.path(), date_str);

        let response = self.client
            .get(url)
            .query(&[("date", date_str.as_str()), ("type", LISTING_TYPE_METADATA)])
            .timeout(LISTING_TIMEOUT)
            .send()
            .await?;

        let body = Self::check_status(response)?.bytes().await?;
        parse_listing(&body)
    }

    async fn download_bundle(&self, doc_id: &str) -> Result<Vec<u8>> {
        self.rate_limiter.wait().await;

        let url = self.endpoint(&format!("documents/{}", doc_id))?;
        debug!("GET {}", url.path());

        let response = self.client
            .get(url)
            .query(&[("type", BUNDLE_TYPE_MAIN_DOCUMENT)])
            .timeout(BUNDLE_TIMEOUT)
            .send()
            .await?;

        let response = Self::check_status(response)?;

        // Missing documents come back as a JSON error body rather than a zip
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let body = response.bytes().await?;
        if is_json {
            parse_listing(&body)?;
            return Err(IngestError::Registry {
                status: "200".to_string(),
                message: format!("expected a zip bundle for {}, got JSON", doc_id),
            });
        }

        Ok(body.to_vec())
    }
}
