pub mod cleaner;
pub mod fields;
pub mod http_client;
pub mod parsers;

use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::models::{QuotaDetail, QuotaListRecord, QuotaQuery};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tracing::{debug, info};

use self::http_client::{ajax_headers, HttpClient};
use self::parsers::{parse_quota_detail, parse_quota_list};

/// Parsed list endpoint response.
#[derive(Debug, Clone)]
pub struct ListPage {
    /// `None` when the page has no results table.
    pub records: Option<Vec<QuotaListRecord>>,
    pub request_url: String,
}

// ── Source trait ──────────────────────────────────────────────────────────────

/// Where quota pages come from.
#[async_trait]
pub trait QuotaSource: Send + Sync {
    async fn fetch_list(&self, query: &QuotaQuery) -> Result<ListPage, ScrapeError>;

    /// `start_date` is ISO (YYYY-MM-DD). `Ok(None)` when the page has no details table.
    async fn fetch_detail(
        &self,
        order_number: &str,
        start_date: &str,
    ) -> Result<Option<QuotaDetail>, ScrapeError>;
}

// ── TARIC scraper ─────────────────────────────────────────────────────────────

pub struct TaricScraper {
    client: HttpClient,
    config: ScraperConfig,
}

impl TaricScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            client: HttpClient::new(config)?,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl QuotaSource for TaricScraper {
    async fn fetch_list(&self, query: &QuotaQuery) -> Result<ListPage, ScrapeError> {
        info!(
            "Fetching TARIC data for Origin={:?}, Code={:?}, Year={}",
            query.origin, query.order_number, query.year
        );

        let year = query.year.to_string();
        let offset = query.offset.to_string();
        let params = [
            ("Lang", self.config.lang.as_str()),
            ("Origin", query.origin.as_deref().unwrap_or("")),
            ("Code", query.order_number.as_deref().unwrap_or("")),
            ("Year", year.as_str()),
            ("Status", ""),
            ("Critical", ""),
            ("Expand", "false"),
            ("Offset", offset.as_str()),
        ];

        let page = self
            .client
            .get_page(&self.config.list_url(), &params, ajax_headers(&self.config))
            .await?;
        debug!("Request URL: {}", page.url);

        Ok(ListPage {
            records: parse_quota_list(&page.body, self.config.origin())?,
            request_url: page.url,
        })
    }

    async fn fetch_detail(
        &self,
        order_number: &str,
        start_date: &str,
    ) -> Result<Option<QuotaDetail>, ScrapeError> {
        debug!(
            "Fetching quota details for Code={}, StartDate={}",
            order_number, start_date
        );

        let params = [
            ("Lang", self.config.lang.as_str()),
            ("StartDate", start_date),
            ("Code", order_number),
        ];

        let page = self
            .client
            .get_page(&self.config.detail_url(), &params, HeaderMap::new())
            .await?;

        parse_quota_detail(&page.body)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
