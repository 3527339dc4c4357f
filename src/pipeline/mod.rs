//! Query orchestrator: list page → optional per-row detail pages → result.
//!
//! ## Detail enrichment
//!
//! With `include_details` each record whose start date reformats to ISO gets
//! one extra detail request. A failed or empty detail fetch leaves that
//! record's `details` unset and never fails the query.
//!
//! `pipeline.detail_concurrency = 1` issues the detail requests one after the
//! other (N+1 requests total). Larger values fan out under a semaphore; the
//! output keeps the table's row order either way.

use crate::config::AppConfig;
use crate::error::ScrapeError;
use crate::models::{QuotaDetail, QuotaListRecord, QuotaQuery, QuotaQueryResult};
use crate::scraper::cleaner::to_iso_date;
use crate::scraper::{QuotaSource, TaricScraper};
use crate::utils::Timer;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

pub struct Pipeline<S: QuotaSource + 'static> {
    source: Arc<S>,
    detail_concurrency: usize,
}

impl Pipeline<TaricScraper> {
    pub fn from_config(config: &AppConfig) -> Result<Self, ScrapeError> {
        Ok(Self::new(
            TaricScraper::new(&config.scraper)?,
            config.pipeline.detail_concurrency,
        ))
    }
}

impl<S: QuotaSource + 'static> Pipeline<S> {
    pub fn new(source: S, detail_concurrency: usize) -> Self {
        Self {
            source: Arc::new(source),
            detail_concurrency: detail_concurrency.max(1),
        }
    }

    pub async fn run(&self, query: &QuotaQuery) -> Result<QuotaQueryResult, ScrapeError> {
        let _t = Timer::start(format!(
            "Quota query origin={:?} code={:?} year={}",
            query.origin, query.order_number, query.year
        ));

        let page = self.source.fetch_list(query).await?;

        let Some(mut records) = page.records else {
            return Ok(QuotaQueryResult::empty(query));
        };

        if query.include_details {
            self.attach_details(&mut records).await;
        }

        info!("Successfully scraped {} quota records", records.len());
        Ok(QuotaQueryResult::found(query, records, page.request_url))
    }

    async fn attach_details(&self, records: &mut [QuotaListRecord]) {
        if self.detail_concurrency <= 1 {
            for record in records.iter_mut() {
                let details = fetch_details(self.source.as_ref(), record).await;
                record.details = details;
            }
            return;
        }

        let sem = Arc::new(Semaphore::new(self.detail_concurrency));
        let mut handles = Vec::with_capacity(records.len());

        for record in records.iter() {
            let source = Arc::clone(&self.source);
            let sem = Arc::clone(&sem);
            let record = record.clone();

            handles.push(tokio::spawn(async move {
                let _permit = sem.acquire().await.ok()?;
                fetch_details(source.as_ref(), &record).await
            }));
        }

        for (record, handle) in records.iter_mut().zip(handles) {
            record.details = match handle.await {
                Ok(details) => details,
                Err(e) => {
                    error!("Detail task panic for {}: {}", record.order_number, e);
                    None
                }
            };
        }
    }
}

/// Details for one list row, or `None` for any failure or empty page.
async fn fetch_details<S: QuotaSource + ?Sized>(
    source: &S,
    record: &QuotaListRecord,
) -> Option<QuotaDetail> {
    if record.start_date.is_empty() {
        return None;
    }
    let Some(start_date) = to_iso_date(&record.start_date) else {
        warn!(
            "{}: unexpected start date {:?}, skipping details",
            record.order_number, record.start_date
        );
        return None;
    };

    match source.fetch_detail(&record.order_number, &start_date).await {
        Ok(Some(details)) if !details.is_empty() => Some(details),
        Ok(_) => None,
        Err(e) if e.is_timeout() => {
            warn!("Timed out fetching details for {}", record.order_number);
            None
        }
        Err(e) => {
            warn!("Could not fetch details for {}: {}", record.order_number, e);
            None
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
