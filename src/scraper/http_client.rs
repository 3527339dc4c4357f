use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Raw page body plus the URL the server finally answered from.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub body: String,
}

/// Browser-looking HTTP session. One attempt per request, no retries.
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        if let Ok(accept) = HeaderValue::from_str(&config.accept) {
            headers.insert(ACCEPT, accept);
        }

        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            // Keep the JSESSIONID between list and detail requests
            .cookie_store(true)
            .build()
            .map_err(ScrapeError::Client)?;

        Ok(Self { inner })
    }

    /// GET `base` with `params` appended in order. Non-2xx is an error.
    pub async fn get_page(
        &self,
        base: &str,
        params: &[(&str, &str)],
        extra_headers: HeaderMap,
    ) -> Result<FetchedPage, ScrapeError> {
        let url = Url::parse_with_params(base, params).map_err(|source| ScrapeError::Url {
            url: base.to_string(),
            source,
        })?;
        debug!("GET {}", url);

        let fetch_err = |source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        };

        let resp = self
            .inner
            .get(url.clone())
            .headers(extra_headers)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_err)?;

        let final_url = resp.url().to_string();
        let body = resp.text().await.map_err(fetch_err)?;

        Ok(FetchedPage {
            url: final_url,
            body,
        })
    }
}

/// Headers the list endpoint expects from its own AJAX caller.
pub fn ajax_headers(config: &ScraperConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(lang) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, lang);
    }
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    );
    headers
}
