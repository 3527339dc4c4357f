use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Scraper configuration: where the TARIC pages live and how we ask for them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    /// Scheme + host of the site. Site-relative links are resolved against it.
    #[serde(default = "default_site_origin")]
    pub site_origin: String,

    #[serde(default = "default_list_path")]
    pub list_path: String,

    #[serde(default = "default_detail_path")]
    pub detail_path: String,

    #[serde(default = "default_lang")]
    pub lang: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept")]
    pub accept: String,

    /// Sent on the list (AJAX) endpoint only.
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Max detail pages in flight. 1 keeps the plain sequential N+1 behaviour.
    #[serde(default = "default_detail_concurrency")]
    pub detail_concurrency: usize,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_site_origin() -> String {
    "https://ec.europa.eu".to_string()
}
fn default_list_path() -> String {
    "/taxation_customs/dds2/taric/quota_list.jsp".to_string()
}
fn default_detail_path() -> String {
    "/taxation_customs/dds2/taric/quota_tariff_details.jsp".to_string()
}
fn default_lang() -> String {
    "en".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}
fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string()
}
fn default_accept_language() -> String {
    "en-US,en;q=0.5".to_string()
}
fn default_detail_concurrency() -> usize {
    1
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            site_origin: default_site_origin(),
            list_path: default_list_path(),
            detail_path: default_detail_path(),
            lang: default_lang(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            accept: default_accept(),
            accept_language: default_accept_language(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detail_concurrency: default_detail_concurrency(),
        }
    }
}

impl ScraperConfig {
    /// Site origin without a trailing slash.
    pub fn origin(&self) -> &str {
        self.site_origin.trim_end_matches('/')
    }

    pub fn list_url(&self) -> String {
        format!("{}{}", self.origin(), self.list_path)
    }

    pub fn detail_url(&self) -> String {
        format!("{}{}", self.origin(), self.detail_path)
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("TARIC").separator("__"))
            .build()?;

        Self::from_layers(cfg)
    }

    /// Any bad value fails the whole load rather than silently using defaults.
    fn from_layers(cfg: config::Config) -> Result<Self> {
        cfg.try_deserialize().context("Invalid configuration")
    }
}
