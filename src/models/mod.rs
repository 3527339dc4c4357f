use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Query ─────────────────────────────────────────────────────────────────────

/// What to look up. At least one of `origin` / `order_number` is required,
/// which the request boundary checks before building one of these.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaQuery {
    pub origin: Option<String>,
    pub order_number: Option<String>,
    pub year: i32,
    pub offset: u32,
    pub include_details: bool,
}

// ── List page ─────────────────────────────────────────────────────────────────

/// Balance column of the list table. Empty cell → both fields empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Balance {
    pub quantity: String,
    pub unit: String,
}

/// One row of the quota results table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuotaListRecord {
    pub order_number: String,
    pub origins: String,
    pub start_date: String, // DD-MM-YYYY, as displayed
    pub end_date: String,
    pub balance: Balance,
    pub more_info_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<QuotaDetail>,
}

// ── Detail page ───────────────────────────────────────────────────────────────

/// Label-derived key → decoded value. `None` serializes as `null`.
pub type QuotaDetail = BTreeMap<String, Option<DetailValue>>;

/// Amount-like detail field. Unlike [`Balance`], a missing unit is `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quantity {
    pub quantity: String,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Period {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaricCode {
    pub code: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DetailValue {
    Text(String),
    List(Vec<String>),
    Quantity(Quantity),
    Period(Period),
    Code(TaricCode),
    Codes(Vec<TaricCode>),
}

// ── Result ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuotaQueryResult {
    pub success: bool,
    pub origin: Option<String>,
    pub order_number: Option<String>,
    pub year: i32,
    pub results_count: usize,
    pub results: Vec<QuotaListRecord>,
    /// Set only when the results table is missing from the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_url: Option<String>,
}

pub const NO_RESULTS_MESSAGE: &str = "No results found for the given criteria";

impl QuotaQueryResult {
    pub fn found(query: &QuotaQuery, results: Vec<QuotaListRecord>, request_url: String) -> Self {
        Self {
            success: true,
            origin: query.origin.clone(),
            order_number: query.order_number.clone(),
            year: query.year,
            results_count: results.len(),
            results,
            message: None,
            request_url: Some(request_url),
        }
    }

    pub fn empty(query: &QuotaQuery) -> Self {
        Self {
            success: true,
            origin: query.origin.clone(),
            order_number: query.order_number.clone(),
            year: query.year,
            results_count: 0,
            results: Vec::new(),
            message: Some(NO_RESULTS_MESSAGE.to_string()),
            request_url: None,
        }
    }
}
