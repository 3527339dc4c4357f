//! Detail-page field table: which key a row label maps to, and how the value
//! cell for that key is decoded.

use crate::models::{DetailValue, TaricCode};
use crate::scraper::cleaner::{
    element_text, own_text, slugify, split_period, split_quantity, stripped_text,
};
use scraper::{ElementRef, Selector};

/// Display label → output key.
const LABEL_KEYS: &[(&str, &str)] = &[
    ("Order number", "order_number"),
    ("Validity period", "validity_period"),
    ("Origin", "origin"),
    ("Initial amount", "initial_amount"),
    ("Amount", "amount"),
    ("Balance", "balance"),
    ("Transferred Amount", "transferred_amount"),
    ("Exhaustion date", "exhaustion_date"),
    ("Critical", "critical"),
    ("Last import date", "last_import_date"),
    ("Last allocation date", "last_allocation_date"),
    ("Blocking period", "blocking_period"),
    ("Suspension period", "suspension_period"),
    ("Allocated percentage at the last allocation", "allocated_percentage"),
    ("Associated TARIC code", "associated_taric_code"),
];

/// This label carries markup that defeats exact matching, so it is matched
/// by substring on the full cell text.
const AWAITING_ALLOCATION_LABEL: &str = "Total awaiting allocation";
pub const AWAITING_ALLOCATION_KEY: &str = "total_awaiting_allocation";

/// Resolve the output key for a label cell.
pub fn label_key(label_cell: ElementRef<'_>) -> String {
    let full_text: String = label_cell.text().collect();
    if full_text.contains(AWAITING_ALLOCATION_LABEL) {
        return AWAITING_ALLOCATION_KEY.to_string();
    }

    let mut label = own_text(label_cell);
    if label.is_empty() {
        label = stripped_text(label_cell);
    }
    key_for_label(&label)
}

/// Map cleaned label text to a key, slugging anything unknown.
pub fn key_for_label(label: &str) -> String {
    let label = label.replace(':', "");
    let label = label.trim();
    LABEL_KEYS
        .iter()
        .find(|(text, _)| *text == label)
        .map(|(_, key)| key.to_string())
        .unwrap_or_else(|| slugify(label))
}

// ── Decoding rules ────────────────────────────────────────────────────────────

/// How a value cell is turned into a [`DetailValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// One entry per nested `<div>`.
    Origins,
    /// Anchors become `{code, url}`; a single one is unwrapped.
    TaricCodes,
    /// One entry per row of a nested table.
    Transfers,
    /// "start - end" pair.
    Period,
    /// Quantity followed by a unit.
    Quantity,
    Text,
}

impl FieldRule {
    pub fn for_key(key: &str) -> Self {
        match key {
            "origin" => FieldRule::Origins,
            "associated_taric_code" => FieldRule::TaricCodes,
            "transferred_amount" => FieldRule::Transfers,
            "validity_period" => FieldRule::Period,
            "initial_amount" | "amount" | "balance" => FieldRule::Quantity,
            _ => FieldRule::Text,
        }
    }

    pub fn decode(self, cell: ElementRef<'_>, sel: &CellSelectors) -> Option<DetailValue> {
        match self {
            FieldRule::Origins => {
                let origins: Vec<String> = cell.select(&sel.div).map(stripped_text).collect();
                if origins.is_empty() {
                    text_value(cell)
                } else {
                    Some(DetailValue::List(origins))
                }
            }
            FieldRule::TaricCodes => {
                let anchors: Vec<ElementRef<'_>> = cell.select(&sel.anchor).collect();
                if anchors.is_empty() {
                    return text_value(cell);
                }
                let mut codes: Vec<TaricCode> = anchors
                    .into_iter()
                    .filter_map(|a| {
                        let code = stripped_text(a);
                        (!code.is_empty()).then(|| TaricCode {
                            code,
                            url: a.value().attr("href").map(str::to_string),
                        })
                    })
                    .collect();
                if codes.len() == 1 {
                    codes.pop().map(DetailValue::Code)
                } else {
                    Some(DetailValue::Codes(codes))
                }
            }
            FieldRule::Transfers => {
                let Some(nested) = cell.select(&sel.table).next() else {
                    return text_value(cell);
                };
                let transfers: Vec<String> =
                    nested.select(&sel.row).filter_map(element_text).collect();
                if transfers.is_empty() {
                    None
                } else {
                    Some(DetailValue::List(transfers))
                }
            }
            FieldRule::Period => split_period(element_text(cell)),
            FieldRule::Quantity => {
                split_quantity(element_text(cell).as_deref()).map(DetailValue::Quantity)
            }
            FieldRule::Text => text_value(cell),
        }
    }
}

fn text_value(cell: ElementRef<'_>) -> Option<DetailValue> {
    element_text(cell).map(DetailValue::Text)
}

/// Selectors used inside value cells, compiled once per document.
pub struct CellSelectors {
    div: Selector,
    anchor: Selector,
    table: Selector,
    row: Selector,
}

impl CellSelectors {
    pub fn new() -> Result<Self, crate::error::ScrapeError> {
        Ok(Self {
            div: super::parsers::selector("div")?,
            anchor: super::parsers::selector("a")?,
            table: super::parsers::selector("table")?,
            row: super::parsers::selector("tr")?,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Period, Quantity};
    use scraper::Html;

    fn decode_cell(key: &str, cell_html: &str) -> Option<DetailValue> {
        let html = format!(r#"<table><tr><td id="v">{}</td></tr></table>"#, cell_html);
        let doc = Html::parse_fragment(&html);
        let td = doc.select(&Selector::parse("td#v").unwrap()).next().unwrap();
        FieldRule::for_key(key).decode(td, &CellSelectors::new().unwrap())
    }

    fn key_of(cell_html: &str) -> String {
        let html = format!(r#"<table><tr><td id="l">{}</td></tr></table>"#, cell_html);
        let doc = Html::parse_fragment(&html);
        let td = doc.select(&Selector::parse("td#l").unwrap()).next().unwrap();
        label_key(td)
    }

    #[test]
    fn test_known_labels() {
        assert_eq!(key_of("Order number:"), "order_number");
        assert_eq!(
            key_of("Allocated percentage at the last allocation"),
            "allocated_percentage"
        );
        assert_eq!(key_of(r#"Balance <a href="/help">?</a>"#), "balance");
    }

    #[test]
    fn test_unknown_label_is_slugged() {
        assert_eq!(key_of("Quota Type:"), "quota_type");
    }

    #[test]
    fn test_label_only_in_nested_element() {
        assert_eq!(key_of("<span>Critical</span>"), "critical");
    }

    #[test]
    fn test_awaiting_allocation_label() {
        assert_eq!(
            key_of("Total awaiting allocation (kg): 500"),
            AWAITING_ALLOCATION_KEY
        );
        assert_eq!(
            key_of(r#"<span>Total awaiting allocation</span> <img src="x.png">"#),
            AWAITING_ALLOCATION_KEY
        );
    }

    #[test]
    fn test_rule_table() {
        assert_eq!(FieldRule::for_key("origin"), FieldRule::Origins);
        assert_eq!(FieldRule::for_key("amount"), FieldRule::Quantity);
        assert_eq!(FieldRule::for_key("critical"), FieldRule::Text);
        assert_eq!(FieldRule::for_key("quota_type"), FieldRule::Text);
    }

    #[test]
    fn test_origins() {
        assert_eq!(
            decode_cell("origin", "<div> Morocco (MA) </div><div>Tunisia (TN)</div>"),
            Some(DetailValue::List(vec![
                "Morocco (MA)".into(),
                "Tunisia (TN)".into()
            ]))
        );
        assert_eq!(
            decode_cell("origin", " ERGA OMNES\n"),
            Some(DetailValue::Text("ERGA OMNES".into()))
        );
    }

    #[test]
    fn test_taric_codes() {
        assert_eq!(
            decode_cell("associated_taric_code", r#"<a href="/t?c=0702">0702 00 00 07</a>"#),
            Some(DetailValue::Code(TaricCode {
                code: "0702 00 00 07".into(),
                url: Some("/t?c=0702".into())
            }))
        );
        assert_eq!(
            decode_cell(
                "associated_taric_code",
                r#"<a href="/a">0702</a><a>0703</a><a href="/empty"> </a>"#
            ),
            Some(DetailValue::Codes(vec![
                TaricCode {
                    code: "0702".into(),
                    url: Some("/a".into())
                },
                TaricCode {
                    code: "0703".into(),
                    url: None
                },
            ]))
        );
        assert_eq!(
            decode_cell("associated_taric_code", "none"),
            Some(DetailValue::Text("none".into()))
        );
    }

    #[test]
    fn test_transfers() {
        assert_eq!(
            decode_cell(
                "transferred_amount",
                "<table><tr><td>100 kg on\n01-02-2026</td></tr><tr><td> </td></tr></table>"
            ),
            Some(DetailValue::List(vec!["100 kg on 01-02-2026".into()]))
        );
        assert_eq!(decode_cell("transferred_amount", "<table></table>"), None);
        assert_eq!(
            decode_cell("transferred_amount", "0 Kilogram"),
            Some(DetailValue::Text("0 Kilogram".into()))
        );
    }

    #[test]
    fn test_period_and_quantity() {
        assert_eq!(
            decode_cell("validity_period", "01-01-2026 - 31-12-2026"),
            Some(DetailValue::Period(Period {
                start: "01-01-2026".into(),
                end: "31-12-2026".into()
            }))
        );
        assert_eq!(
            decode_cell("initial_amount", "1,500,000&nbsp;Kilogram"),
            Some(DetailValue::Quantity(Quantity {
                quantity: "1500000".into(),
                unit: Some("Kilogram".into())
            }))
        );
        assert_eq!(decode_cell("balance", "   "), None);
        assert_eq!(decode_cell("exhaustion_date", ""), None);
    }
}
