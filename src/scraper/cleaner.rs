use crate::models::{Balance, DetailValue, Period, Quantity};
use scraper::ElementRef;

// ── Text ──────────────────────────────────────────────────────────────────────

/// Normalise whitespace: NBSP/CR/LF become spaces, runs collapse, ends trimmed.
/// Empty after cleaning → None.
pub fn clean_text(s: &str) -> Option<String> {
    let cleaned = s
        .replace(['\u{a0}', '\r', '\n'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

/// Full visible text of an element, cleaned.
pub fn element_text(el: ElementRef<'_>) -> Option<String> {
    clean_text(&el.text().collect::<String>())
}

/// Every text fragment trimmed, then glued together without separators.
/// "<td> 091100 </td>" → "091100"
pub fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// Text nodes that are direct children of `el`, ignoring nested elements
/// (tooltip links and the like).
pub fn own_text(el: ElementRef<'_>) -> String {
    el.children()
        .filter_map(|node| node.value().as_text())
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Quantities ────────────────────────────────────────────────────────────────

/// First token (commas stripped) and the rest, for an already cleaned string.
fn split_tokens(text: &str) -> Option<(String, Vec<&str>)> {
    let mut parts = text.split_whitespace();
    let quantity = parts.next()?.replace(',', "");
    Some((quantity, parts.collect()))
}

/// List-table balance. Empty text gives an empty pair, never an error.
/// "1,500,000 Kilogram" → ("1500000", "Kilogram") | "" → ("", "")
pub fn split_balance(text: Option<&str>) -> Balance {
    match text.and_then(split_tokens) {
        Some((quantity, rest)) => Balance {
            quantity,
            unit: rest.join(" "),
        },
        None => Balance::default(),
    }
}

/// Detail-page amount. Empty text gives None, a bare number gives `unit: None`.
pub fn split_quantity(text: Option<&str>) -> Option<Quantity> {
    let (quantity, rest) = split_tokens(text?)?;
    Some(Quantity {
        quantity,
        unit: if rest.is_empty() { None } else { Some(rest.join(" ")) },
    })
}

// ── Dates ─────────────────────────────────────────────────────────────────────

const PERIOD_SEPARATOR: &str = " - ";

/// "01-01-2026 - 31-12-2026" → {start, end}; anything else stays text.
pub fn split_period(text: Option<String>) -> Option<DetailValue> {
    let text = text?;
    match text.split_once(PERIOD_SEPARATOR) {
        Some((start, end)) => Some(DetailValue::Period(Period {
            start: start.trim().to_string(),
            end: end.trim().to_string(),
        })),
        None => Some(DetailValue::Text(text)),
    }
}

/// "01-01-2026" → "2026-01-01". Needs exactly three dash-separated parts.
pub fn to_iso_date(s: &str) -> Option<String> {
    let parts: Vec<&str> = s.trim().split('-').collect();
    match parts.as_slice() {
        [day, month, year] => Some(format!("{}-{}-{}", year, month, day)),
        _ => None,
    }
}

// ── Labels & links ────────────────────────────────────────────────────────────

/// Fallback key for labels missing from the lookup table.
/// "Some New Label" → "some_new_label"
pub fn slugify(label: &str) -> String {
    label.to_lowercase().replace(' ', "_")
}

/// Site-relative hrefs get the site origin prepended; anything else is kept.
pub fn absolute_url(href: &str, origin: &str) -> String {
    if href.starts_with('/') {
        format!("{}{}", origin.trim_end_matches('/'), href)
    } else {
        href.to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  a\u{a0}b\r\n  c  ").as_deref(), Some("a b c"));
        assert_eq!(clean_text(" \n\u{a0} "), None);
        assert_eq!(clean_text(""), None);
    }

    #[test]
    fn test_split_balance() {
        assert_eq!(
            split_balance(Some("1,500,000 Kilogram")),
            Balance {
                quantity: "1500000".into(),
                unit: "Kilogram".into()
            }
        );
        assert_eq!(
            split_balance(Some("250 Litre pure alcohol")).unit,
            "Litre pure alcohol"
        );
        assert_eq!(split_balance(Some("7")).unit, "");
        assert_eq!(split_balance(None), Balance::default());
        assert_eq!(split_balance(Some("")), Balance::default());
    }

    #[test]
    fn test_split_quantity() {
        assert_eq!(
            split_quantity(Some("1,500,000 Kilogram")),
            Some(Quantity {
                quantity: "1500000".into(),
                unit: Some("Kilogram".into())
            })
        );
        assert_eq!(
            split_quantity(Some("12")),
            Some(Quantity {
                quantity: "12".into(),
                unit: None
            })
        );
        assert_eq!(split_quantity(None), None);
        assert_eq!(split_quantity(Some("")), None);
    }

    #[test]
    fn test_split_period() {
        assert_eq!(
            split_period(Some("01-01-2026 - 31-12-2026".into())),
            Some(DetailValue::Period(Period {
                start: "01-01-2026".into(),
                end: "31-12-2026".into()
            }))
        );
        assert_eq!(
            split_period(Some("01-01-2026".into())),
            Some(DetailValue::Text("01-01-2026".into()))
        );
        assert_eq!(split_period(None), None);
    }

    #[test]
    fn test_to_iso_date() {
        assert_eq!(to_iso_date("01-07-2026").as_deref(), Some("2026-07-01"));
        assert_eq!(to_iso_date("2026/07/01"), None);
        assert_eq!(to_iso_date("01-07"), None);
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            absolute_url("/taxation_customs/dds2/taric/x.jsp?Code=1", "https://ec.europa.eu"),
            "https://ec.europa.eu/taxation_customs/dds2/taric/x.jsp?Code=1"
        );
        assert_eq!(
            absolute_url("https://example.org/a", "https://ec.europa.eu"),
            "https://example.org/a"
        );
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Some New Label"), "some_new_label");
    }

    #[test]
    fn test_own_text_skips_nested_elements() {
        let doc = Html::parse_fragment(
            r##"<table><tr><td id="c"> Balance <a href="#">(?)</a> </td></tr></table>"##,
        );
        let sel = Selector::parse("td#c").unwrap();
        let td = doc.select(&sel).next().unwrap();
        assert_eq!(own_text(td), "Balance");
        assert_eq!(stripped_text(td), "Balance(?)");
        assert_eq!(element_text(td).as_deref(), Some("Balance (?)"));
    }
}
