use crate::error::ScrapeError;
use crate::models::{QuotaDetail, QuotaListRecord};
use crate::scraper::cleaner::{absolute_url, element_text, split_balance, stripped_text};
use crate::scraper::fields::{label_key, CellSelectors, FieldRule};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

pub(crate) fn selector(css: &'static str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|_| ScrapeError::Selector(css))
}

// ── List page ─────────────────────────────────────────────────────────────────

/// Columns: order number | origins | start | end | balance | more info
const LIST_MIN_CELLS: usize = 6;

/// Parse the quota list returned by the AJAX endpoint.
///
/// `Ok(None)` means the results table is not on the page at all, which is
/// how the site answers a query with no matches. Rows with fewer than six
/// cells are dropped; row order is preserved.
pub fn parse_quota_list(
    html: &str,
    site_origin: &str,
) -> Result<Option<Vec<QuotaListRecord>>, ScrapeError> {
    let doc = Html::parse_document(html);

    let table_sel = selector("table#quotaTable")?;
    let body_sel = selector("tbody.ecl-table__body")?;
    let row_sel = selector("tr.ecl-table__row")?;
    let cell_sel = selector("td.ecl-table__cell")?;
    let quota_link_sel = selector("a#quotaLink")?;
    let any_link_sel = selector("a[href]")?;

    let Some(table) = doc.select(&table_sel).next() else {
        warn!("No quota table found in response");
        return Ok(None);
    };

    let Some(tbody) = table.select(&body_sel).next() else {
        return Ok(Some(Vec::new()));
    };

    let rows: Vec<ElementRef<'_>> = tbody.select(&row_sel).collect();
    debug!("Found {} result rows", rows.len());

    let mut records = Vec::with_capacity(rows.len());
    for tr in rows {
        let cells: Vec<ElementRef<'_>> = tr.select(&cell_sel).collect();
        if cells.len() < LIST_MIN_CELLS {
            debug!("Skipping row with {} cells", cells.len());
            continue;
        }

        let more_info_url = cells[5]
            .select(&quota_link_sel)
            .next()
            .or_else(|| cells[5].select(&any_link_sel).next())
            .and_then(|a| a.value().attr("href"))
            .filter(|href| !href.is_empty())
            .map(|href| absolute_url(href, site_origin))
            .unwrap_or_default();

        records.push(QuotaListRecord {
            order_number: stripped_text(cells[0]),
            origins: stripped_text(cells[1]),
            start_date: stripped_text(cells[2]),
            end_date: stripped_text(cells[3]),
            balance: split_balance(element_text(cells[4]).as_deref()),
            more_info_url,
            details: None,
        });
    }

    Ok(Some(records))
}

// ── Detail page ───────────────────────────────────────────────────────────────

/// Parse the label/value table of a quota details page.
///
/// `Ok(None)` when the details container or its table is missing. Once the
/// table is found every row is decoded on a best-effort basis.
pub fn parse_quota_detail(html: &str) -> Result<Option<QuotaDetail>, ScrapeError> {
    let doc = Html::parse_document(html);

    let container_sel = selector("div#quotaDetailsMarkedUpContainer")?;
    let table_sel = selector("table.ecl-table")?;
    let row_sel = selector("tr.ecl-table__row")?;
    let cell_selectors = CellSelectors::new()?;

    let Some(container) = doc.select(&container_sel).next() else {
        warn!("No details container found");
        return Ok(None);
    };
    let Some(table) = container.select(&table_sel).next() else {
        warn!("No details table found");
        return Ok(None);
    };

    let mut details = QuotaDetail::new();
    for tr in table.select(&row_sel) {
        let cells = direct_cells(tr);
        let [label_cell, value_cell, ..] = cells.as_slice() else {
            continue;
        };

        let key = label_key(*label_cell);
        let value = FieldRule::for_key(&key).decode(*value_cell, &cell_selectors);
        details.insert(key, value);
    }

    Ok(Some(details))
}

/// `<td>` children of a row, not those of nested tables.
fn direct_cells(tr: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "td")
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
