//! Pulls raw hour/temperature tokens out of an observation page.

use crate::weather_data::error::WeatherDataError;
use scraper::{ElementRef, Html, Selector};

const HOUR_CELL: usize = 0;
const TEMPERATURE_CELL: usize = 2;
const HEADER_LABEL: &str = "heurelocale";

/// Compiled selectors for the observation table, its rows and cells.
#[derive(Debug, Clone)]
pub struct TableSelectors {
    source: String,
    table: Selector,
    row: Selector,
    cell: Selector,
}

impl TableSelectors {
    pub fn new(table_selector: &str) -> Result<Self, WeatherDataError> {
        Ok(Self {
            source: table_selector.to_string(),
            table: parse_selector(table_selector)?,
            row: parse_selector("tr")?,
            cell: parse_selector("td")?,
        })
    }

    pub fn table_selector(&self) -> &str {
        &self.source
    }
}

fn parse_selector(selector: &str) -> Result<Selector, WeatherDataError> {
    Selector::parse(selector).map_err(|e| WeatherDataError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Tokens of one table row, before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// Trimmed text of the hour cell, e.g. `23h54`.
    pub hour: Option<String>,
    /// Temperature cell with everything but digits, `.` and `-` removed.
    pub temperature: Option<String>,
}

/// Returns the data rows of the observation table, or `None` when the page
/// has no such table. The header row and rows without cells are skipped.
pub fn extract_rows(html: &str, selectors: &TableSelectors) -> Option<Vec<RawRow>> {
    let document = Html::parse_document(html);
    let table = document.select(&selectors.table).next()?;

    let rows = table
        .select(&selectors.row)
        .filter_map(|row| {
            let cells: Vec<ElementRef> = row.select(&selectors.cell).collect();
            if cells.is_empty() {
                return None;
            }
            let hour = cells.get(HOUR_CELL).map(|cell| cell_text(cell).trim().to_string());
            if hour.as_deref().is_some_and(is_header) {
                return None;
            }
            let temperature = cells
                .get(TEMPERATURE_CELL)
                .map(|cell| numeric_chars(&cell_text(cell)));
            Some(RawRow { hour, temperature })
        })
        .collect();

    Some(rows)
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect()
}

fn is_header(text: &str) -> bool {
    let squashed: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    squashed.eq_ignore_ascii_case(HEADER_LABEL)
}

fn numeric_chars(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect()
}

/// Parses the longest prefix of `token` that reads as a decimal number
/// (`-4.5`, `.5`, `12.`), ignoring whatever follows it.
pub fn parse_float_prefix(token: &str) -> Option<f64> {
    let bytes = token.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }
    token[..end].parse().ok()
}
