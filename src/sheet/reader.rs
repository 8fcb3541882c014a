use crate::sheet::error::SheetError;
use crate::types::interval::MeterReading;
use crate::types::serial_date::SerialDate;
use calamine::{open_workbook_auto, Data, Range, Reader};
use log::{debug, info};
use std::path::Path;

pub const DEFAULT_SHEET: &str = "Suivi Conso New";
/// Zero-based index of the row holding the column titles.
pub const DEFAULT_HEADER_ROW: usize = 2;

const DATE_COLUMN: &str = "Date";
const MIN_COLUMN: &str = "Min";
const MAX_COLUMN: &str = "Max";

/// Reads the meter rows of `sheet`, in sheet order.
pub fn read_meter_readings(
    path: &Path,
    sheet: &str,
    header_row: usize,
) -> Result<Vec<MeterReading>, SheetError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| SheetError::Open(path.to_path_buf(), e))?;
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|source| SheetError::Sheet {
            sheet: sheet.to_string(),
            source,
        })?;

    let readings = readings_from_range(&range, sheet, header_row)?;
    info!(
        "Read {} meter rows from '{}' in {}",
        readings.len(),
        sheet,
        path.display()
    );
    Ok(readings)
}

/// Maps the `Date`, `Min` and `Max` columns below the header row into
/// readings. Rows where all three cells are empty are skipped.
pub fn readings_from_range(
    range: &Range<Data>,
    sheet: &str,
    header_row: usize,
) -> Result<Vec<MeterReading>, SheetError> {
    let missing_header = || SheetError::MissingHeaderRow {
        sheet: sheet.to_string(),
        row: header_row,
    };
    // The range starts at the first used cell, not at A1.
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let skip = header_row.checked_sub(first_row).ok_or_else(missing_header)?;
    let mut rows = range.rows().skip(skip);
    let header = rows.next().ok_or_else(missing_header)?;

    let column = |name: &'static str| {
        header
            .iter()
            .position(|cell| match cell {
                Data::String(title) => title.trim().eq_ignore_ascii_case(name),
                _ => false,
            })
            .ok_or_else(|| SheetError::MissingColumn {
                sheet: sheet.to_string(),
                column: name,
            })
    };
    let date_column = column(DATE_COLUMN)?;
    let min_column = column(MIN_COLUMN)?;
    let max_column = column(MAX_COLUMN)?;

    let mut readings = Vec::new();
    for (offset, cells) in rows.enumerate() {
        // One-based, as shown by spreadsheet applications.
        let row_number = header_row + offset + 2;
        let cell = |index: usize, name: &'static str| {
            cells
                .get(index)
                .map_or(Ok(None), |value| number(value, row_number, name))
        };

        let date = cell(date_column, DATE_COLUMN)?;
        let min = cell(min_column, MIN_COLUMN)?;
        let max = cell(max_column, MAX_COLUMN)?;
        if date.is_none() && min.is_none() && max.is_none() {
            debug!("Skipping blank row {}", row_number);
            continue;
        }

        readings.push(MeterReading {
            date: date.map(SerialDate),
            min,
            max,
        });
    }
    Ok(readings)
}

fn number(value: &Data, row: usize, column: &'static str) -> Result<Option<f64>, SheetError> {
    let invalid = || SheetError::InvalidCell {
        row,
        column,
        value: value.to_string(),
    };
    match value {
        Data::Empty => Ok(None),
        Data::Float(f) => Ok(Some(*f)),
        Data::Int(i) => Ok(Some(*i as f64)),
        Data::DateTime(dt) => Ok(Some(dt.as_f64())),
        Data::String(s) if s.trim().is_empty() => Ok(None),
        Data::String(s) => s.trim().parse().map(Some).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}
