// ABOUTME: Uploaded spreadsheet parsing
// ABOUTME: Turns XLSX or CSV bytes into ordered (header, value) rows

use std::io::Cursor;

use calamine::{Data, Range, Reader, Xls, Xlsx};
use thiserror::Error;
use tracing::debug;

/// One sheet row as ordered (header, cell) pairs. Empty cells are omitted,
/// matching how the rest of the pipeline treats absent fields.
pub type Row = Vec<(String, String)>;

/// File-level parse failures. Either one aborts the whole upload before any
/// row is processed.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Could not read uploaded file: {0}")]
    Unreadable(String),
    #[error("File is empty or invalid")]
    Empty,
}

/// XLSX files are ZIP containers
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Parse an uploaded spreadsheet into rows.
///
/// Format is chosen by file extension, with a ZIP magic-byte fallback for
/// uploads with unhelpful names. Legacy `.xls` files are BIFF containers,
/// not ZIP, and get their own reader.
pub fn parse_sheet(filename: &str, bytes: &[u8]) -> Result<Vec<Row>, SheetError> {
    let lower = filename.to_lowercase();

    let rows = if lower.ends_with(".xlsx") || bytes.starts_with(ZIP_MAGIC) {
        parse_xlsx(bytes)?
    } else if lower.ends_with(".xls") {
        parse_xls(bytes)?
    } else {
        parse_csv(bytes)?
    };

    if rows.is_empty() {
        return Err(SheetError::Empty);
    }

    debug!("Parsed {} rows from {}", rows.len(), filename);
    Ok(rows)
}

fn parse_xlsx(bytes: &[u8]) -> Result<Vec<Row>, SheetError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| SheetError::Unreadable(e.to_string()))?;

    // First worksheet only, as the original importer did
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::Empty)?
        .map_err(|e| SheetError::Unreadable(e.to_string()))?;

    Ok(range_to_rows(&range))
}

fn parse_xls(bytes: &[u8]) -> Result<Vec<Row>, SheetError> {
    let mut workbook: Xls<_> = Xls::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| SheetError::Unreadable(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::Empty)?
        .map_err(|e| SheetError::Unreadable(e.to_string()))?;

    Ok(range_to_rows(&range))
}

fn range_to_rows(range: &Range<Data>) -> Vec<Row> {
    let mut cells = range.rows();
    let headers: Vec<String> = match cells.next() {
        Some(header_row) => header_row.iter().map(cell_to_string).collect(),
        None => return Vec::new(),
    };

    let mut rows = Vec::new();
    for sheet_row in cells {
        let mut row = Row::new();
        for (i, cell) in sheet_row.iter().enumerate() {
            let value = cell_to_string(cell);
            if value.is_empty() {
                continue;
            }
            let header = match headers.get(i) {
                Some(h) if !h.is_empty() => h.clone(),
                _ => continue,
            };
            row.push((header, value));
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }

    rows
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            // Whole numbers come back as floats; render "6000" not "6000.0"
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<Row>, SheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| SheetError::Unreadable(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SheetError::Unreadable(e.to_string()))?;
        let mut row = Row::new();
        for (i, value) in record.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let header = match headers.get(i) {
                Some(h) if !h.is_empty() => h.clone(),
                _ => continue,
            };
            row.push((header, value.to_string()));
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_csv_with_headers() {
        let csv = b"Name,Email,Budget\nJane,jane@x.com,5000\nBob,bob@y.com,\n";
        let rows = parse_sheet("leads.csv", csv).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            vec![
                ("Name".to_string(), "Jane".to_string()),
                ("Email".to_string(), "jane@x.com".to_string()),
                ("Budget".to_string(), "5000".to_string()),
            ]
        );
        // Bob's empty budget cell is omitted
        assert_eq!(rows[1].len(), 2);
    }

    #[test]
    fn empty_csv_is_a_file_level_error() {
        let err = parse_sheet("leads.csv", b"Name,Email\n").unwrap_err();
        assert!(matches!(err, SheetError::Empty));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let csv = b"Name\nJane\n\nBob\n";
        let rows = parse_sheet("leads.csv", csv).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn garbage_xlsx_is_unreadable() {
        let err = parse_sheet("leads.xlsx", b"not a zip archive").unwrap_err();
        assert!(matches!(err, SheetError::Unreadable(_)));
    }

    #[test]
    fn garbage_xls_is_unreadable() {
        let err = parse_sheet("leads.xls", b"not a biff workbook").unwrap_err();
        assert!(matches!(err, SheetError::Unreadable(_)));
    }
}
