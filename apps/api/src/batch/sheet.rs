//! Reading and writing `.xlsx` workbooks as plain string tables.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;

use crate::errors::AppError;

/// First worksheet of a workbook: a header row and the rows beneath it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Index of the first header equal to `name`, ignoring case.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Cell text, or `""` when the row is shorter than the header.
    pub fn cell<'a>(&'a self, row: &'a [String], column: Option<usize>) -> &'a str {
        column
            .and_then(|c| row.get(c))
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Parses the first worksheet. Headers are trimmed; rows are padded to the
/// header width.
pub fn read_table(bytes: &[u8]) -> Result<SheetTable, AppError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::Spreadsheet(format!("Could not open workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Spreadsheet("Workbook has no worksheets".to_string()))?
        .map_err(|e| AppError::Spreadsheet(format!("Could not read worksheet: {e}")))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| cell_text(c).trim().to_string()).collect(),
        None => return Err(AppError::Spreadsheet("Worksheet is empty".to_string())),
    };

    let rows = rows
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(cell_text).collect();
            cells.resize(headers.len().max(cells.len()), String::new());
            cells
        })
        .collect();

    Ok(SheetTable { headers, rows })
}

/// Serialises a table as a single-sheet workbook.
pub fn write_table(table: &SheetTable) -> anyhow::Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in table.headers.iter().enumerate() {
        sheet.write_string(0, u16::try_from(col)?, header)?;
    }
    for (r, row) in table.rows.iter().enumerate() {
        let r = u32::try_from(r + 1)?;
        for (col, value) in row.iter().enumerate() {
            if !value.is_empty() {
                sheet.write_string(r, u16::try_from(col)?, value)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SheetTable {
        SheetTable {
            headers: vec!["ID".into(), "Job Profile".into(), "Notes".into()],
            rows: vec![
                vec!["1".into(), "Buyer".into(), String::new()],
                vec!["2".into(), "Driver".into(), "night shift".into()],
            ],
        }
    }

    #[test]
    fn test_written_workbook_reads_back() {
        let bytes = write_table(&table()).unwrap();
        assert_eq!(read_table(&bytes).unwrap(), table());
    }

    #[test]
    fn test_headers_are_trimmed() {
        let mut padded = table();
        padded.headers[1] = "  Job Profile ".into();
        let parsed = read_table(&write_table(&padded).unwrap()).unwrap();
        assert_eq!(parsed.headers[1], "Job Profile");
    }

    #[test]
    fn test_column_lookup_ignores_case() {
        assert_eq!(table().column("job profile"), Some(1));
        assert_eq!(table().column("Vertical"), None);
    }

    #[test]
    fn test_garbage_bytes_are_a_spreadsheet_error() {
        let err = read_table(b"not a workbook").unwrap_err();
        assert!(matches!(err, AppError::Spreadsheet(_)));
    }
}
