//! Sheet decoder that turns workbook bytes into grids and keyed records.
//!
//! Every entry point parses the given bytes from scratch. Callers that need a
//! header offset first inspect [`read_sheet_grid`] and then decode again with
//! [`decode_sheet_rows`] from that row, instead of slicing an earlier result.

use std::io::Cursor;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use tracing::debug;

use crate::spec::{EnumCellValue, SpecRawRow, SpecSheetRecords, XlsxReadError};
use crate::util::{derive_text_from_cell_value, derive_unique_header_names};

/// Read the first sheet of a workbook as a grid in absolute sheet coordinates.
///
/// Rows and columns before the used range are materialized as empty cells, so
/// `grid[r][c]` is sheet cell `(r, c)`. Rows are not padded to a common width.
pub fn read_sheet_grid(bytes: &[u8]) -> Result<Vec<Vec<EnumCellValue>>, XlsxReadError> {
    let range = read_first_sheet_range(bytes)?;
    let (n_row_start, n_col_start) = range.start().unwrap_or((0, 0));

    let mut l_grid: Vec<Vec<EnumCellValue>> = vec![Vec::new(); n_row_start as usize];
    for row in range.rows() {
        let mut l_cells = vec![EnumCellValue::None; n_col_start as usize];
        l_cells.extend(row.iter().map(derive_cell_value_from_data));
        l_grid.push(l_cells);
    }

    debug!(
        n_rows = l_grid.len(),
        n_row_start, n_col_start, "read sheet grid"
    );
    Ok(l_grid)
}

/// Decode the first sheet into keyed records.
///
/// The header is the first used row when `row_start` is `None`, otherwise the
/// absolute sheet row `row_start`. Every later row up to the end of the sheet is
/// a data row; empty cells are omitted and fully blank rows are skipped.
pub fn decode_sheet_rows(
    bytes: &[u8],
    row_start: Option<usize>,
) -> Result<SpecSheetRecords, XlsxReadError> {
    let l_grid = read_sheet_grid(bytes)?;
    let records = derive_records_from_grid(&l_grid, row_start);
    debug!(
        n_rows = records.rows.len(),
        n_cols = records.columns.len(),
        row_header = ?records.row_header,
        "decoded sheet rows"
    );
    Ok(records)
}

/// Key grid rows by the header found at `row_start` (or the first used row).
pub fn derive_records_from_grid(
    grid: &[Vec<EnumCellValue>],
    row_start: Option<usize>,
) -> SpecSheetRecords {
    let n_row_header = match row_start {
        Some(n_row) => n_row,
        None => match grid
            .iter()
            .position(|row| row.iter().any(|value| !value.is_none()))
        {
            Some(n_row) => n_row,
            None => return SpecSheetRecords::default(),
        },
    };
    if n_row_header >= grid.len() {
        return SpecSheetRecords::default();
    }

    let l_rows_in_range = &grid[n_row_header..];
    let n_width = l_rows_in_range.iter().map(Vec::len).max().unwrap_or(0);

    let l_header_raw: Vec<String> = (0..n_width)
        .map(|n_idx_col| {
            grid[n_row_header]
                .get(n_idx_col)
                .map(derive_text_from_cell_value)
                .unwrap_or_default()
        })
        .collect();
    let l_columns = derive_unique_header_names(&l_header_raw);

    let mut l_rows = Vec::new();
    for row in &l_rows_in_range[1..] {
        let record: SpecRawRow = row
            .iter()
            .zip(&l_columns)
            .filter(|(value, _)| !value.is_none())
            .map(|(value, c_name)| (c_name.clone(), value.clone()))
            .collect();
        if !record.is_empty() {
            l_rows.push(record);
        }
    }

    SpecSheetRecords {
        columns: l_columns,
        row_header: Some(n_row_header),
        rows: l_rows,
    }
}

fn read_first_sheet_range(bytes: &[u8]) -> Result<Range<Data>, XlsxReadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|err| XlsxReadError::Decode(err.to_string()))?;

    match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => Ok(range),
        Some(Err(err)) => Err(XlsxReadError::Decode(err.to_string())),
        None => Err(XlsxReadError::NoSheets),
    }
}

fn derive_cell_value_from_data(value: &Data) -> EnumCellValue {
    match value {
        Data::Empty => EnumCellValue::None,
        Data::String(v) => EnumCellValue::String(v.clone()),
        Data::Int(v) => EnumCellValue::Number(*v as f64),
        Data::Float(v) => EnumCellValue::Number(*v),
        Data::Bool(v) => EnumCellValue::String(if *v { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(v) => EnumCellValue::Number(v.as_f64()),
        Data::DateTimeIso(v) => EnumCellValue::String(v.clone()),
        Data::DurationIso(v) => EnumCellValue::String(v.clone()),
        Data::Error(e) => EnumCellValue::String(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_xlsxwriter::Workbook;

    use super::*;

    fn text(v: &str) -> EnumCellValue {
        EnumCellValue::String(v.to_string())
    }

    fn build_workbook_bytes() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "Enrollment export").unwrap();
        worksheet.write_string(2, 0, "id ").unwrap();
        worksheet.write_string(2, 1, "name").unwrap();
        worksheet.write_string(2, 3, "name").unwrap();
        worksheet.write_number(3, 0, 7.0).unwrap();
        worksheet.write_string(3, 1, "Ali").unwrap();
        worksheet.write_string(3, 2, "extra").unwrap();
        worksheet.write_number(5, 0, 8.0).unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn read_sheet_grid_uses_absolute_rows() {
        let grid = read_sheet_grid(&build_workbook_bytes()).unwrap();

        assert_eq!(grid.len(), 6);
        assert_eq!(grid[0][0], text("Enrollment export"));
        assert_eq!(grid[2][0], text("id "));
        assert_eq!(grid[3][0], EnumCellValue::Number(7.0));
        assert!(grid[4].iter().all(EnumCellValue::is_none));
    }

    #[test]
    fn decode_sheet_rows_from_header_offset() {
        let records = decode_sheet_rows(&build_workbook_bytes(), Some(2)).unwrap();

        assert_eq!(records.row_header, Some(2));
        assert_eq!(
            records.columns,
            vec![
                "id ".to_string(),
                "name".to_string(),
                "__EMPTY".to_string(),
                "name_1".to_string()
            ]
        );
        assert_eq!(records.rows.len(), 2);
        assert_eq!(records.rows[0].get("id "), Some(&EnumCellValue::Number(7.0)));
        assert_eq!(records.rows[0].get("name"), Some(&text("Ali")));
        assert_eq!(records.rows[0].get("__EMPTY"), Some(&text("extra")));
        assert!(!records.rows[0].contains("name_1"));
        assert_eq!(records.rows[1].column_names(), vec!["id "]);
    }

    #[test]
    fn decode_sheet_rows_defaults_to_first_used_row() {
        let records = decode_sheet_rows(&build_workbook_bytes(), None).unwrap();

        assert_eq!(records.row_header, Some(0));
        assert_eq!(records.columns[0], "Enrollment export");
        assert_eq!(records.rows.len(), 3);
    }

    #[test]
    fn derive_records_from_grid_past_end_is_empty() {
        let grid = vec![vec![text("a")], vec![text("1")]];
        assert_eq!(derive_records_from_grid(&grid, Some(5)), SpecSheetRecords::default());
        assert_eq!(derive_records_from_grid(&[], None), SpecSheetRecords::default());
    }

    #[test]
    fn decode_rejects_non_spreadsheet_bytes() {
        let err = decode_sheet_rows(b"definitely not a workbook", None).unwrap_err();
        assert!(matches!(err, XlsxReadError::Decode(_)));
    }
}
