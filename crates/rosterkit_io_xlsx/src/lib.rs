//! `rosterkit_io_xlsx` v1:
//! Spreadsheet I/O kernel for the roster merge.
//!
//! Modules:
//! - `conf`   : constants and default presets
//! - `spec`   : cell/row models, options and errors
//! - `util`   : pure helper functions (header scan, naming, limits)
//! - `reader` : bytes -> grid / keyed records
//! - `writer` : DataFrame -> workbook bytes
pub mod conf;
pub mod reader;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_XLSX_EXTENSION, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    N_ROWS_HEADER_SCAN_MAX, TUP_EXCEL_ILLEGAL,
};
pub use reader::{decode_sheet_rows, derive_records_from_grid, read_sheet_grid};
pub use spec::{
    EnumCellValue, SpecAutofitCellsPolicy, SpecCellFormat, SpecRawRow, SpecSheetRecords,
    SpecSheetWritten, SpecXlsxReport, XlsxReadError, XlsxWriteError,
};
pub use util::{
    derive_text_from_cell_value, derive_unique_header_names, locate_header_row,
    normalize_output_file_name, sanitize_sheet_name,
};
pub use writer::XlsxWriter;
