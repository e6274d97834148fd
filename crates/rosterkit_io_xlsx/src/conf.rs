//! Spreadsheet constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Default number of leading rows inspected when locating a header row.
pub const N_ROWS_HEADER_SCAN_MAX: usize = 50;
/// Column name given to a header cell without text.
pub const C_HEADER_NAME_EMPTY: &str = "__EMPTY";
/// File extension of every workbook produced by the writer.
pub const C_XLSX_EXTENSION: &str = ".xlsx";

/// Build default named format presets used by [`crate::writer::XlsxWriter`].
///
/// Keys: `text` (body cells) and `header` (header row).
pub fn derive_default_xlsx_formats() -> BTreeMap<String, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        align: Some("left".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(
        "text".to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some("@".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        "header".to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            align: Some("center".to_string()),
            border: Some(true),
            ..Default::default()
        }),
    );

    dict_fmt
}
