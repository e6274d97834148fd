//! XLSX writer kernel that renders string DataFrames into a workbook.

use std::path::Path;

use polars::prelude::DataFrame;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use tracing::debug;

use crate::conf::derive_default_xlsx_formats;
use crate::spec::{
    SpecAutofitCellsPolicy, SpecCellFormat, SpecSheetWritten, SpecXlsxReport, XlsxWriteError,
};
use crate::util::{sanitize_sheet_name, validate_sheet_extent, validate_unique_columns};

/// Stateful in-memory workbook writer.
///
/// Sheets are buffered until [`Self::save_to_buffer`] or [`Self::save`] is
/// called; after that the writer is closed.
pub struct XlsxWriter {
    workbook: Workbook,
    fmt_text: SpecCellFormat,
    fmt_header: SpecCellFormat,
    policy_autofit: SpecAutofitCellsPolicy,
    l_reports: Vec<SpecXlsxReport>,
    if_closed: bool,
}

impl Default for XlsxWriter {
    fn default() -> Self {
        let dict_fmt = derive_default_xlsx_formats();
        Self::new(
            dict_fmt.get("text").cloned().unwrap_or_default(),
            dict_fmt.get("header").cloned().unwrap_or_default(),
            SpecAutofitCellsPolicy::default(),
        )
    }
}

impl XlsxWriter {
    /// Create writer with body/header format presets and a column width policy.
    pub fn new(
        fmt_text: SpecCellFormat,
        fmt_header: SpecCellFormat,
        policy_autofit: SpecAutofitCellsPolicy,
    ) -> Self {
        Self {
            workbook: Workbook::new(),
            fmt_text,
            fmt_header,
            policy_autofit,
            l_reports: Vec::new(),
            if_closed: false,
        }
    }

    /// Return immutable snapshot of per-sheet write reports.
    pub fn report(&self) -> Vec<SpecXlsxReport> {
        self.l_reports.clone()
    }

    /// Serialize the workbook to bytes and close the writer.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>, XlsxWriteError> {
        if self.if_closed {
            return Err(XlsxWriteError::Closed);
        }
        let v_bytes = self.workbook.save_to_buffer()?;
        self.if_closed = true;
        Ok(v_bytes)
    }

    /// Write the workbook to `path` and close the writer.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), XlsxWriteError> {
        if self.if_closed {
            return Err(XlsxWriteError::Closed);
        }
        self.workbook.save(path.as_ref())?;
        self.if_closed = true;
        Ok(())
    }

    /// Write one sheet from a dataframe of string columns.
    ///
    /// Columns are written in the dataframe's column order under a single
    /// frozen header row. Null and empty strings end up as formatted blank
    /// cells. Column widths follow the header names only.
    pub fn write_sheet_from_dataframe(
        &mut self,
        df_data: &DataFrame,
        sheet_name: &str,
    ) -> Result<(), XlsxWriteError> {
        if self.if_closed {
            return Err(XlsxWriteError::Closed);
        }
        validate_policy_autofit(&self.policy_autofit)?;

        let l_colnames_df: Vec<String> = df_data
            .get_column_names_str()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        validate_unique_columns(&l_colnames_df)?;

        let n_width_df = l_colnames_df.len();
        let n_height_df = df_data.height();
        let n_rows_header = 1;
        validate_sheet_extent(n_height_df, n_width_df, n_rows_header)?;

        let mut report = SpecXlsxReport::default();
        let sheet_name_sanitized = sanitize_sheet_name(sheet_name, "_");
        if sheet_name_sanitized != sheet_name {
            report.warn(format!(
                "Sheet name {sheet_name:?} sanitized to {sheet_name_sanitized:?}."
            ));
        }

        let l_cols_str = df_data
            .get_columns()
            .iter()
            .map(|col| {
                col.str().map_err(|err| {
                    XlsxWriteError::InvalidInput(format!(
                        "Column {:?} must hold strings: {err}",
                        col.name()
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let fmt_body = derive_rust_xlsx_format(&self.fmt_text);
        let fmt_header = derive_rust_xlsx_format(&self.fmt_header);

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&sheet_name_sanitized)?;

        write_header(worksheet, &l_colnames_df, &fmt_header)?;
        worksheet.set_freeze_panes(cast_row_num(n_rows_header)?, 0)?;

        for (n_idx_col, ca_values) in l_cols_str.into_iter().enumerate() {
            let n_col = cast_col_num(n_idx_col)?;
            for (n_idx_row, value) in ca_values.into_iter().enumerate() {
                // rust_xlsxwriter stores a formatted "" as a blank cell.
                worksheet.write_string_with_format(
                    cast_row_num(n_rows_header + n_idx_row)?,
                    n_col,
                    value.unwrap_or_default(),
                    &fmt_body,
                )?;
            }
        }

        let n_min = usize::max(1, self.policy_autofit.width_cell_min);
        let n_max = usize::min(255, usize::max(n_min, self.policy_autofit.width_cell_max));
        let n_pad = self.policy_autofit.width_cell_padding;
        for (n_idx_col, c_name) in l_colnames_df.iter().enumerate() {
            let n_width_final = usize::min(
                n_max,
                usize::max(n_min, estimate_unicode_string_width(c_name) + n_pad),
            );
            worksheet.set_column_width(cast_col_num(n_idx_col)?, n_width_final as f64)?;
        }

        debug!(
            sheet = %sheet_name_sanitized,
            n_rows = n_height_df,
            n_cols = n_width_df,
            "wrote sheet"
        );
        report.sheets.push(SpecSheetWritten {
            sheet_name: sheet_name_sanitized,
            height: n_height_df,
            width: n_width_df,
        });
        self.l_reports.push(report);
        Ok(())
    }
}

fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

fn validate_policy_autofit(policy_autofit: &SpecAutofitCellsPolicy) -> Result<(), XlsxWriteError> {
    if policy_autofit.width_cell_min == 0 {
        return Err(XlsxWriteError::InvalidInput(
            "policy_autofit.width_cell_min must be >= 1.".to_string(),
        ));
    }
    if policy_autofit.width_cell_max < policy_autofit.width_cell_min {
        return Err(XlsxWriteError::InvalidInput(
            "policy_autofit.width_cell_max must be >= policy_autofit.width_cell_min.".to_string(),
        ));
    }
    Ok(())
}

fn write_header(
    worksheet: &mut Worksheet,
    header: &[String],
    fmt_header: &Format,
) -> Result<(), XlsxWriteError> {
    for (col_idx, cell_value) in header.iter().enumerate() {
        worksheet.write_string_with_format(0, cast_col_num(col_idx)?, cell_value, fmt_header)?;
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if spec.border.unwrap_or(false) {
        format = format.set_border(FormatBorder::Thin);
    }

    format
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "vcenter" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, XlsxWriteError> {
    u32::try_from(value)
        .map_err(|_| XlsxWriteError::InvalidInput(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16, XlsxWriteError> {
    u16::try_from(value)
        .map_err(|_| XlsxWriteError::InvalidInput(format!("column index overflow: {value}")))
}

#[cfg(test)]
mod tests {
    use polars::prelude::{Column, NamedFrom, Series};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::reader::read_sheet_grid;
    use crate::spec::EnumCellValue;

    fn build_dataframe() -> DataFrame {
        DataFrame::new(vec![
            Column::from(Series::new("username".into(), vec!["1", "2"])),
            Column::from(Series::new("email".into(), vec!["a@x.com", ""])),
            Column::from(Series::new("course1".into(), vec![Some("101"), None])),
        ])
        .unwrap()
    }

    fn text(v: &str) -> EnumCellValue {
        EnumCellValue::String(v.to_string())
    }

    #[test]
    fn write_sheet_round_trips_through_reader() {
        let mut writer = XlsxWriter::default();
        writer
            .write_sheet_from_dataframe(&build_dataframe(), "Merged Data")
            .unwrap();
        let v_bytes = writer.save_to_buffer().unwrap();

        let grid = read_sheet_grid(&v_bytes).unwrap();
        assert_eq!(
            grid[0],
            vec![text("username"), text("email"), text("course1")]
        );
        assert_eq!(grid[1], vec![text("1"), text("a@x.com"), text("101")]);
        assert_eq!(grid[2][0], text("2"));
        assert!(grid[2][1..].iter().all(EnumCellValue::is_none));

        let l_reports = writer.report();
        assert_eq!(
            l_reports[0].sheets,
            vec![SpecSheetWritten {
                sheet_name: "Merged Data".to_string(),
                height: 2,
                width: 3,
            }]
        );
        assert!(l_reports[0].warnings.is_empty());
    }

    #[test]
    fn write_sheet_sanitizes_sheet_name() {
        let mut writer = XlsxWriter::default();
        writer
            .write_sheet_from_dataframe(&build_dataframe(), "a/b")
            .unwrap();

        let l_reports = writer.report();
        assert_eq!(l_reports[0].sheets[0].sheet_name, "a_b");
        assert_eq!(l_reports[0].warnings.len(), 1);
    }

    #[test]
    fn write_sheet_rejects_non_string_columns() {
        let df = DataFrame::new(vec![Column::from(Series::new(
            "score".into(),
            vec![1.5f64, 2.0],
        ))])
        .unwrap();
        let mut writer = XlsxWriter::default();

        assert!(matches!(
            writer.write_sheet_from_dataframe(&df, "Scores"),
            Err(XlsxWriteError::InvalidInput(_))
        ));
    }

    #[test]
    fn writer_refuses_use_after_save() {
        let mut writer = XlsxWriter::default();
        writer.save_to_buffer().unwrap();

        assert!(matches!(writer.save_to_buffer(), Err(XlsxWriteError::Closed)));
        assert!(matches!(
            writer.write_sheet_from_dataframe(&build_dataframe(), "x"),
            Err(XlsxWriteError::Closed)
        ));
    }

    #[test]
    fn save_writes_file_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let mut writer = XlsxWriter::default();
        writer
            .write_sheet_from_dataframe(&build_dataframe(), "Merged Data")
            .unwrap();
        writer.save(&path).unwrap();

        let grid = read_sheet_grid(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(grid[0][0], text("username"));
    }

    #[test]
    fn autofit_policy_is_validated() {
        let mut writer = XlsxWriter::new(
            SpecCellFormat::default(),
            SpecCellFormat::default(),
            SpecAutofitCellsPolicy {
                width_cell_min: 0,
                ..SpecAutofitCellsPolicy::default()
            },
        );
        assert!(matches!(
            writer.write_sheet_from_dataframe(&build_dataframe(), "x"),
            Err(XlsxWriteError::InvalidInput(_))
        ));
    }

    #[test]
    fn header_width_estimate_weights_non_ascii() {
        assert_eq!(estimate_unicode_string_width("course1"), 7);
        assert_eq!(estimate_unicode_string_width("كود"), 5);
    }
}
