//! Shared spreadsheet models, options and error types.

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region CellValueSpecification

/// Normalized cell value shared by the reader and writer pipelines.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
}

impl EnumCellValue {
    /// Whether the cell carries no value at all.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// One decoded data row: column name to cell value, in header order.
///
/// Empty cells are not stored. Inserting an existing column name replaces the
/// value in place, so the first position of a name is kept.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecRawRow {
    cells: Vec<(String, EnumCellValue)>,
}

impl SpecRawRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value stored under `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: EnumCellValue) {
        let c_name = name.into();
        match self.cells.iter_mut().find(|(c_key, _)| *c_key == c_name) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((c_name, value)),
        }
    }

    /// Value stored under `name`, if present.
    pub fn get(&self, name: &str) -> Option<&EnumCellValue> {
        self.cells
            .iter()
            .find(|(c_key, _)| c_key == name)
            .map(|(_, value)| value)
    }

    /// Whether `name` is present in this row.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnumCellValue)> {
        self.cells.iter().map(|(c_key, value)| (c_key.as_str(), value))
    }

    /// Column names present in this row, in insertion order.
    pub fn column_names(&self) -> Vec<&str> {
        self.cells.iter().map(|(c_key, _)| c_key.as_str()).collect()
    }

    /// Number of stored cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row stores no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, EnumCellValue)> for SpecRawRow {
    fn from_iter<I: IntoIterator<Item = (K, EnumCellValue)>>(iter: I) -> Self {
        let mut row = SpecRawRow::new();
        for (name, value) in iter {
            row.insert(name, value);
        }
        row
    }
}

/// Result of decoding one sheet into keyed records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheetRecords {
    /// Unique header names in sheet column order.
    pub columns: Vec<String>,
    /// Absolute zero-based sheet row of the header, `None` for an empty sheet.
    pub row_header: Option<usize>,
    /// Data rows below the header; fully blank rows are skipped.
    pub rows: Vec<SpecRawRow>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Thin border on all sides.
    pub border: Option<bool>,
    /// Number format code.
    pub num_format: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Header-based column width policy.
///
/// Each column gets the display width of its header name plus padding, clamped
/// to `[width_cell_min, width_cell_max]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// One worksheet emitted by a write call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetWritten {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    /// Number of body rows written below the header.
    pub height: usize,
    /// Number of columns written.
    pub width: usize,
}

/// Per-write call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Sheets produced by the write call.
    pub sheets: Vec<SpecSheetWritten>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failures raised while turning bytes into rows.
#[derive(Debug, Error)]
pub enum XlsxReadError {
    /// Bytes are not a parseable workbook.
    #[error("not a readable spreadsheet: {0}")]
    Decode(String),
    /// Workbook parsed but holds no worksheet.
    #[error("workbook contains no sheets")]
    NoSheets,
    /// No row within the scan depth holds every required header name.
    #[error(
        "header row not found within the first {n_rows_scanned} rows (required: {})",
        .required.join(", ")
    )]
    HeaderNotFound {
        /// Header names that had to appear together.
        required: Vec<String>,
        /// Number of rows inspected.
        n_rows_scanned: usize,
    },
}

/// Failures raised while producing a workbook.
#[derive(Debug, Error)]
pub enum XlsxWriteError {
    /// Error reported by the workbook encoder.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    /// Table, column type or option rejected before writing.
    #[error("{0}")]
    InvalidInput(String),
    /// Table does not fit into one worksheet.
    #[error("table of {height} rows x {width} columns exceeds Excel sheet limits")]
    LimitExceeded {
        /// Body rows requested.
        height: usize,
        /// Columns requested.
        width: usize,
    },
    /// Writer was used after its workbook was saved.
    #[error("cannot write after the workbook was saved")]
    Closed,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
