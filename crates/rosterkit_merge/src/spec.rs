//! Merge configuration, output models and top-level error type.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use polars::prelude::{Column, DataFrame, NamedFrom, PolarsResult, Series};
use rosterkit_io_xlsx::XlsxReadError;
use rosterkit_io_xlsx::conf::N_ROWS_HEADER_SCAN_MAX;
use thiserror::Error;

use crate::assemble::pad_enrollment_slots;
use crate::conf::{
    C_COLUMN_PREFIX_COURSE, C_COLUMN_PREFIX_ROLE, C_OUTPUT_FILE_NAME_DEFAULT, C_PASSWORD_DEFAULT,
    C_ROLE_DEFAULT, TUP_COLUMNS_CORE,
};
use crate::report::ReportMerge;

////////////////////////////////////////////////////////////////////////////////
// #region Configuration

/// Literal header names of the columns the merge reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRosterSchema {
    /// File 1 join key column.
    pub col_subject_key: String,
    /// File 1 contact column, written to the output `email` field.
    pub col_subject_contact: String,
    /// File 2 join key column.
    pub col_enrollment_key: String,
    /// File 2 full name column.
    pub col_enrollment_name: String,
    /// File 2 course code column.
    pub col_enrollment_course: String,
}

impl Default for SpecRosterSchema {
    /// Headers of the Arabic student/course exports.
    fn default() -> Self {
        Self {
            col_subject_key: "الكود".to_string(),
            col_subject_contact: "Username".to_string(),
            col_enrollment_key: "كود الطالب".to_string(),
            col_enrollment_name: "الاسم".to_string(),
            col_enrollment_course: "كود المقرر".to_string(),
        }
    }
}

impl SpecRosterSchema {
    /// English header preset: `code`, `username`, `studentCode`, `fullName`,
    /// `courseCode`.
    pub fn english() -> Self {
        Self {
            col_subject_key: "code".to_string(),
            col_subject_contact: "username".to_string(),
            col_enrollment_key: "studentCode".to_string(),
            col_enrollment_name: "fullName".to_string(),
            col_enrollment_course: "courseCode".to_string(),
        }
    }

    /// Columns File 1 must provide.
    pub fn subject_required(&self) -> Vec<String> {
        vec![self.col_subject_key.clone(), self.col_subject_contact.clone()]
    }

    /// Columns File 2's header row must contain.
    pub fn enrollment_required(&self) -> Vec<String> {
        vec![
            self.col_enrollment_key.clone(),
            self.col_enrollment_name.clone(),
            self.col_enrollment_course.clone(),
        ]
    }
}

/// Input options for [`crate::merge::merge_rosters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMergeConfig {
    /// Password copied verbatim into every output row.
    pub default_password: String,
    /// Role paired with every course.
    pub default_role: String,
    /// Output workbook name; trimmed and given an `.xlsx` extension.
    pub output_file_name: String,
    /// Header names to read from both files.
    pub schema: SpecRosterSchema,
    /// Leading File 2 rows inspected when locating its header.
    pub n_rows_header_scan_max: usize,
}

impl Default for SpecMergeConfig {
    fn default() -> Self {
        Self {
            default_password: C_PASSWORD_DEFAULT.to_string(),
            default_role: C_ROLE_DEFAULT.to_string(),
            output_file_name: C_OUTPUT_FILE_NAME_DEFAULT.to_string(),
            schema: SpecRosterSchema::default(),
            n_rows_header_scan_max: N_ROWS_HEADER_SCAN_MAX,
        }
    }
}

impl SpecMergeConfig {
    /// Check preconditions that must hold before any input is decoded.
    pub fn validate(&self) -> Result<(), MergeError> {
        if self.output_file_name.trim().is_empty() {
            return Err(MergeError::Validation(
                "Please specify an output file name.".to_string(),
            ));
        }
        if !is_bare_file_name(self.output_file_name.trim()) {
            return Err(MergeError::Validation(format!(
                "Output file name must not contain a directory: {:?}",
                self.output_file_name
            )));
        }
        if self.default_password.is_empty() {
            return Err(MergeError::Validation(
                "Default password must not be empty.".to_string(),
            ));
        }
        if self.default_role.is_empty() {
            return Err(MergeError::Validation(
                "Default role must not be empty.".to_string(),
            ));
        }
        if self.n_rows_header_scan_max == 0 {
            return Err(MergeError::Validation(
                "n_rows_header_scan_max must be >= 1.".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_bare_file_name(name: &str) -> bool {
    let mut l_components = Path::new(name).components();
    matches!(
        (l_components.next(), l_components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OutputModels

/// One repeated `(course, role)` column group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecEnrollmentSlot {
    /// Course code, empty for padding.
    pub course: String,
    /// Role for the course, empty for padding.
    pub role: String,
}

/// One output row before rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecOutputRecord {
    /// Subject join key.
    pub username: String,
    /// First token of the display name.
    pub firstname: String,
    /// Remaining tokens of the display name.
    pub lastname: String,
    /// File 1 contact value.
    pub email: String,
    /// Configured password.
    pub password: String,
    /// Course groups in File 2 row order, then padding.
    pub enrollments: Vec<SpecEnrollmentSlot>,
}

impl SpecOutputRecord {
    /// Cell texts in output column order.
    pub fn values(&self) -> Vec<&str> {
        let mut l_values = vec![
            self.username.as_str(),
            self.firstname.as_str(),
            self.lastname.as_str(),
            self.email.as_str(),
            self.password.as_str(),
        ];
        for slot in &self.enrollments {
            l_values.push(slot.course.as_str());
            l_values.push(slot.role.as_str());
        }
        l_values
    }
}

/// Rectangular merge result: every record holds `n_courses_max` slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecMergedTable {
    records: Vec<SpecOutputRecord>,
    n_courses_max: usize,
}

impl SpecMergedTable {
    /// Pad `records` to the widest course count among them.
    pub fn from_records(mut records: Vec<SpecOutputRecord>) -> Self {
        let n_courses_max = pad_enrollment_slots(&mut records);
        Self {
            records,
            n_courses_max,
        }
    }

    /// Output rows in File 1 order.
    pub fn records(&self) -> &[SpecOutputRecord] {
        &self.records
    }

    /// Largest course count over all rows.
    pub fn n_courses_max(&self) -> usize {
        self.n_courses_max
    }

    /// Number of output rows.
    pub fn height(&self) -> usize {
        self.records.len()
    }

    /// Number of output columns: `5 + 2 * n_courses_max`.
    pub fn width(&self) -> usize {
        TUP_COLUMNS_CORE.len() + 2 * self.n_courses_max
    }

    /// Column names in output order.
    pub fn columns(&self) -> Vec<String> {
        let mut l_columns: Vec<String> = TUP_COLUMNS_CORE.iter().map(|c| c.to_string()).collect();
        for n_idx in 1..=self.n_courses_max {
            l_columns.push(format!("{C_COLUMN_PREFIX_COURSE}{n_idx}"));
            l_columns.push(format!("{C_COLUMN_PREFIX_ROLE}{n_idx}"));
        }
        l_columns
    }

    /// Render as a string-typed dataframe in output column order.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let n_width = self.width();
        let mut l_values_by_col: Vec<Vec<String>> =
            vec![Vec::with_capacity(self.height()); n_width];
        for record in &self.records {
            for (n_idx_col, c_value) in record.values().into_iter().enumerate() {
                l_values_by_col[n_idx_col].push(c_value.to_string());
            }
        }

        let l_columns = self
            .columns()
            .into_iter()
            .zip(l_values_by_col)
            .map(|(c_name, l_values)| Column::from(Series::new(c_name.into(), l_values)))
            .collect();
        DataFrame::new(l_columns)
    }
}

/// Everything one merge call hands back to its caller.
#[derive(Debug, Clone)]
pub struct SpecMergeOutput {
    /// Output file name, guaranteed to end in `.xlsx`.
    pub file_name: String,
    /// Encoded workbook.
    pub bytes: Vec<u8>,
    /// Merged table the workbook was rendered from.
    pub table: SpecMergedTable,
    /// Run counters and warnings.
    pub report: ReportMerge,
    /// Location the workbook was written to, when persisted.
    pub path_file_out: Option<PathBuf>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Which input a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumRosterFile {
    /// File 1: subject codes and contacts.
    Subjects,
    /// File 2: enrollments with names and course codes.
    Enrollments,
}

impl fmt::Display for EnumRosterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subjects => write!(f, "File 1"),
            Self::Enrollments => write!(f, "File 2"),
        }
    }
}

/// Top-level merge failure. Any variant aborts the whole merge.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Configuration precondition violated.
    #[error("{0}")]
    Validation(String),
    /// Input bytes are not a spreadsheet or hold no sheet.
    #[error("Could not read {file}: {message}")]
    Decode {
        /// Offending input.
        file: EnumRosterFile,
        /// Decoder error text.
        message: String,
    },
    /// A required column is absent from File 1.
    #[error("Missing column in {file}: {column}")]
    MissingColumn {
        /// Offending input.
        file: EnumRosterFile,
        /// Column name that was not found.
        column: String,
    },
    /// Header row not located within the scan depth.
    #[error("Could not find header row in {file} (required: {})", .required.join(", "))]
    HeaderNotFound {
        /// Offending input.
        file: EnumRosterFile,
        /// Header names that had to appear together.
        required: Vec<String>,
    },
    /// The output workbook could not be produced.
    #[error("Could not build output workbook: {0}")]
    Encode(String),
    /// Reading an input or writing the output failed.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

impl MergeError {
    /// Attach the input label to a reader failure.
    pub fn from_read_error(file: EnumRosterFile, err: XlsxReadError) -> Self {
        match err {
            XlsxReadError::HeaderNotFound { required, .. } => Self::HeaderNotFound { file, required },
            XlsxReadError::Decode(_) | XlsxReadError::NoSheets => Self::Decode {
                file,
                message: err.to_string(),
            },
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
