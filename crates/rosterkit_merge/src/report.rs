//! Merge run report model.

use std::collections::BTreeMap;
use std::fmt;

/// Aggregate counters and diagnostics for one merge run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportMerge {
    /// Decoded File 1 data rows.
    pub cnt_rows_subjects: u64,
    /// Decoded File 2 data rows below the located header.
    pub cnt_rows_enrollments: u64,
    /// Distinct non-blank File 1 keys.
    pub cnt_keys_subjects: u64,
    /// Distinct non-blank File 2 keys.
    pub cnt_keys_enrollments: u64,
    /// Keys present in both files.
    pub cnt_keys_common: u64,
    /// Rows in the output table.
    pub cnt_rows_output: u64,
    /// Widest course count, i.e. number of course/role column pairs.
    pub n_courses_max: u64,
    /// Zero-based sheet row where the File 2 header was found.
    pub row_header_enrollments: Option<usize>,
    /// Non-fatal observations about the inputs.
    pub warnings: Vec<String>,
}

impl ReportMerge {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Add warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_rows_subjects".to_string(), self.cnt_rows_subjects);
        dict_counts.insert("cnt_rows_enrollments".to_string(), self.cnt_rows_enrollments);
        dict_counts.insert("cnt_keys_subjects".to_string(), self.cnt_keys_subjects);
        dict_counts.insert("cnt_keys_enrollments".to_string(), self.cnt_keys_enrollments);
        dict_counts.insert("cnt_keys_common".to_string(), self.cnt_keys_common);
        dict_counts.insert("cnt_rows_output".to_string(), self.cnt_rows_output);
        dict_counts.insert("n_courses_max".to_string(), self.n_courses_max);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} subjects={} enrollments={} common={} output={} courses_max={} warnings={}",
            dict_counts["cnt_rows_subjects"],
            dict_counts["cnt_rows_enrollments"],
            dict_counts["cnt_keys_common"],
            dict_counts["cnt_rows_output"],
            dict_counts["n_courses_max"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportMerge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[MERGE]"))
    }
}
