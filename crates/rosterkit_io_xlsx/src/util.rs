//! Stateless helper utilities used by the reader and writer kernels.

use std::collections::{BTreeMap, BTreeSet};

use crate::conf::{
    C_HEADER_NAME_EMPTY, C_XLSX_EXTENSION, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX,
    N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::spec::{EnumCellValue, XlsxReadError, XlsxWriteError};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Render a cell value as text.
///
/// Integral numbers drop their fractional part (`101.0` -> `"101"`), missing
/// values render as an empty string.
pub fn derive_text_from_cell_value(value: &EnumCellValue) -> String {
    match value {
        EnumCellValue::None => String::new(),
        EnumCellValue::String(s) => s.clone(),
        EnumCellValue::Number(n) => {
            if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region HeaderUtils

/// Find the first row whose trimmed cell texts cover every name in `required`.
///
/// Only the first `n_rows_scan_max` rows of `grid` are inspected. The returned
/// index is zero-based and refers to the same coordinates as `grid`.
pub fn locate_header_row(
    grid: &[Vec<EnumCellValue>],
    required: &[String],
    n_rows_scan_max: usize,
) -> Result<usize, XlsxReadError> {
    let n_rows_scanned = usize::min(grid.len(), n_rows_scan_max);

    for (n_idx_row, row) in grid.iter().enumerate().take(n_rows_scanned) {
        let set_texts: BTreeSet<String> = row
            .iter()
            .map(|value| derive_text_from_cell_value(value).trim().to_string())
            .collect();
        if required.iter().all(|c_name| set_texts.contains(c_name)) {
            return Ok(n_idx_row);
        }
    }

    Err(XlsxReadError::HeaderNotFound {
        required: required.to_vec(),
        n_rows_scanned,
    })
}

/// Turn raw header texts into unique column names.
///
/// Blank names become `__EMPTY`; a repeated name `x` becomes `x_1`, `x_2`, ...
/// skipping any suffix that is already taken.
pub fn derive_unique_header_names(raw_names: &[String]) -> Vec<String> {
    let mut dict_cnt_by_name: BTreeMap<String, usize> = BTreeMap::new();
    let mut l_names = Vec::with_capacity(raw_names.len());

    for c_raw in raw_names {
        let c_base = if c_raw.is_empty() {
            C_HEADER_NAME_EMPTY.to_string()
        } else {
            c_raw.clone()
        };

        let n_cnt = dict_cnt_by_name.get(&c_base).copied().unwrap_or(0);
        if n_cnt == 0 {
            dict_cnt_by_name.insert(c_base.clone(), 1);
            l_names.push(c_base);
            continue;
        }

        let mut n_suffix = n_cnt;
        let mut c_candidate = format!("{c_base}_{n_suffix}");
        while dict_cnt_by_name.contains_key(&c_candidate) {
            n_suffix += 1;
            c_candidate = format!("{c_base}_{n_suffix}");
        }
        dict_cnt_by_name.insert(c_base, n_suffix + 1);
        dict_cnt_by_name.insert(c_candidate.clone(), 1);
        l_names.push(c_candidate);
    }

    l_names
}

/// Validate that `columns` has no duplicated names.
pub fn validate_unique_columns(columns: &[String]) -> Result<(), XlsxWriteError> {
    if columns.len() == columns.iter().collect::<BTreeSet<_>>().len() {
        return Ok(());
    }

    let mut dict_pos: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (n_idx, c_name) in columns.iter().enumerate() {
        dict_pos.entry(c_name).or_default().push(n_idx);
    }

    let c_msg = dict_pos
        .iter()
        .filter(|(_, l_pos)| l_pos.len() > 1)
        .map(|(c_name, l_pos)| format!("{c_name:?} x{} at indices {l_pos:?}", l_pos.len()))
        .collect::<Vec<_>>()
        .join("; ");

    Err(XlsxWriteError::InvalidInput(format!(
        "Duplicate column names detected: {c_msg}"
    )))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Reject tables that cannot fit one worksheet below `height_header` rows.
pub fn validate_sheet_extent(
    height_df: usize,
    width_df: usize,
    height_header: usize,
) -> Result<(), XlsxWriteError> {
    let n_rows_data_max = N_NROWS_EXCEL_MAX.saturating_sub(height_header);
    if height_df > n_rows_data_max || width_df > N_NCOLS_EXCEL_MAX {
        return Err(XlsxWriteError::LimitExceeded {
            height: height_df,
            width: width_df,
        });
    }
    Ok(())
}

/// Trim `name` and make sure it ends with `.xlsx` (case-insensitive check).
pub fn normalize_output_file_name(name: &str) -> String {
    let c_name = name.trim();
    if c_name.to_lowercase().ends_with(C_XLSX_EXTENSION) {
        c_name.to_string()
    } else {
        format!("{c_name}{C_XLSX_EXTENSION}")
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
