//! Column-name and key-value normalization.

use rosterkit_io_xlsx::{EnumCellValue, SpecRawRow, SpecSheetRecords, derive_text_from_cell_value};

/// Trim surrounding whitespace from every column name in `row`.
///
/// When two names collapse to the same trimmed name, the later value wins and
/// the earlier position is kept.
pub fn normalize_column_names(row: &SpecRawRow) -> SpecRawRow {
    row.iter()
        .map(|(c_name, value)| (c_name.trim(), value.clone()))
        .collect()
}

/// Trim header names and every row's column names.
pub fn normalize_records(records: SpecSheetRecords) -> SpecSheetRecords {
    SpecSheetRecords {
        columns: records
            .columns
            .iter()
            .map(|c_name| c_name.trim().to_string())
            .collect(),
        row_header: records.row_header,
        rows: records.rows.iter().map(normalize_column_names).collect(),
    }
}

/// Join-key text of a cell: trimmed, with blank or missing mapped to `None`.
pub fn normalize_key_value(value: Option<&EnumCellValue>) -> Option<String> {
    let c_key = derive_text_from_cell_value(value?).trim().to_string();
    if c_key.is_empty() { None } else { Some(c_key) }
}

/// Split a display name into its first token and the space-joined rest.
pub fn split_full_name(name: &str) -> (String, String) {
    let mut l_tokens = name.split_whitespace();
    let c_first = l_tokens.next().unwrap_or_default().to_string();
    let c_rest = l_tokens.collect::<Vec<_>>().join(" ");
    (c_first, c_rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(v: &str) -> EnumCellValue {
        EnumCellValue::String(v.to_string())
    }

    #[test]
    fn normalize_column_names_trims_and_merges() {
        let row: SpecRawRow = [
            (" code ", text("1")),
            ("username", text("a@x.com")),
            ("code", text("2")),
        ]
        .into_iter()
        .collect();

        let row_norm = normalize_column_names(&row);
        assert_eq!(row_norm.column_names(), vec!["code", "username"]);
        assert_eq!(row_norm.get("code"), Some(&text("2")));
    }

    #[test]
    fn normalize_records_trims_header_names() {
        let records = SpecSheetRecords {
            columns: vec!["\tcode".to_string(), "username ".to_string()],
            row_header: Some(0),
            rows: vec![[(" code", text("1"))].into_iter().collect()],
        };

        let records_norm = normalize_records(records);
        assert_eq!(records_norm.columns, vec!["code", "username"]);
        assert_eq!(records_norm.rows[0].get("code"), Some(&text("1")));
        assert_eq!(records_norm.row_header, Some(0));
    }

    #[test]
    fn normalize_key_value_handles_blank_and_numbers() {
        assert_eq!(normalize_key_value(None), None);
        assert_eq!(normalize_key_value(Some(&EnumCellValue::None)), None);
        assert_eq!(normalize_key_value(Some(&text("   "))), None);
        assert_eq!(normalize_key_value(Some(&text(" 42 "))), Some("42".to_string()));
        assert_eq!(
            normalize_key_value(Some(&EnumCellValue::Number(42.0))),
            Some("42".to_string())
        );
    }

    #[test]
    fn split_full_name_cases() {
        assert_eq!(
            split_full_name("Ali Hassan Omar"),
            ("Ali".to_string(), "Hassan Omar".to_string())
        );
        assert_eq!(
            split_full_name("  Ali   Hassan \t Omar "),
            ("Ali".to_string(), "Hassan Omar".to_string())
        );
        assert_eq!(split_full_name("Ali"), ("Ali".to_string(), String::new()));
        assert_eq!(split_full_name(""), (String::new(), String::new()));
        assert_eq!(split_full_name("   "), (String::new(), String::new()));
    }
}
